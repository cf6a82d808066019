//! Structured logging, built on `tracing`.
//!
//! Initialization is idempotent and safe to call from a library: the first
//! caller wins, later calls are silently ignored rather than panicking on a
//! double-init.

use std::sync::atomic::{AtomicBool, Ordering};

static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize a default subscriber (respects `RUST_LOG`, falls back to
/// `warn,xmlscope=info`). Call once at process startup; safe to call from
/// multiple threads or not at all (tests run fine without it).
pub fn init_default() {
    init_with_config(TracingConfig::default());
}

/// Initialize a subscriber with an explicit configuration.
pub fn init_with_config(config: TracingConfig) {
    if TRACING_INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
        .is_ok()
    {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.default_level));

        let fmt_layer = fmt::layer()
            .with_target(config.show_target)
            .with_thread_ids(config.show_thread_ids)
            .with_file(config.show_file)
            .with_line_number(config.show_line_number);

        let _ = tracing_subscriber::registry().with(fmt_layer).with(filter).try_init();
    }
}

/// Tuning knobs for [`init_with_config`].
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub default_level: String,
    pub show_target: bool,
    pub show_thread_ids: bool,
    pub show_file: bool,
    pub show_line_number: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: "warn,xmlscope=info".to_string(),
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
        }
    }
}
