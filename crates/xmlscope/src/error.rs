//! Unified error handling for xmlscope.
//!
//! The parser is the only component that raises on its own; handler
//! operations always downgrade instead of erroring, and the chunking
//! engine raises only `BadConfig`.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for all xmlscope operations.
#[derive(Error, Debug)]
pub enum Error {
    // ==================== I/O & file errors ====================
    /// Underlying I/O failure (permissions, transient FS errors, etc).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input path does not exist.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// The input path exists but could not be read (permissions, device error).
    #[error("file unreadable: {0}")]
    Unreadable(PathBuf),

    /// The input exceeds the configured byte ceiling.
    #[error("file too large: {size} bytes exceeds the {max_bytes} byte ceiling")]
    FileTooLarge { size: u64, max_bytes: u64 },

    // ==================== Parse errors ====================
    /// The document is not well-formed XML, or is empty.
    #[error("malformed document{}: {message}", .at.as_ref().map(|p| format!(" at {p}")).unwrap_or_default())]
    Malformed {
        message: String,
        at: Option<LineColumn>,
    },

    /// The parser rejected the document for security reasons before (or
    /// instead of) completing a parse. `reason` is one of: `external-entity`,
    /// `entity-expansion`, `entity-whitelist`, `external-dtd`,
    /// `size-before-parse`.
    #[error("rejected for security: {reason}: {detail}")]
    SecurityRejected {
        reason: &'static str,
        detail: String,
    },

    // ==================== Chunking / façade errors ====================
    /// A `ChunkingConfig` was built from an unrecognized option key.
    #[error("bad config: unknown option {0:?}")]
    BadConfig(String),

    /// Defensive-only: `chunk(..., strategy = "auto", ...)` always resolves
    /// to one of the four concrete strategies, so this should be
    /// unreachable in practice.
    #[error("no applicable chunking strategy")]
    NoApplicableStrategy,
}

/// Line/column location used when reporting malformed-document errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineColumn {
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for LineColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Result type alias for xmlscope operations.
pub type Result<T> = std::result::Result<T, Error>;
