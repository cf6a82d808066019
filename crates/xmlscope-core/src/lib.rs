//! xmlscope-core
//!
//! Shared value types used across the `xmlscope` crate: the tagged-value
//! tree used for arbitrary-depth analysis payloads, and small path/value
//! helpers used by both the schema inspector and the chunking engine.

pub mod structured;
pub mod tag_path;

pub use structured::StructuredValue;
pub use tag_path::TagPath;
