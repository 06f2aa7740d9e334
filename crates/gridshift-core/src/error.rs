//! Unified error types for the gridshift crates
//!
//! [`GridError`] covers everything the topology model and its document format can
//! report. The algorithm crate wraps it in its own error type at the API boundary.
//!
//! # Example
//!
//! ```ignore
//! use gridshift_core::{GridError, GridResult};
//!
//! fn prepare(path: &str) -> GridResult<()> {
//!     let topology = gridshift_core::io::load_topology(path)?;
//!     if !gridshift_core::is_connected(&topology) {
//!         return Err(GridError::Network("feeder is islanded".into()));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for topology operations.
#[derive(Error, Debug)]
pub enum GridError {
    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation errors (self loops, duplicate lines, bad formats)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network structure errors (unknown buses, islanding)
    #[error("Network error: {0}")]
    Network(String),
}

/// Convenience type alias for Results using GridError.
pub type GridResult<T> = Result<T, GridError>;

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        GridError::Parse(err.to_string())
    }
}
