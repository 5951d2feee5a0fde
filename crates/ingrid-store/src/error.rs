//! # Storage Error Types
//!
//! Error types for client-local persistence.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / serde_json::Error                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds the key and path                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  IdentityProvider / ResultCache ← Log and degrade to memory            │
//! │                                                                         │
//! │  Nothing above this crate has to handle a storage failure.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Key/value storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a key's file failed.
    ///
    /// ## When This Occurs
    /// - Data directory is read-only
    /// - Disk full
    /// - File permissions issue
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored value could not be encoded or decoded.
    #[error("Corrupt value for key '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// Key is not usable as a file name.
    #[error("Invalid key '{0}'")]
    InvalidKey(String),

    /// No platform data directory could be determined.
    #[error("No data directory available on this platform")]
    NoDataDir,
}

impl StoreError {
    /// Creates an Io error for a given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a Corrupt error from a decoding failure.
    pub fn corrupt(key: impl Into<String>, err: impl std::fmt::Display) -> Self {
        StoreError::Corrupt {
            key: key.into(),
            message: err.to_string(),
        }
    }
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
