//! Error types for the verification store.

use thiserror::Error;

/// Failures raised by the store and its backends.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A Pending record already occupies this key (dedup guard).
    #[error("A pending verification already exists for {key}")]
    PendingExists { key: String },

    /// Point update targeted a key with no record.
    #[error("No verification record for {key}")]
    NotFound { key: String },

    /// Backend I/O failed.
    #[error("Store I/O error: {message}")]
    Io { message: String },

    /// Record (de)serialization failed.
    #[error("Store serialization error: {message}")]
    Serialization { message: String },
}
