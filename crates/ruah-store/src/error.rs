use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Transport-level HTTP failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("Store rejected request: status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected row shape.
    #[error("Decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// A unique constraint rejected the insert (once-per-day prayer,
    /// once-per-quiz answer).
    #[error("Row already exists")]
    Conflict,

    /// A query expected exactly one row but found none.
    #[error("Record not found")]
    NotFound,

    /// Realtime feed failure (websocket connect or protocol).
    #[error("Realtime error: {0}")]
    Realtime(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
