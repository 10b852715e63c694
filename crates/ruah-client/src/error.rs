use thiserror::Error;

use ruah_store::StoreError;

/// Errors surfaced by the client logic.
///
/// Nothing here is fatal: authentication failures route back to onboarding,
/// conflicts are benign no-ops reporting authoritative state, and store
/// failures degrade to retryable user-visible states.
#[derive(Error, Debug)]
pub enum ClientError {
    /// No valid local session; the shell routes to onboarding.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Known name, wrong password.
    #[error("Wrong password")]
    BadCredentials,

    /// Input rejected before any remote call.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The secret-friend draw is write-once.
    #[error("Secret friend already drawn")]
    TargetAlreadySet,

    /// Operation needs a target but none was assigned yet.
    #[error("No secret friend assigned")]
    NoTarget,

    /// Could not determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Session file I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by the store layer.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;
