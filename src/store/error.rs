use crate::models::DecodeError;
use thiserror::Error;

/// Failures reported by a listing store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("listing `{0}` not found")]
    NotFound(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store rejected the listing: {0}")]
    Rejected(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("unreadable listing from store: {0}")]
    Decode(#[from] DecodeError),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}
