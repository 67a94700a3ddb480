// Lifevault — Top-level error types
//
// Aggregates errors from the crypto, store, auth, and vault modules into a
// single error enum for the application boundary.

use thiserror::Error;

/// Top-level error type for all lifevault operations.
#[derive(Debug, Error)]
pub enum LifevaultError {
    #[error("{0}")]
    Auth(#[from] crate::auth::AuthError),

    #[error("{0}")]
    Vault(#[from] crate::vault::VaultError),

    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] crate::crypto::CryptoError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, LifevaultError>;
