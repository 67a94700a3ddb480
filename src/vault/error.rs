// Lifevault — Vault error types

use thiserror::Error;

use crate::crypto::CryptoError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum VaultError {
    /// Empty title/content, unknown category name, or an empty
    /// permitted-category list. Recovered locally by re-prompting.
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Key mismatch or corrupt ciphertext on one entry. Listing callers
    /// report this per entry and continue with the rest.
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}
