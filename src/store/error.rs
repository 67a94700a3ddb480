// Lifevault — Store error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("An account named '{0}' already exists")]
    DuplicateAccount(String),

    #[error("Not found: {0}")]
    NotFound(String),
}
