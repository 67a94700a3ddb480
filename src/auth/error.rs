// Lifevault — Auth error types

use thiserror::Error;

use crate::store::{AttemptKind, StoreError};

#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed handle, secret, PIN, or email. Recovered locally by the
    /// caller re-prompting; never recorded as a failed attempt.
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("An account named '{0}' already exists")]
    DuplicateAccount(String),

    /// Wrong secret or PIN. For login/pin kinds this also appended a
    /// failed-attempt record before surfacing.
    #[error("Invalid credentials")]
    InvalidCredential,

    /// Three or more recent failures of this kind. The operation was
    /// refused and no new record was written.
    #[error("Account is locked after too many failed {0} attempts — try again later")]
    Locked(AttemptKind),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
