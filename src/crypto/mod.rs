// Lifevault — Crypto Module
//
// Credential hashing and field encryption. Passwords and PINs are stored as
// SHA-256 digests; vault entry content is encrypted at rest with
// XChaCha20-Poly1305 under a process-wide key persisted in a local key file.

mod cipher;
mod error;
mod hasher;

pub use cipher::Cipher;
pub use error::CryptoError;
pub use hasher::{hash_secret, verify_secret};
