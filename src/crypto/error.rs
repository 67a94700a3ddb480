// Lifevault — Crypto error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// Ciphertext was produced by a different key, or is truncated,
    /// corrupt, or not valid base64. Fatal to the one value being read,
    /// never to the caller's listing loop.
    #[error("Decryption failed — wrong key or corrupt ciphertext")]
    Decryption,

    #[error("Encryption failed")]
    Encryption,

    #[error("Key file is malformed: {0}")]
    InvalidKeyFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
