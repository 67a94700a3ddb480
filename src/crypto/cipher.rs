// Lifevault — Symmetric Cipher
//
// Encrypts vault entry content at rest with XChaCha20-Poly1305.
// The 32-byte key is generated once on first run, persisted to a local key
// file, and loaded as-is on every subsequent run. File presence is the only
// state — no rotation, no versioning.
//
// Ciphertext armor format: base64url( nonce (24 bytes) | ciphertext + tag )

use std::fs;
use std::path::Path;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chacha20poly1305::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;
use zeroize::Zeroizing;

use super::CryptoError;

/// Length of the persisted symmetric key in bytes.
const KEY_LEN: usize = 32;

/// Length of the XChaCha20-Poly1305 nonce prepended to each ciphertext.
const NONCE_LEN: usize = 24;

/// Process-wide field cipher. One instance per run; all entries share the
/// key in effect at encryption time (no per-entry key material).
pub struct Cipher {
    inner: XChaCha20Poly1305,
}

impl Cipher {
    /// Load the key from `key_path`, generating and persisting a fresh one
    /// if the file does not exist yet.
    pub fn load_or_generate(key_path: &Path) -> Result<Self, CryptoError> {
        let key = if key_path.exists() {
            let bytes = Zeroizing::new(fs::read(key_path)?);
            if bytes.len() != KEY_LEN {
                return Err(CryptoError::InvalidKeyFile(format!(
                    "expected {} bytes, found {}",
                    KEY_LEN,
                    bytes.len()
                )));
            }
            let mut key = Zeroizing::new([0u8; KEY_LEN]);
            key.copy_from_slice(&bytes);
            tracing::debug!("Loaded vault key from {}", key_path.display());
            key
        } else {
            let mut key = Zeroizing::new([0u8; KEY_LEN]);
            rand::rng().fill_bytes(key.as_mut());
            fs::write(key_path, key.as_ref())?;
            tracing::info!("Generated new vault key at {}", key_path.display());
            key
        };

        Ok(Self::from_key(&key))
    }

    /// Build a cipher directly from key bytes (tests and key-file loading).
    pub fn from_key(key: &[u8; KEY_LEN]) -> Self {
        Self {
            inner: XChaCha20Poly1305::new(key.into()),
        }
    }

    /// Encrypt plaintext, prepending a fresh random nonce and armoring the
    /// result as base64url text suitable for a TEXT column.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .inner
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::Encryption)?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(out))
    }

    /// Decrypt armored ciphertext back to the original plaintext.
    /// Any malformation — bad base64, truncation, wrong key, non-UTF-8
    /// plaintext — surfaces as `CryptoError::Decryption`.
    pub fn decrypt(&self, armored: &str) -> Result<String, CryptoError> {
        let data = URL_SAFE_NO_PAD
            .decode(armored)
            .map_err(|_| CryptoError::Decryption)?;
        if data.len() < NONCE_LEN {
            return Err(CryptoError::Decryption);
        }

        let (nonce_bytes, ct) = data.split_at(NONCE_LEN);
        let nonce = XNonce::from_slice(nonce_bytes);
        let plaintext = Zeroizing::new(
            self.inner
                .decrypt(nonce, ct)
                .map_err(|_| CryptoError::Decryption)?,
        );

        String::from_utf8(plaintext.to_vec()).map_err(|_| CryptoError::Decryption)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cipher() -> Cipher {
        Cipher::from_key(&[7u8; KEY_LEN])
    }

    #[test]
    fn encrypt_decrypt_round_trips() {
        let cipher = test_cipher();
        for plaintext in ["", "acct 123", "unicode: crème brûlée 🔐", "a\nb\tc"] {
            let armored = cipher.encrypt(plaintext).unwrap();
            assert_eq!(cipher.decrypt(&armored).unwrap(), plaintext);
        }
    }

    #[test]
    fn ciphertext_is_not_plaintext() {
        let cipher = test_cipher();
        let armored = cipher.encrypt("acct 123").unwrap();
        assert!(!armored.contains("acct 123"));
    }

    #[test]
    fn nonce_makes_ciphertext_nondeterministic() {
        let cipher = test_cipher();
        let a = cipher.encrypt("same input").unwrap();
        let b = cipher.encrypt("same input").unwrap();
        assert_ne!(a, b, "fresh nonce must be used per encryption");
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let armored = test_cipher().encrypt("secret content").unwrap();
        let other = Cipher::from_key(&[8u8; KEY_LEN]);
        assert!(matches!(
            other.decrypt(&armored),
            Err(CryptoError::Decryption)
        ));
    }

    #[test]
    fn malformed_ciphertext_fails_decryption() {
        let cipher = test_cipher();
        for bad in ["", "!!!not base64!!!", "c2hvcnQ"] {
            assert!(matches!(cipher.decrypt(bad), Err(CryptoError::Decryption)));
        }
    }

    #[test]
    fn tampered_ciphertext_fails_decryption() {
        let cipher = test_cipher();
        let armored = cipher.encrypt("acct 123").unwrap();
        let mut data = URL_SAFE_NO_PAD.decode(&armored).unwrap();
        let last = data.len() - 1;
        data[last] ^= 0x01;
        let tampered = URL_SAFE_NO_PAD.encode(data);
        assert!(matches!(
            cipher.decrypt(&tampered),
            Err(CryptoError::Decryption)
        ));
    }

    #[test]
    fn key_file_is_created_then_reused() {
        let dir = tempfile::tempdir().unwrap();
        let key_path = dir.path().join("vault.key");

        let first = Cipher::load_or_generate(&key_path).unwrap();
        assert!(key_path.exists());
        let armored = first.encrypt("persisted").unwrap();

        // A second load must read the same key and decrypt the first run's
        // ciphertext.
        let second = Cipher::load_or_generate(&key_path).unwrap();
        assert_eq!(second.decrypt(&armored).unwrap(), "persisted");
    }

    #[test]
    fn truncated_key_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let key_path = dir.path().join("vault.key");
        std::fs::write(&key_path, [0u8; 5]).unwrap();

        assert!(matches!(
            Cipher::load_or_generate(&key_path),
            Err(CryptoError::InvalidKeyFile(_))
        ));
    }
}
