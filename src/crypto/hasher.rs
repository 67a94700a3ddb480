// Lifevault — Credential Hasher
//
// One-way digest of passwords and PINs for storage and comparison.
//
// KNOWN WEAKNESS: digests are a single unsalted SHA-256 pass with no
// work factor. This is preserved deliberately — adding a salt or switching
// to a password hash would invalidate every digest already stored in
// existing vault databases. Do not "fix" this without a migration story.

use sha2::{Digest, Sha256};

/// Hash a secret (password or PIN) into a 64-character lowercase hex digest.
/// Deterministic: the same input always produces the same digest. Any
/// string input, including empty, is accepted.
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Check a supplied secret against a stored digest.
pub fn verify_secret(secret: &str, digest: &str) -> bool {
    hash_secret(secret) == digest
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(hash_secret("secret1"), hash_secret("secret1"));
    }

    #[test]
    fn hash_is_fixed_length_hex() {
        for input in ["", "a", "1234", "a much longer passphrase with spaces"] {
            let digest = hash_secret(input);
            assert_eq!(digest.len(), 64);
            assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn known_vector() {
        // SHA-256("") — pins the algorithm so stored digests stay compatible.
        assert_eq!(
            hash_secret(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn verify_round_trips() {
        let digest = hash_secret("correct horse");
        assert!(verify_secret("correct horse", &digest));
    }

    #[test]
    fn single_character_mutation_fails_verification() {
        let digest = hash_secret("secret1");
        assert!(!verify_secret("secret2", &digest));
        assert!(!verify_secret("Secret1", &digest));
        assert!(!verify_secret("secret", &digest));
    }
}
