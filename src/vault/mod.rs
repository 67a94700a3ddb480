// Lifevault — Vault Module
//
// Entry and contact CRUD over the store and cipher, the per-session entry
// cache, and security-event queries. Entry content crosses this module only
// as plaintext on the way in (encrypted before insert) and as ciphertext on
// the way out (decrypted per entry at display time).

mod error;
mod service;
mod session;

pub use error::VaultError;
pub use service::{parse_category_list, VaultService};
pub use session::Session;
