// Lifevault — Library root
//
// Re-exports the crypto, store, auth, vault, and CLI modules.

pub mod auth;
pub mod cli;
pub mod crypto;
pub mod error;
pub mod store;
pub mod vault;

pub use error::{LifevaultError, Result};
