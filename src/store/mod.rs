// Lifevault — Store Module
//
// Durable SQLite storage for accounts, encrypted vault entries, emergency
// contacts, failed-attempt records, and the security event trail. The
// database handle is passed explicitly to every consumer — there is no
// process-global connection.

mod db;
mod error;
mod models;
mod repository;

pub use db::Database;
pub use error::StoreError;
pub use models::{
    Account, AttemptKind, Category, EmergencyContact, SecurityEvent, VaultEntry,
};
pub use repository::{SqliteVaultStore, VaultStore};
