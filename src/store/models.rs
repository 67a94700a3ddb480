// Lifevault — Store data models
//
// SECURITY: the credential digest fields on `Account` are intentionally
// private and redacted from Debug output. Entry content only ever appears
// here as ciphertext; decryption happens at display time, per entry.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::{Cipher, CryptoError};

// ─── Categories ──────────────────────────────────────────────────────────────

/// The closed set of vault entry categories. Keys are lower-case and matched
/// case-insensitively; no user-defined categories exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Medical,
    Financial,
    Emergency,
    Personal,
    Work,
    Legal,
    Travel,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Medical,
        Category::Financial,
        Category::Emergency,
        Category::Personal,
        Category::Work,
        Category::Legal,
        Category::Travel,
        Category::Other,
    ];

    /// Stable lower-case key, used for persistence and CLI input.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Medical => "medical",
            Category::Financial => "financial",
            Category::Emergency => "emergency",
            Category::Personal => "personal",
            Category::Work => "work",
            Category::Legal => "legal",
            Category::Travel => "travel",
            Category::Other => "other",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Medical => "Medical",
            Category::Financial => "Financial",
            Category::Emergency => "Emergency",
            Category::Personal => "Personal",
            Category::Work => "Work",
            Category::Legal => "Legal",
            Category::Travel => "Travel",
            Category::Other => "Other",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Category::Medical => "Health information, medications, blood type, allergies",
            Category::Financial => "Bank accounts, credit cards, insurance, investments",
            Category::Emergency => "Emergency contacts, procedures, important documents",
            Category::Personal => "Personal documents, IDs, passwords, private notes",
            Category::Work => "Work credentials, projects, professional information",
            Category::Legal => "Legal documents, contracts, important papers",
            Category::Travel => "Travel documents, itineraries, passport info",
            Category::Other => "Miscellaneous important information",
        }
    }

    /// Join categories into the comma-separated key list stored in the
    /// `allowed_categories` column.
    pub fn join_keys(categories: &[Category]) -> String {
        categories
            .iter()
            .map(Category::key)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parse a stored comma-separated list, trimming and lower-casing each
    /// name. Unknown names are skipped on read so one bad token does not
    /// poison a whole contact row.
    pub fn parse_keys(joined: &str) -> Vec<Category> {
        joined
            .split(',')
            .filter_map(|part| part.trim().parse().ok())
            .collect()
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "medical" => Ok(Category::Medical),
            "financial" => Ok(Category::Financial),
            "emergency" => Ok(Category::Emergency),
            "personal" => Ok(Category::Personal),
            "work" => Ok(Category::Work),
            "legal" => Ok(Category::Legal),
            "travel" => Ok(Category::Travel),
            "other" => Ok(Category::Other),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ─── Account ─────────────────────────────────────────────────────────────────

/// A registered account. The password and PIN digests are private — access
/// only via the accessors, and never print them.
#[derive(Clone)]
pub struct Account {
    pub id: i64,
    pub handle: String,
    pub email: Option<String>,
    secret_hash: String,
    pin_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        id: i64,
        handle: String,
        email: Option<String>,
        secret_hash: String,
        pin_hash: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            handle,
            email,
            secret_hash,
            pin_hash,
            created_at,
        }
    }

    /// Stored digest of the primary password.
    pub fn secret_hash(&self) -> &str {
        &self.secret_hash
    }

    /// Stored digest of the 4-digit emergency PIN.
    pub fn pin_hash(&self) -> &str {
        &self.pin_hash
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("handle", &self.handle)
            .field("email", &self.email)
            .field("secret_hash", &"[REDACTED]")
            .field("pin_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

// ─── Vault entries ───────────────────────────────────────────────────────────

/// One encrypted vault entry. Content is stored only as armored ciphertext;
/// decrypt lazily with the session cipher at display time.
#[derive(Debug, Clone)]
pub struct VaultEntry {
    pub id: i64,
    pub account_id: i64,
    pub category: Category,
    pub title: String,
    pub ciphertext: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VaultEntry {
    /// Decrypt this entry's content. A failure here is per-entry: callers
    /// listing many entries must report it and continue with the rest.
    pub fn decrypted_content(&self, cipher: &Cipher) -> Result<String, CryptoError> {
        cipher.decrypt(&self.ciphertext)
    }
}

// ─── Emergency contacts ──────────────────────────────────────────────────────

/// An emergency contact and the categories it may see during emergency
/// access. The permitted set is always non-empty (enforced at write time).
#[derive(Debug, Clone, Serialize)]
pub struct EmergencyContact {
    pub id: i64,
    pub account_id: i64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub allowed_categories: Vec<Category>,
    pub created_at: DateTime<Utc>,
}

// ─── Attempts and events ─────────────────────────────────────────────────────

/// Which credential a failed attempt was against. Login failures and PIN
/// failures are tracked in separate buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptKind {
    Login,
    Pin,
}

impl AttemptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptKind::Login => "login",
            AttemptKind::Pin => "pin",
        }
    }
}

impl fmt::Display for AttemptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the append-only security audit trail. `account_id` is None
/// for pre-authentication events.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityEvent {
    pub id: i64,
    pub account_id: Option<i64>,
    pub action: String,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_keys_parse_case_insensitively() {
        assert_eq!("Medical".parse::<Category>().unwrap(), Category::Medical);
        assert_eq!(" FINANCIAL ".parse::<Category>().unwrap(), Category::Financial);
        assert!("gardening".parse::<Category>().is_err());
    }

    #[test]
    fn category_list_round_trips_lowercased() {
        let parsed = Category::parse_keys("Medical, Financial");
        assert_eq!(parsed, vec![Category::Medical, Category::Financial]);
        assert_eq!(Category::join_keys(&parsed), "medical,financial");
    }

    #[test]
    fn parse_keys_skips_unknown_names() {
        let parsed = Category::parse_keys("medical,unknown,legal");
        assert_eq!(parsed, vec![Category::Medical, Category::Legal]);
    }

    #[test]
    fn account_debug_redacts_digests() {
        let account = Account::new(
            1,
            "alice".to_string(),
            None,
            "aaaa1111".to_string(),
            "bbbb2222".to_string(),
            Utc::now(),
        );
        let debug_output = format!("{:?}", account);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("aaaa1111"));
        assert!(!debug_output.contains("bbbb2222"));
    }

    #[test]
    fn all_categories_have_distinct_keys() {
        let mut keys: Vec<_> = Category::ALL.iter().map(Category::key).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), Category::ALL.len());
    }
}
