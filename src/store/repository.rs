// Lifevault — Vault Store Repository
//
// CRUD over accounts, encrypted entries, emergency contacts, failed-attempt
// records, and security events. Every write goes straight to disk; nothing
// is batched or retried. Entry and contact operations are always scoped to
// the owning account id so one account can never touch another's rows.

use chrono::{DateTime, Utc};
use rusqlite::params;

use super::db::Database;
use super::models::{
    Account, AttemptKind, Category, EmergencyContact, SecurityEvent, VaultEntry,
};
use super::StoreError;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over durable vault storage. The SQLite implementation below
/// is the only one in production; the trait exists so services take the
/// storage dependency explicitly instead of reaching for a global handle.
pub trait VaultStore {
    // Accounts
    fn create_account(
        &self,
        handle: &str,
        secret_hash: &str,
        email: Option<&str>,
        pin_hash: &str,
    ) -> Result<Account, StoreError>;

    /// Look up an account by its unique handle.
    fn find_account(&self, handle: &str) -> Result<Option<Account>, StoreError>;

    fn account_by_id(&self, account_id: i64) -> Result<Option<Account>, StoreError>;

    fn update_secret_hash(&self, account_id: i64, new_hash: &str) -> Result<(), StoreError>;

    fn update_pin_hash(&self, account_id: i64, new_hash: &str) -> Result<(), StoreError>;

    fn update_email(&self, account_id: i64, new_email: &str) -> Result<(), StoreError>;

    // Vault entries
    fn insert_entry(
        &self,
        account_id: i64,
        category: Category,
        title: &str,
        ciphertext: &str,
    ) -> Result<VaultEntry, StoreError>;

    /// Rewrite an entry's category, title, and ciphertext. Refreshes
    /// `updated_at`; `created_at` is never touched.
    fn update_entry(
        &self,
        account_id: i64,
        entry_id: i64,
        category: Category,
        title: &str,
        ciphertext: &str,
    ) -> Result<bool, StoreError>;

    fn delete_entry(&self, account_id: i64, entry_id: i64) -> Result<bool, StoreError>;

    fn entry_by_id(&self, account_id: i64, entry_id: i64)
        -> Result<Option<VaultEntry>, StoreError>;

    fn entries_for_account(&self, account_id: i64) -> Result<Vec<VaultEntry>, StoreError>;

    // Emergency contacts
    fn insert_contact(
        &self,
        account_id: i64,
        name: &str,
        phone: &str,
        email: Option<&str>,
        allowed: &[Category],
    ) -> Result<EmergencyContact, StoreError>;

    fn update_contact(
        &self,
        account_id: i64,
        contact_id: i64,
        name: &str,
        phone: &str,
        email: Option<&str>,
        allowed: &[Category],
    ) -> Result<bool, StoreError>;

    fn delete_contact(&self, account_id: i64, contact_id: i64) -> Result<bool, StoreError>;

    fn contact_by_id(
        &self,
        account_id: i64,
        contact_id: i64,
    ) -> Result<Option<EmergencyContact>, StoreError>;

    fn contacts_for_account(&self, account_id: i64)
        -> Result<Vec<EmergencyContact>, StoreError>;

    // Failed attempts (append-only)
    fn record_attempt(&self, account_id: i64, kind: AttemptKind) -> Result<(), StoreError>;

    /// All recorded failure timestamps for one account and kind. The lock
    /// decision is computed over these in `auth::lockout`, not in SQL.
    fn attempt_times(
        &self,
        account_id: i64,
        kind: AttemptKind,
    ) -> Result<Vec<DateTime<Utc>>, StoreError>;

    // Security events (append-only)
    fn log_event(
        &self,
        account_id: Option<i64>,
        action: &str,
        detail: Option<&str>,
    ) -> Result<(), StoreError>;

    /// The most recent events for an account, newest first.
    fn recent_events(&self, account_id: i64, limit: usize)
        -> Result<Vec<SecurityEvent>, StoreError>;
}

// ─── SQLite implementation ───────────────────────────────────────────────────

pub struct SqliteVaultStore<'a> {
    db: &'a Database,
}

impl<'a> SqliteVaultStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn parse_ts(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn row_to_account(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
        let id: i64 = row.get(0)?;
        let handle: String = row.get(1)?;
        let secret_hash: String = row.get(2)?;
        let email: Option<String> = row.get(3)?;
        let pin_hash: String = row.get(4)?;
        let created_at: String = row.get(5)?;
        Ok(Account::new(
            id,
            handle,
            email,
            secret_hash,
            pin_hash,
            Self::parse_ts(&created_at),
        ))
    }

    fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<VaultEntry> {
        let id: i64 = row.get(0)?;
        let account_id: i64 = row.get(1)?;
        let category_key: String = row.get(2)?;
        let title: String = row.get(3)?;
        let ciphertext: String = row.get(4)?;
        let created_at: String = row.get(5)?;
        let updated_at: String = row.get(6)?;

        let category = category_key.parse::<Category>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                e.into(),
            )
        })?;

        Ok(VaultEntry {
            id,
            account_id,
            category,
            title,
            ciphertext,
            created_at: Self::parse_ts(&created_at),
            updated_at: Self::parse_ts(&updated_at),
        })
    }

    fn row_to_contact(row: &rusqlite::Row<'_>) -> rusqlite::Result<EmergencyContact> {
        let id: i64 = row.get(0)?;
        let account_id: i64 = row.get(1)?;
        let name: String = row.get(2)?;
        let phone: String = row.get(3)?;
        let email: Option<String> = row.get(4)?;
        let joined: String = row.get(5)?;
        let created_at: String = row.get(6)?;

        Ok(EmergencyContact {
            id,
            account_id,
            name,
            phone,
            email,
            allowed_categories: Category::parse_keys(&joined),
            created_at: Self::parse_ts(&created_at),
        })
    }

    fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<SecurityEvent> {
        let id: i64 = row.get(0)?;
        let account_id: Option<i64> = row.get(1)?;
        let action: String = row.get(2)?;
        let detail: Option<String> = row.get(3)?;
        let created_at: String = row.get(4)?;

        Ok(SecurityEvent {
            id,
            account_id,
            action,
            detail,
            created_at: Self::parse_ts(&created_at),
        })
    }
}

impl<'a> VaultStore for SqliteVaultStore<'a> {
    fn create_account(
        &self,
        handle: &str,
        secret_hash: &str,
        email: Option<&str>,
        pin_hash: &str,
    ) -> Result<Account, StoreError> {
        let now = Utc::now();

        let result = self.db.conn().execute(
            "INSERT INTO accounts (handle, secret_hash, email, pin_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![handle, secret_hash, email, pin_hash, now.to_rfc3339()],
        );

        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(StoreError::DuplicateAccount(handle.to_string()));
            }
            Err(e) => return Err(StoreError::Database(e)),
        }

        let id = self.db.conn().last_insert_rowid();
        tracing::info!(account_id = id, handle = %handle, "Account created");

        Ok(Account::new(
            id,
            handle.to_string(),
            email.map(str::to_string),
            secret_hash.to_string(),
            pin_hash.to_string(),
            now,
        ))
    }

    fn find_account(&self, handle: &str) -> Result<Option<Account>, StoreError> {
        let mut stmt = self.db.conn().prepare(
            "SELECT id, handle, secret_hash, email, pin_hash, created_at
             FROM accounts WHERE handle = ?1",
        )?;
        let mut rows = stmt.query_map(params![handle], Self::row_to_account)?;

        match rows.next() {
            Some(Ok(account)) => Ok(Some(account)),
            Some(Err(e)) => Err(StoreError::Database(e)),
            None => Ok(None),
        }
    }

    fn account_by_id(&self, account_id: i64) -> Result<Option<Account>, StoreError> {
        let mut stmt = self.db.conn().prepare(
            "SELECT id, handle, secret_hash, email, pin_hash, created_at
             FROM accounts WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![account_id], Self::row_to_account)?;

        match rows.next() {
            Some(Ok(account)) => Ok(Some(account)),
            Some(Err(e)) => Err(StoreError::Database(e)),
            None => Ok(None),
        }
    }

    fn update_secret_hash(&self, account_id: i64, new_hash: &str) -> Result<(), StoreError> {
        let affected = self.db.conn().execute(
            "UPDATE accounts SET secret_hash = ?1 WHERE id = ?2",
            params![new_hash, account_id],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("account {}", account_id)));
        }
        Ok(())
    }

    fn update_pin_hash(&self, account_id: i64, new_hash: &str) -> Result<(), StoreError> {
        let affected = self.db.conn().execute(
            "UPDATE accounts SET pin_hash = ?1 WHERE id = ?2",
            params![new_hash, account_id],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("account {}", account_id)));
        }
        Ok(())
    }

    fn update_email(&self, account_id: i64, new_email: &str) -> Result<(), StoreError> {
        let affected = self.db.conn().execute(
            "UPDATE accounts SET email = ?1 WHERE id = ?2",
            params![new_email, account_id],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("account {}", account_id)));
        }
        Ok(())
    }

    fn insert_entry(
        &self,
        account_id: i64,
        category: Category,
        title: &str,
        ciphertext: &str,
    ) -> Result<VaultEntry, StoreError> {
        let now = Utc::now();
        self.db.conn().execute(
            "INSERT INTO entries (account_id, category, title, ciphertext, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                account_id,
                category.key(),
                title,
                ciphertext,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;

        let id = self.db.conn().last_insert_rowid();
        tracing::debug!(entry_id = id, account_id, category = category.key(), "Entry stored");

        Ok(VaultEntry {
            id,
            account_id,
            category,
            title: title.to_string(),
            ciphertext: ciphertext.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    fn update_entry(
        &self,
        account_id: i64,
        entry_id: i64,
        category: Category,
        title: &str,
        ciphertext: &str,
    ) -> Result<bool, StoreError> {
        let affected = self.db.conn().execute(
            "UPDATE entries SET category = ?1, title = ?2, ciphertext = ?3, updated_at = ?4
             WHERE id = ?5 AND account_id = ?6",
            params![
                category.key(),
                title,
                ciphertext,
                Utc::now().to_rfc3339(),
                entry_id,
                account_id,
            ],
        )?;
        Ok(affected > 0)
    }

    fn delete_entry(&self, account_id: i64, entry_id: i64) -> Result<bool, StoreError> {
        let affected = self.db.conn().execute(
            "DELETE FROM entries WHERE id = ?1 AND account_id = ?2",
            params![entry_id, account_id],
        )?;
        Ok(affected > 0)
    }

    fn entry_by_id(
        &self,
        account_id: i64,
        entry_id: i64,
    ) -> Result<Option<VaultEntry>, StoreError> {
        let mut stmt = self.db.conn().prepare(
            "SELECT id, account_id, category, title, ciphertext, created_at, updated_at
             FROM entries WHERE id = ?1 AND account_id = ?2",
        )?;
        let mut rows = stmt.query_map(params![entry_id, account_id], Self::row_to_entry)?;

        match rows.next() {
            Some(Ok(entry)) => Ok(Some(entry)),
            Some(Err(e)) => Err(StoreError::Database(e)),
            None => Ok(None),
        }
    }

    fn entries_for_account(&self, account_id: i64) -> Result<Vec<VaultEntry>, StoreError> {
        let mut stmt = self.db.conn().prepare(
            "SELECT id, account_id, category, title, ciphertext, created_at, updated_at
             FROM entries WHERE account_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![account_id], Self::row_to_entry)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn insert_contact(
        &self,
        account_id: i64,
        name: &str,
        phone: &str,
        email: Option<&str>,
        allowed: &[Category],
    ) -> Result<EmergencyContact, StoreError> {
        let now = Utc::now();
        self.db.conn().execute(
            "INSERT INTO contacts (account_id, name, phone, email, allowed_categories, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                account_id,
                name,
                phone,
                email,
                Category::join_keys(allowed),
                now.to_rfc3339(),
            ],
        )?;

        let id = self.db.conn().last_insert_rowid();
        tracing::debug!(contact_id = id, account_id, "Emergency contact stored");

        Ok(EmergencyContact {
            id,
            account_id,
            name: name.to_string(),
            phone: phone.to_string(),
            email: email.map(str::to_string),
            allowed_categories: allowed.to_vec(),
            created_at: now,
        })
    }

    fn update_contact(
        &self,
        account_id: i64,
        contact_id: i64,
        name: &str,
        phone: &str,
        email: Option<&str>,
        allowed: &[Category],
    ) -> Result<bool, StoreError> {
        let affected = self.db.conn().execute(
            "UPDATE contacts SET name = ?1, phone = ?2, email = ?3, allowed_categories = ?4
             WHERE id = ?5 AND account_id = ?6",
            params![
                name,
                phone,
                email,
                Category::join_keys(allowed),
                contact_id,
                account_id,
            ],
        )?;
        Ok(affected > 0)
    }

    fn delete_contact(&self, account_id: i64, contact_id: i64) -> Result<bool, StoreError> {
        let affected = self.db.conn().execute(
            "DELETE FROM contacts WHERE id = ?1 AND account_id = ?2",
            params![contact_id, account_id],
        )?;
        Ok(affected > 0)
    }

    fn contact_by_id(
        &self,
        account_id: i64,
        contact_id: i64,
    ) -> Result<Option<EmergencyContact>, StoreError> {
        let mut stmt = self.db.conn().prepare(
            "SELECT id, account_id, name, phone, email, allowed_categories, created_at
             FROM contacts WHERE id = ?1 AND account_id = ?2",
        )?;
        let mut rows = stmt.query_map(params![contact_id, account_id], Self::row_to_contact)?;

        match rows.next() {
            Some(Ok(contact)) => Ok(Some(contact)),
            Some(Err(e)) => Err(StoreError::Database(e)),
            None => Ok(None),
        }
    }

    fn contacts_for_account(
        &self,
        account_id: i64,
    ) -> Result<Vec<EmergencyContact>, StoreError> {
        let mut stmt = self.db.conn().prepare(
            "SELECT id, account_id, name, phone, email, allowed_categories, created_at
             FROM contacts WHERE account_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![account_id], Self::row_to_contact)?;

        let mut contacts = Vec::new();
        for row in rows {
            contacts.push(row?);
        }
        Ok(contacts)
    }

    fn record_attempt(&self, account_id: i64, kind: AttemptKind) -> Result<(), StoreError> {
        self.db.conn().execute(
            "INSERT INTO failed_attempts (account_id, kind, created_at) VALUES (?1, ?2, ?3)",
            params![account_id, kind.as_str(), Utc::now().to_rfc3339()],
        )?;
        tracing::warn!(account_id, kind = kind.as_str(), "Failed attempt recorded");
        Ok(())
    }

    fn attempt_times(
        &self,
        account_id: i64,
        kind: AttemptKind,
    ) -> Result<Vec<DateTime<Utc>>, StoreError> {
        let mut stmt = self.db.conn().prepare(
            "SELECT created_at FROM failed_attempts
             WHERE account_id = ?1 AND kind = ?2 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![account_id, kind.as_str()], |row| {
            let raw: String = row.get(0)?;
            Ok(Self::parse_ts(&raw))
        })?;

        let mut times = Vec::new();
        for row in rows {
            times.push(row?);
        }
        Ok(times)
    }

    fn log_event(
        &self,
        account_id: Option<i64>,
        action: &str,
        detail: Option<&str>,
    ) -> Result<(), StoreError> {
        self.db.conn().execute(
            "INSERT INTO security_events (account_id, action, detail, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![account_id, action, detail, Utc::now().to_rfc3339()],
        )?;

        tracing::debug!(?account_id, action = %action, "Security event recorded");
        Ok(())
    }

    fn recent_events(
        &self,
        account_id: i64,
        limit: usize,
    ) -> Result<Vec<SecurityEvent>, StoreError> {
        let mut stmt = self.db.conn().prepare(
            "SELECT id, account_id, action, detail, created_at
             FROM security_events WHERE account_id = ?1
             ORDER BY id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![account_id, limit as i64], Self::row_to_event)?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
