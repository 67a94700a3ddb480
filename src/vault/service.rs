// Lifevault — Vault Service
//
// CRUD flows for encrypted entries and emergency contacts, plus the
// category-restricted emergency view. Every mutation is audit-logged. The
// storage handle and cipher are injected; this service owns neither.

use crate::crypto::Cipher;
use crate::store::{Category, EmergencyContact, SecurityEvent, VaultEntry, VaultStore};

use super::VaultError;

pub struct VaultService<'a, S: VaultStore> {
    store: &'a S,
    cipher: &'a Cipher,
}

impl<'a, S: VaultStore> VaultService<'a, S> {
    pub fn new(store: &'a S, cipher: &'a Cipher) -> Self {
        Self { store, cipher }
    }

    pub fn store(&self) -> &'a S {
        self.store
    }

    pub fn cipher(&self) -> &'a Cipher {
        self.cipher
    }

    // ── Entries ──────────────────────────────────────────────────────────────

    pub fn add_entry(
        &self,
        account_id: i64,
        category: Category,
        title: &str,
        content: &str,
    ) -> Result<VaultEntry, VaultError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(VaultError::Validation("title cannot be empty".to_string()));
        }
        if content.trim().is_empty() {
            return Err(VaultError::Validation("content cannot be empty".to_string()));
        }

        let ciphertext = self.cipher.encrypt(content)?;
        let entry = self.store.insert_entry(account_id, category, title, &ciphertext)?;

        self.store.log_event(
            Some(account_id),
            "entry_added",
            Some(&format!("Category: {}, Title: {}", category.key(), title)),
        )?;
        Ok(entry)
    }

    /// Edit an entry; `None` fields keep their current values. Content —
    /// new or carried over — is re-encrypted, so `updated_at` always moves
    /// while `created_at` never does.
    pub fn edit_entry(
        &self,
        account_id: i64,
        entry_id: i64,
        category: Option<Category>,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<(), VaultError> {
        let current = self
            .store
            .entry_by_id(account_id, entry_id)?
            .ok_or_else(|| VaultError::NotFound(format!("entry {}", entry_id)))?;

        let category = category.unwrap_or(current.category);
        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => current.title.clone(),
        };
        let plaintext = match content {
            Some(c) if !c.trim().is_empty() => c.to_string(),
            _ => current.decrypted_content(self.cipher)?,
        };

        let ciphertext = self.cipher.encrypt(&plaintext)?;
        self.store
            .update_entry(account_id, entry_id, category, &title, &ciphertext)?;

        self.store.log_event(
            Some(account_id),
            "entry_edited",
            Some(&format!("Entry ID: {}", entry_id)),
        )?;
        Ok(())
    }

    pub fn delete_entry(&self, account_id: i64, entry_id: i64) -> Result<(), VaultError> {
        let entry = self
            .store
            .entry_by_id(account_id, entry_id)?
            .ok_or_else(|| VaultError::NotFound(format!("entry {}", entry_id)))?;

        self.store.delete_entry(account_id, entry_id)?;
        self.store.log_event(
            Some(account_id),
            "entry_deleted",
            Some(&format!("Entry ID: {}, Title: {}", entry_id, entry.title)),
        )?;
        Ok(())
    }

    /// All entries for an account, ciphertext included. Decrypt per entry
    /// at display time so one bad entry never hides the others.
    pub fn list_entries(&self, account_id: i64) -> Result<Vec<VaultEntry>, VaultError> {
        Ok(self.store.entries_for_account(account_id)?)
    }

    /// Case-insensitive search over titles and decrypted content.
    /// Entries whose content cannot be decrypted still match on title.
    pub fn search_entries(
        &self,
        account_id: i64,
        term: &str,
    ) -> Result<Vec<VaultEntry>, VaultError> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Err(VaultError::Validation(
                "search term cannot be empty".to_string(),
            ));
        }

        let mut results = Vec::new();
        for entry in self.store.entries_for_account(account_id)? {
            let title_hit = entry.title.to_lowercase().contains(&term);
            let content_hit = entry
                .decrypted_content(self.cipher)
                .map(|c| c.to_lowercase().contains(&term))
                .unwrap_or(false);
            if title_hit || content_hit {
                results.push(entry);
            }
        }

        self.store.log_event(
            Some(account_id),
            "entries_searched",
            Some(&format!("Search term: {}", term)),
        )?;
        Ok(results)
    }

    // ── Emergency contacts ───────────────────────────────────────────────────

    pub fn add_contact(
        &self,
        account_id: i64,
        name: &str,
        phone: &str,
        email: Option<&str>,
        allowed: &[Category],
    ) -> Result<EmergencyContact, VaultError> {
        let name = name.trim();
        let phone = phone.trim();
        if name.is_empty() {
            return Err(VaultError::Validation("name cannot be empty".to_string()));
        }
        if phone.is_empty() {
            return Err(VaultError::Validation("phone cannot be empty".to_string()));
        }
        if allowed.is_empty() {
            return Err(VaultError::Validation(
                "contact must be permitted at least one category".to_string(),
            ));
        }

        let contact = self
            .store
            .insert_contact(account_id, name, phone, email, allowed)?;
        self.store.log_event(
            Some(account_id),
            "emergency_contact_added",
            Some(&format!("Contact: {}", name)),
        )?;
        Ok(contact)
    }

    /// Edit a contact; `None` fields keep their current values.
    pub fn edit_contact(
        &self,
        account_id: i64,
        contact_id: i64,
        name: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
        allowed: Option<&[Category]>,
    ) -> Result<(), VaultError> {
        let current = self
            .store
            .contact_by_id(account_id, contact_id)?
            .ok_or_else(|| VaultError::NotFound(format!("contact {}", contact_id)))?;

        let name = name.map(str::trim).filter(|s| !s.is_empty());
        let phone = phone.map(str::trim).filter(|s| !s.is_empty());
        let allowed = allowed.unwrap_or(&current.allowed_categories);
        if allowed.is_empty() {
            return Err(VaultError::Validation(
                "contact must be permitted at least one category".to_string(),
            ));
        }

        self.store.update_contact(
            account_id,
            contact_id,
            name.unwrap_or(&current.name),
            phone.unwrap_or(&current.phone),
            email.or(current.email.as_deref()),
            allowed,
        )?;
        self.store.log_event(
            Some(account_id),
            "emergency_contact_edited",
            Some(&format!("Contact: {}", current.name)),
        )?;
        Ok(())
    }

    pub fn delete_contact(&self, account_id: i64, contact_id: i64) -> Result<(), VaultError> {
        let contact = self
            .store
            .contact_by_id(account_id, contact_id)?
            .ok_or_else(|| VaultError::NotFound(format!("contact {}", contact_id)))?;

        self.store.delete_contact(account_id, contact_id)?;
        self.store.log_event(
            Some(account_id),
            "emergency_contact_deleted",
            Some(&format!("Contact: {}", contact.name)),
        )?;
        Ok(())
    }

    pub fn list_contacts(&self, account_id: i64) -> Result<Vec<EmergencyContact>, VaultError> {
        Ok(self.store.contacts_for_account(account_id)?)
    }

    // ── Emergency view ───────────────────────────────────────────────────────

    /// The read-only view granted after emergency PIN authentication: the
    /// account's contacts plus only the entries whose category appears in
    /// the union of the contacts' permitted sets.
    pub fn emergency_view(
        &self,
        account_id: i64,
    ) -> Result<(Vec<EmergencyContact>, Vec<VaultEntry>), VaultError> {
        let contacts = self.store.contacts_for_account(account_id)?;

        let mut permitted: Vec<Category> = Vec::new();
        for contact in &contacts {
            for category in &contact.allowed_categories {
                if !permitted.contains(category) {
                    permitted.push(*category);
                }
            }
        }

        let entries = self
            .store
            .entries_for_account(account_id)?
            .into_iter()
            .filter(|e| permitted.contains(&e.category))
            .collect();

        Ok((contacts, entries))
    }

    // ── Security events ──────────────────────────────────────────────────────

    pub fn recent_events(
        &self,
        account_id: i64,
        limit: usize,
    ) -> Result<Vec<SecurityEvent>, VaultError> {
        Ok(self.store.recent_events(account_id, limit)?)
    }
}

/// Parse a comma-separated category list from user input, trimming and
/// matching case-insensitively. Unknown names are an error here (unlike the
/// tolerant read path); duplicates collapse, order is preserved.
pub fn parse_category_list(input: &str) -> Result<Vec<Category>, VaultError> {
    let mut categories = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let category: Category = part
            .parse()
            .map_err(VaultError::Validation)?;
        if !categories.contains(&category) {
            categories.push(category);
        }
    }
    if categories.is_empty() {
        return Err(VaultError::Validation(
            "at least one category is required".to_string(),
        ));
    }
    Ok(categories)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Database, SqliteVaultStore};

    fn test_cipher() -> Cipher {
        Cipher::from_key(&[3u8; 32])
    }

    fn setup(db: &Database) -> i64 {
        SqliteVaultStore::new(db)
            .create_account("alice", "h", None, "p")
            .unwrap()
            .id
    }

    #[test]
    fn add_then_list_decrypts_content() {
        let db = Database::open_in_memory().unwrap();
        let account_id = setup(&db);
        let store = SqliteVaultStore::new(&db);
        let cipher = test_cipher();
        let vault = VaultService::new(&store, &cipher);

        vault
            .add_entry(account_id, Category::Financial, "Bank", "acct 123")
            .unwrap();

        let entries = vault.list_entries(account_id).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Bank");
        assert_eq!(entries[0].decrypted_content(&cipher).unwrap(), "acct 123");
        assert_ne!(entries[0].ciphertext, "acct 123");
    }

    #[test]
    fn empty_title_or_content_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let account_id = setup(&db);
        let store = SqliteVaultStore::new(&db);
        let cipher = test_cipher();
        let vault = VaultService::new(&store, &cipher);

        assert!(matches!(
            vault.add_entry(account_id, Category::Other, "  ", "content"),
            Err(VaultError::Validation(_))
        ));
        assert!(matches!(
            vault.add_entry(account_id, Category::Other, "title", ""),
            Err(VaultError::Validation(_))
        ));
    }

    #[test]
    fn edit_keeps_unspecified_fields_and_reencrypts() {
        let db = Database::open_in_memory().unwrap();
        let account_id = setup(&db);
        let store = SqliteVaultStore::new(&db);
        let cipher = test_cipher();
        let vault = VaultService::new(&store, &cipher);

        let entry = vault
            .add_entry(account_id, Category::Medical, "Allergies", "peanuts")
            .unwrap();
        let old_ciphertext = entry.ciphertext.clone();

        vault
            .edit_entry(account_id, entry.id, None, Some("Allergies (updated)"), None)
            .unwrap();

        let reloaded = store.entry_by_id(account_id, entry.id).unwrap().unwrap();
        assert_eq!(reloaded.title, "Allergies (updated)");
        assert_eq!(reloaded.category, Category::Medical);
        assert_eq!(reloaded.decrypted_content(&cipher).unwrap(), "peanuts");
        // Carried content is re-encrypted under a fresh nonce.
        assert_ne!(reloaded.ciphertext, old_ciphertext);
    }

    #[test]
    fn edit_missing_entry_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let account_id = setup(&db);
        let store = SqliteVaultStore::new(&db);
        let cipher = test_cipher();
        let vault = VaultService::new(&store, &cipher);

        assert!(matches!(
            vault.edit_entry(account_id, 42, None, Some("x"), None),
            Err(VaultError::NotFound(_))
        ));
    }

    #[test]
    fn undecryptable_entry_fails_alone_in_listing() {
        let db = Database::open_in_memory().unwrap();
        let account_id = setup(&db);
        let store = SqliteVaultStore::new(&db);
        let cipher = test_cipher();
        let vault = VaultService::new(&store, &cipher);

        vault
            .add_entry(account_id, Category::Personal, "Good", "readable")
            .unwrap();
        // Simulate an entry written under a different key.
        let foreign = Cipher::from_key(&[9u8; 32]).encrypt("hidden").unwrap();
        store
            .insert_entry(account_id, Category::Personal, "Bad", &foreign)
            .unwrap();

        let entries = vault.list_entries(account_id).unwrap();
        assert_eq!(entries.len(), 2);

        let outcomes: Vec<bool> = entries
            .iter()
            .map(|e| e.decrypted_content(&cipher).is_ok())
            .collect();
        assert_eq!(outcomes, vec![true, false]);
    }

    #[test]
    fn search_matches_title_and_content_case_insensitively() {
        let db = Database::open_in_memory().unwrap();
        let account_id = setup(&db);
        let store = SqliteVaultStore::new(&db);
        let cipher = test_cipher();
        let vault = VaultService::new(&store, &cipher);

        vault
            .add_entry(account_id, Category::Financial, "Bank", "acct 123")
            .unwrap();
        vault
            .add_entry(account_id, Category::Travel, "Passport", "expires 2030")
            .unwrap();

        let by_title = vault.search_entries(account_id, "BANK").unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].title, "Bank");

        let by_content = vault.search_entries(account_id, "2030").unwrap();
        assert_eq!(by_content.len(), 1);
        assert_eq!(by_content[0].title, "Passport");

        assert!(vault.search_entries(account_id, "nothing").unwrap().is_empty());
    }

    #[test]
    fn contact_requires_nonempty_category_set() {
        let db = Database::open_in_memory().unwrap();
        let account_id = setup(&db);
        let store = SqliteVaultStore::new(&db);
        let cipher = test_cipher();
        let vault = VaultService::new(&store, &cipher);

        assert!(matches!(
            vault.add_contact(account_id, "Dana", "555-0100", None, &[]),
            Err(VaultError::Validation(_))
        ));

        let contact = vault
            .add_contact(account_id, "Dana", "555-0100", None, &[Category::Medical])
            .unwrap();
        assert_eq!(contact.allowed_categories, vec![Category::Medical]);
    }

    #[test]
    fn edit_contact_keeps_unspecified_fields() {
        let db = Database::open_in_memory().unwrap();
        let account_id = setup(&db);
        let store = SqliteVaultStore::new(&db);
        let cipher = test_cipher();
        let vault = VaultService::new(&store, &cipher);

        let contact = vault
            .add_contact(
                account_id,
                "Dana",
                "555-0100",
                Some("dana@example.com"),
                &[Category::Medical],
            )
            .unwrap();

        vault
            .edit_contact(account_id, contact.id, None, Some("555-0199"), None, None)
            .unwrap();

        let reloaded = store.contact_by_id(account_id, contact.id).unwrap().unwrap();
        assert_eq!(reloaded.name, "Dana");
        assert_eq!(reloaded.phone, "555-0199");
        assert_eq!(reloaded.email.as_deref(), Some("dana@example.com"));
        assert_eq!(reloaded.allowed_categories, vec![Category::Medical]);
    }

    #[test]
    fn emergency_view_filters_by_permitted_union() {
        let db = Database::open_in_memory().unwrap();
        let account_id = setup(&db);
        let store = SqliteVaultStore::new(&db);
        let cipher = test_cipher();
        let vault = VaultService::new(&store, &cipher);

        vault
            .add_entry(account_id, Category::Medical, "Blood type", "O-")
            .unwrap();
        vault
            .add_entry(account_id, Category::Financial, "Bank", "acct 123")
            .unwrap();
        vault
            .add_entry(account_id, Category::Personal, "Diary", "private")
            .unwrap();

        vault
            .add_contact(account_id, "Dana", "555-0100", None, &[Category::Medical])
            .unwrap();
        vault
            .add_contact(account_id, "Eli", "555-0101", None, &[Category::Financial])
            .unwrap();

        let (contacts, entries) = vault.emergency_view(account_id).unwrap();
        assert_eq!(contacts.len(), 2);

        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Blood type", "Bank"]);
    }

    #[test]
    fn emergency_view_with_no_contacts_shows_nothing() {
        let db = Database::open_in_memory().unwrap();
        let account_id = setup(&db);
        let store = SqliteVaultStore::new(&db);
        let cipher = test_cipher();
        let vault = VaultService::new(&store, &cipher);

        vault
            .add_entry(account_id, Category::Medical, "Blood type", "O-")
            .unwrap();

        let (contacts, entries) = vault.emergency_view(account_id).unwrap();
        assert!(contacts.is_empty());
        assert!(entries.is_empty());
    }

    #[test]
    fn parse_category_list_lowercases_trims_and_dedupes() {
        let parsed = parse_category_list("Medical, Financial,medical").unwrap();
        assert_eq!(parsed, vec![Category::Medical, Category::Financial]);

        assert!(matches!(
            parse_category_list("medical,gardening"),
            Err(VaultError::Validation(_))
        ));
        assert!(matches!(
            parse_category_list(" , "),
            Err(VaultError::Validation(_))
        ));
    }

    #[test]
    fn mutations_are_audit_logged() {
        let db = Database::open_in_memory().unwrap();
        let account_id = setup(&db);
        let store = SqliteVaultStore::new(&db);
        let cipher = test_cipher();
        let vault = VaultService::new(&store, &cipher);

        let entry = vault
            .add_entry(account_id, Category::Work, "VPN", "hunter2hunter2")
            .unwrap();
        vault.delete_entry(account_id, entry.id).unwrap();

        let actions: Vec<String> = vault
            .recent_events(account_id, 10)
            .unwrap()
            .into_iter()
            .map(|e| e.action)
            .collect();
        assert_eq!(actions, vec!["entry_deleted", "entry_added"]);
    }
}
