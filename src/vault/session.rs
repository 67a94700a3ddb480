// Lifevault — Session cache
//
// Transient in-memory view of the active account's entries. The cache is
// rebuilt from the store after every mutation — an explicit reload, never
// aliasing of objects mutated elsewhere. It lives only for the current
// process invocation; nothing here is persisted.

use crate::store::{Account, Category, VaultEntry, VaultStore};

use super::service::VaultService;
use super::VaultError;

pub struct Session {
    account: Account,
    entries: Vec<VaultEntry>,
}

impl Session {
    /// Open a session for an authenticated account and fill the cache.
    pub fn open<S: VaultStore>(
        vault: &VaultService<'_, S>,
        account: Account,
    ) -> Result<Self, VaultError> {
        let entries = vault.list_entries(account.id)?;
        Ok(Self { account, entries })
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    /// The cached entries as of the last load or mutation.
    pub fn entries(&self) -> &[VaultEntry] {
        &self.entries
    }

    /// Rebuild the cache from the store.
    pub fn reload<S: VaultStore>(&mut self, vault: &VaultService<'_, S>) -> Result<(), VaultError> {
        self.entries = vault.list_entries(self.account.id)?;
        Ok(())
    }

    pub fn add_entry<S: VaultStore>(
        &mut self,
        vault: &VaultService<'_, S>,
        category: Category,
        title: &str,
        content: &str,
    ) -> Result<i64, VaultError> {
        let entry = vault.add_entry(self.account.id, category, title, content)?;
        self.reload(vault)?;
        Ok(entry.id)
    }

    pub fn edit_entry<S: VaultStore>(
        &mut self,
        vault: &VaultService<'_, S>,
        entry_id: i64,
        category: Option<Category>,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<(), VaultError> {
        vault.edit_entry(self.account.id, entry_id, category, title, content)?;
        self.reload(vault)
    }

    pub fn delete_entry<S: VaultStore>(
        &mut self,
        vault: &VaultService<'_, S>,
        entry_id: i64,
    ) -> Result<(), VaultError> {
        vault.delete_entry(self.account.id, entry_id)?;
        self.reload(vault)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
