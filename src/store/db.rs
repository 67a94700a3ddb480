// Lifevault — Database Management
//
// Opens the SQLite database and runs the idempotent schema migrations.
// Foreign-key enforcement is switched on per connection; SQLite leaves it
// off by default.

use rusqlite::Connection;

use super::StoreError;

/// Wrapper around the vault's SQLite connection.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &std::path::Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let db = Self { conn };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (tests only).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let db = Self { conn };
        db.run_migrations()?;
        Ok(db)
    }

    /// Get a reference to the underlying connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Create or update the schema. Safe to run on every open.
    fn run_migrations(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS accounts (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                handle          TEXT NOT NULL UNIQUE,
                secret_hash     TEXT NOT NULL,
                email           TEXT,
                pin_hash        TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS entries (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id      INTEGER NOT NULL,
                category        TEXT NOT NULL,
                title           TEXT NOT NULL,
                ciphertext      TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL,
                FOREIGN KEY(account_id) REFERENCES accounts(id)
            );

            CREATE TABLE IF NOT EXISTS contacts (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id          INTEGER NOT NULL,
                name                TEXT NOT NULL,
                phone               TEXT NOT NULL,
                email               TEXT,
                allowed_categories  TEXT NOT NULL,
                created_at          TEXT NOT NULL,
                FOREIGN KEY(account_id) REFERENCES accounts(id)
            );

            CREATE TABLE IF NOT EXISTS failed_attempts (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id      INTEGER NOT NULL,
                kind            TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                FOREIGN KEY(account_id) REFERENCES accounts(id)
            );

            CREATE TABLE IF NOT EXISTS security_events (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id      INTEGER,
                action          TEXT NOT NULL,
                detail          TEXT,
                created_at      TEXT NOT NULL,
                FOREIGN KEY(account_id) REFERENCES accounts(id)
            );

            CREATE INDEX IF NOT EXISTS idx_entries_account
                ON entries(account_id);

            CREATE INDEX IF NOT EXISTS idx_contacts_account
                ON contacts(account_id);

            CREATE INDEX IF NOT EXISTS idx_attempts_account_kind
                ON failed_attempts(account_id, kind);

            CREATE INDEX IF NOT EXISTS idx_events_account
                ON security_events(account_id);
            ",
        )?;

        tracing::debug!("Database migrations completed");
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(db: &Database, name: &str) -> bool {
        let count: i64 = db
            .conn()
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [name],
                |row| row.get(0),
            )
            .unwrap();
        count == 1
    }

    #[test]
    fn migrations_create_all_tables() {
        let db = Database::open_in_memory().unwrap();
        for table in [
            "accounts",
            "entries",
            "contacts",
            "failed_attempts",
            "security_events",
        ] {
            assert!(table_exists(&db, table), "{} table should exist", table);
        }
    }

    #[test]
    fn migrations_are_idempotent() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.run_migrations().is_ok());
    }

    #[test]
    fn handle_uniqueness_is_enforced() {
        let db = Database::open_in_memory().unwrap();
        let insert = "INSERT INTO accounts (handle, secret_hash, pin_hash, created_at)
                      VALUES ('alice', 'h', 'p', '2024-01-01T00:00:00Z')";
        db.conn().execute(insert, []).unwrap();
        assert!(db.conn().execute(insert, []).is_err());
    }

    #[test]
    fn reopened_file_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.db");

        {
            let db = Database::open(&path).unwrap();
            db.conn()
                .execute(
                    "INSERT INTO accounts (handle, secret_hash, pin_hash, created_at)
                     VALUES ('alice', 'h', 'p', '2024-01-01T00:00:00Z')",
                    [],
                )
                .unwrap();
        }

        let db = Database::open(&path).unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT count(*) FROM accounts", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
