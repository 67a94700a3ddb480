// Lifevault — Attempt Tracker
//
// Lock state is never persisted: it is a pure function over the
// append-only failed-attempt log. An account is locked for a kind while at
// least LOCKOUT_THRESHOLD failures of that kind fall inside the trailing
// window, and unlocks by itself once the oldest qualifying failures age
// out. Checking the lock writes nothing.

use chrono::{Duration, Utc};

use crate::store::{AttemptKind, StoreError, VaultStore};

/// Failures of one kind inside the window before the account locks.
pub const LOCKOUT_THRESHOLD: usize = 3;

/// Trailing window, in hours, over which failures count.
pub const LOCKOUT_WINDOW_HOURS: i64 = 2;

/// Point-in-time failure counts for one account, per kind, within the
/// trailing window. A display snapshot; computing it writes nothing.
#[derive(Debug, Clone, Copy)]
pub struct LockStatus {
    pub login_failures: usize,
    pub pin_failures: usize,
}

impl LockStatus {
    pub fn login_locked(&self) -> bool {
        self.login_failures >= LOCKOUT_THRESHOLD
    }

    pub fn pin_locked(&self) -> bool {
        self.pin_failures >= LOCKOUT_THRESHOLD
    }
}

/// Reads and appends failed-attempt records for lock decisions.
pub struct AttemptTracker<'a, S: VaultStore> {
    store: &'a S,
}

impl<'a, S: VaultStore> AttemptTracker<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Append a failure record at the current time. Locked accounts keep
    /// accumulating failures if attempts continue.
    pub fn record_failure(&self, account_id: i64, kind: AttemptKind) -> Result<(), StoreError> {
        self.store.record_attempt(account_id, kind)
    }

    /// Count failures of `kind` within the trailing window.
    pub fn count_recent(&self, account_id: i64, kind: AttemptKind) -> Result<usize, StoreError> {
        let cutoff = Utc::now() - Duration::hours(LOCKOUT_WINDOW_HOURS);
        let count = self
            .store
            .attempt_times(account_id, kind)?
            .into_iter()
            .filter(|t| *t > cutoff)
            .count();
        Ok(count)
    }

    /// Soft read-time lock check: true while the recent-failure count has
    /// reached the threshold.
    pub fn is_locked(&self, account_id: i64, kind: AttemptKind) -> Result<bool, StoreError> {
        Ok(self.count_recent(account_id, kind)? >= LOCKOUT_THRESHOLD)
    }

    /// Recent-failure counts for both kinds at once, for status display.
    pub fn status(&self, account_id: i64) -> Result<LockStatus, StoreError> {
        Ok(LockStatus {
            login_failures: self.count_recent(account_id, AttemptKind::Login)?,
            pin_failures: self.count_recent(account_id, AttemptKind::Pin)?,
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Database, SqliteVaultStore};

    fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let id = SqliteVaultStore::new(&db)
            .create_account("alice", "h", None, "p")
            .unwrap()
            .id;
        (db, id)
    }

    fn backdate_all_attempts(db: &Database, hours: i64) {
        let then = Utc::now() - Duration::hours(hours);
        db.conn()
            .execute(
                "UPDATE failed_attempts SET created_at = ?1",
                [then.to_rfc3339()],
            )
            .unwrap();
    }

    #[test]
    fn two_failures_do_not_lock() {
        let (db, id) = setup();
        let store = SqliteVaultStore::new(&db);
        let tracker = AttemptTracker::new(&store);

        tracker.record_failure(id, AttemptKind::Pin).unwrap();
        tracker.record_failure(id, AttemptKind::Pin).unwrap();

        assert_eq!(tracker.count_recent(id, AttemptKind::Pin).unwrap(), 2);
        assert!(!tracker.is_locked(id, AttemptKind::Pin).unwrap());
    }

    #[test]
    fn exactly_three_failures_lock() {
        let (db, id) = setup();
        let store = SqliteVaultStore::new(&db);
        let tracker = AttemptTracker::new(&store);

        for _ in 0..3 {
            tracker.record_failure(id, AttemptKind::Pin).unwrap();
        }

        assert!(tracker.is_locked(id, AttemptKind::Pin).unwrap());
    }

    #[test]
    fn kinds_are_tracked_independently() {
        let (db, id) = setup();
        let store = SqliteVaultStore::new(&db);
        let tracker = AttemptTracker::new(&store);

        for _ in 0..3 {
            tracker.record_failure(id, AttemptKind::Login).unwrap();
        }

        assert!(tracker.is_locked(id, AttemptKind::Login).unwrap());
        assert!(!tracker.is_locked(id, AttemptKind::Pin).unwrap());
    }

    #[test]
    fn failures_outside_window_do_not_count() {
        let (db, id) = setup();
        let store = SqliteVaultStore::new(&db);
        let tracker = AttemptTracker::new(&store);

        for _ in 0..3 {
            tracker.record_failure(id, AttemptKind::Pin).unwrap();
        }
        backdate_all_attempts(&db, 3);

        assert_eq!(tracker.count_recent(id, AttemptKind::Pin).unwrap(), 0);
        assert!(!tracker.is_locked(id, AttemptKind::Pin).unwrap());
    }

    #[test]
    fn lock_expires_as_oldest_failures_age_out() {
        let (db, id) = setup();
        let store = SqliteVaultStore::new(&db);
        let tracker = AttemptTracker::new(&store);

        // Two stale failures plus one fresh one: below threshold again.
        tracker.record_failure(id, AttemptKind::Login).unwrap();
        tracker.record_failure(id, AttemptKind::Login).unwrap();
        backdate_all_attempts(&db, 3);
        tracker.record_failure(id, AttemptKind::Login).unwrap();

        assert_eq!(tracker.count_recent(id, AttemptKind::Login).unwrap(), 1);
        assert!(!tracker.is_locked(id, AttemptKind::Login).unwrap());
    }

    #[test]
    fn status_reports_counts_per_kind() {
        let (db, id) = setup();
        let store = SqliteVaultStore::new(&db);
        let tracker = AttemptTracker::new(&store);

        let fresh = tracker.status(id).unwrap();
        assert_eq!(fresh.login_failures, 0);
        assert_eq!(fresh.pin_failures, 0);
        assert!(!fresh.login_locked() && !fresh.pin_locked());

        tracker.record_failure(id, AttemptKind::Login).unwrap();
        for _ in 0..3 {
            tracker.record_failure(id, AttemptKind::Pin).unwrap();
        }

        let status = tracker.status(id).unwrap();
        assert_eq!(status.login_failures, 1);
        assert_eq!(status.pin_failures, 3);
        assert!(!status.login_locked());
        assert!(status.pin_locked());
    }

    #[test]
    fn checking_lock_state_writes_nothing() {
        let (db, id) = setup();
        let store = SqliteVaultStore::new(&db);
        let tracker = AttemptTracker::new(&store);

        tracker.record_failure(id, AttemptKind::Pin).unwrap();
        tracker.is_locked(id, AttemptKind::Pin).unwrap();
        tracker.is_locked(id, AttemptKind::Pin).unwrap();

        assert_eq!(store.attempt_times(id, AttemptKind::Pin).unwrap().len(), 1);
    }
}
