// Lifevault — Auth Service
//
// Registration, login, emergency PIN access, and credential changes.
// Ordering contract for login: the supplied password is checked first so a
// wrong password on a known account is recorded, then the lock state is
// consulted — a locked account is refused even with the correct password.
// Emergency access checks the lock before verifying the PIN.

use zeroize::Zeroizing;

use crate::crypto::{hash_secret, verify_secret};
use crate::store::{Account, AttemptKind, VaultStore};

use super::lockout::{AttemptTracker, LockStatus};
use super::AuthError;

const MIN_HANDLE_LEN: usize = 3;
const MIN_SECRET_LEN: usize = 6;
const PIN_LEN: usize = 4;

pub struct AuthService<'a, S: VaultStore> {
    store: &'a S,
}

impl<'a, S: VaultStore> AuthService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn tracker(&self) -> AttemptTracker<'a, S> {
        AttemptTracker::new(self.store)
    }

    /// Create a new account. Does not log the caller in.
    pub fn register(
        &self,
        handle: &str,
        secret: &str,
        email: Option<&str>,
        pin: &str,
    ) -> Result<Account, AuthError> {
        let handle = handle.trim();
        validate_handle(handle)?;
        validate_secret(secret)?;
        validate_pin(pin)?;
        if let Some(email) = email {
            validate_email(email)?;
        }

        let secret_hash = Zeroizing::new(hash_secret(secret));
        let pin_hash = Zeroizing::new(hash_secret(pin));

        let account = self
            .store
            .create_account(handle, &secret_hash, email, &pin_hash)
            .map_err(|e| match e {
                crate::store::StoreError::DuplicateAccount(h) => AuthError::DuplicateAccount(h),
                other => AuthError::Store(other),
            })?;

        self.store.log_event(
            Some(account.id),
            "user_registration",
            Some(&format!("New account: {}", handle)),
        )?;

        Ok(account)
    }

    /// Password login. A digest mismatch on a known account records a
    /// `login` failure; a lock refusal records nothing.
    pub fn authenticate(&self, handle: &str, secret: &str) -> Result<Account, AuthError> {
        let Some(account) = self.store.find_account(handle.trim())? else {
            return Err(AuthError::InvalidCredential);
        };

        if !verify_secret(secret, account.secret_hash()) {
            self.tracker().record_failure(account.id, AttemptKind::Login)?;
            return Err(AuthError::InvalidCredential);
        }

        if self.tracker().is_locked(account.id, AttemptKind::Login)? {
            tracing::warn!(account_id = account.id, "Login refused: account locked");
            return Err(AuthError::Locked(AttemptKind::Login));
        }

        self.store.log_event(Some(account.id), "login_success", None)?;
        tracing::info!(account_id = account.id, "Login succeeded");
        Ok(account)
    }

    /// PIN-gated emergency access. Grants a read-only, category-restricted
    /// view; the lock is consulted before the PIN is even checked.
    pub fn authenticate_emergency(&self, handle: &str, pin: &str) -> Result<Account, AuthError> {
        let Some(account) = self.store.find_account(handle.trim())? else {
            return Err(AuthError::InvalidCredential);
        };

        if self.tracker().is_locked(account.id, AttemptKind::Pin)? {
            tracing::warn!(account_id = account.id, "Emergency access refused: locked");
            return Err(AuthError::Locked(AttemptKind::Pin));
        }

        if !verify_secret(pin, account.pin_hash()) {
            self.tracker().record_failure(account.id, AttemptKind::Pin)?;
            self.store.log_event(
                Some(account.id),
                "emergency_access_failed",
                Some("Invalid PIN"),
            )?;
            return Err(AuthError::InvalidCredential);
        }

        self.store
            .log_event(Some(account.id), "emergency_access_granted", None)?;
        tracing::info!(account_id = account.id, "Emergency access granted");
        Ok(account)
    }

    /// Change the primary password after re-verifying the current one.
    pub fn change_secret(
        &self,
        account_id: i64,
        current_secret: &str,
        new_secret: &str,
    ) -> Result<(), AuthError> {
        let account = self
            .store
            .account_by_id(account_id)?
            .ok_or(AuthError::InvalidCredential)?;

        if !verify_secret(current_secret, account.secret_hash()) {
            return Err(AuthError::InvalidCredential);
        }
        validate_secret(new_secret)?;

        let new_hash = Zeroizing::new(hash_secret(new_secret));
        self.store.update_secret_hash(account_id, &new_hash)?;
        self.store
            .log_event(Some(account_id), "password_changed", None)?;
        Ok(())
    }

    /// Change the emergency PIN after re-verifying the current password.
    pub fn change_pin(
        &self,
        account_id: i64,
        current_secret: &str,
        new_pin: &str,
    ) -> Result<(), AuthError> {
        let account = self
            .store
            .account_by_id(account_id)?
            .ok_or(AuthError::InvalidCredential)?;

        if !verify_secret(current_secret, account.secret_hash()) {
            return Err(AuthError::InvalidCredential);
        }
        validate_pin(new_pin)?;

        let new_hash = Zeroizing::new(hash_secret(new_pin));
        self.store.update_pin_hash(account_id, &new_hash)?;
        self.store.log_event(Some(account_id), "pin_changed", None)?;
        Ok(())
    }

    /// Update the contact email after re-verifying the current password.
    pub fn update_email(
        &self,
        account_id: i64,
        current_secret: &str,
        new_email: &str,
    ) -> Result<(), AuthError> {
        let account = self
            .store
            .account_by_id(account_id)?
            .ok_or(AuthError::InvalidCredential)?;

        if !verify_secret(current_secret, account.secret_hash()) {
            return Err(AuthError::InvalidCredential);
        }
        let new_email = new_email.trim();
        validate_email(new_email)?;

        self.store.update_email(account_id, new_email)?;
        self.store
            .log_event(Some(account_id), "email_updated", None)?;
        Ok(())
    }

    /// Recent-failure counts for both credential kinds, for status display.
    pub fn lock_status(&self, account_id: i64) -> Result<LockStatus, AuthError> {
        Ok(self.tracker().status(account_id)?)
    }
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn validate_handle(handle: &str) -> Result<(), AuthError> {
    if handle.chars().count() < MIN_HANDLE_LEN {
        return Err(AuthError::Validation(format!(
            "handle must be at least {} characters",
            MIN_HANDLE_LEN
        )));
    }
    Ok(())
}

fn validate_secret(secret: &str) -> Result<(), AuthError> {
    if secret.chars().count() < MIN_SECRET_LEN {
        return Err(AuthError::Validation(format!(
            "password must be at least {} characters",
            MIN_SECRET_LEN
        )));
    }
    Ok(())
}

fn validate_pin(pin: &str) -> Result<(), AuthError> {
    if pin.len() != PIN_LEN || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(AuthError::Validation(
            "PIN must be exactly 4 digits".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && domain
                .rsplit_once('.')
                .is_some_and(|(host, tld)| {
                    !host.is_empty()
                        && tld.len() >= 2
                        && tld.chars().all(|c| c.is_ascii_alphabetic())
                })
    });

    if valid {
        Ok(())
    } else {
        Err(AuthError::Validation("invalid email format".to_string()))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
