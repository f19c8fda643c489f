//! Lockout Tracker
//!
//! Gatekeeper for login attempts. Decides from the account as loaded and
//! writes through the repository's atomic `apply_lockout`, so the counter
//! stays correct under concurrent attempts on one account.

use std::sync::Arc;

use crate::domain::clock::Clock;
use crate::domain::entity::account::Account;
use crate::domain::lockout::{LockoutPolicy, LockoutUpdate};
use crate::domain::repository::AccountRepository;
use crate::error::{AuthError, AuthResult};

pub struct LockoutTracker<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    policy: LockoutPolicy,
    clock: Arc<dyn Clock>,
}

impl<R> LockoutTracker<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, policy: LockoutPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            policy,
            clock,
        }
    }

    /// Whether the account refuses attempts right now
    pub fn is_locked(&self, account: &Account) -> bool {
        account.is_locked(self.clock.now())
    }

    /// Count a failed attempt and return the account as stored afterwards.
    pub async fn record_failure(&self, account: &Account) -> AuthResult<Account> {
        let now = self.clock.now();
        let update = self
            .policy
            .failure(now)
            .ok_or_else(|| AuthError::Internal("lock expiry out of range".to_string()))?;
        let updated = self
            .repo
            .apply_lockout(&account.account_id, update, now)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if updated.is_locked(now) && account.lock_until != updated.lock_until {
            tracing::warn!(
                account_id = %updated.account_id,
                kind = %updated.kind,
                login_attempts = updated.login_attempts,
                lock_until = ?updated.lock_until,
                "Account locked after too many failed attempts"
            );
        } else {
            tracing::warn!(
                account_id = %updated.account_id,
                kind = %updated.kind,
                login_attempts = updated.login_attempts,
                "Failed login attempt recorded"
            );
        }

        Ok(updated)
    }

    /// Reset after a successful authentication. Skips the write when there
    /// is nothing to reset.
    pub async fn record_success(&self, account: &Account) -> AuthResult<Account> {
        if LockoutUpdate::Reset.is_noop(account) {
            return Ok(account.clone());
        }

        let now = self.clock.now();
        self.repo
            .apply_lockout(&account.account_id, LockoutUpdate::Reset, now)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }
}
