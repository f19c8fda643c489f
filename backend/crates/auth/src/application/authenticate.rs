//! Authenticator
//!
//! Answers "is this credential valid right now" for one account kind.
//!
//! Order of operations:
//! 1. Look up by email. Unknown: spend one dummy verification, `AccountNotFound`.
//! 2. Locked: `AccountLocked`, without touching the hasher or the counter.
//! 3. Verify the password off the async runtime.
//! 4. Mismatch: count the failure, `PasswordIncorrect`.
//! 5. Match: stamp the login, reset the counter, return the account.
//!
//! The lockout write is always the last step of an attempt.

use std::sync::Arc;

use platform::password::{ClearTextPassword, CredentialHasher};

use crate::application::credentials::verify_password;
use crate::application::lockout::LockoutTracker;
use crate::domain::clock::Clock;
use crate::domain::entity::account::Account;
use crate::domain::lockout::LockoutPolicy;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{AccountKind, Email};
use crate::error::{AuthError, AuthResult};

pub struct Authenticator<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    hasher: Arc<dyn CredentialHasher>,
    tracker: LockoutTracker<R>,
    clock: Arc<dyn Clock>,
}

impl<R> Authenticator<R>
where
    R: AccountRepository,
{
    pub fn new(
        repo: Arc<R>,
        hasher: Arc<dyn CredentialHasher>,
        policy: LockoutPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tracker: LockoutTracker::new(repo.clone(), policy, clock.clone()),
            repo,
            hasher,
            clock,
        }
    }

    pub async fn authenticate(
        &self,
        kind: AccountKind,
        email: &str,
        password: ClearTextPassword,
    ) -> AuthResult<Account> {
        // A malformed identifier cannot match any stored account.
        let account = match Email::new(email) {
            Ok(email) => self.repo.find_by_email(kind, &email).await?,
            Err(_) => None,
        };

        let Some(account) = account else {
            verify_password(&self.hasher, password, None).await?;
            return Err(AuthError::AccountNotFound);
        };

        if self.tracker.is_locked(&account) {
            tracing::warn!(
                account_id = %account.account_id,
                kind = %kind,
                lock_until = ?account.lock_until,
                "Attempt on locked account refused"
            );
            return Err(AuthError::AccountLocked);
        }

        let matched = verify_password(&self.hasher, password, account.password_hash.clone()).await?;

        if !matched {
            self.tracker.record_failure(&account).await?;
            return Err(AuthError::PasswordIncorrect);
        }

        if account.is_archived() {
            return Err(AuthError::AccountArchived);
        }

        let mut account = account;
        let now = self.clock.now();
        self.repo.record_login(&account.account_id, now).await?;
        account.record_login(now);

        self.tracker.record_success(&account).await
    }
}
