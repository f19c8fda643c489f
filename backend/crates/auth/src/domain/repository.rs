//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infra layer.

use chrono::{DateTime, Utc};
use kernel::id::AccountId;

use crate::domain::entity::account::Account;
use crate::domain::lockout::LockoutUpdate;
use crate::domain::value_object::{AccountKind, Email};
use crate::error::AuthResult;

/// Account repository trait
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Insert a new account. `EmailTaken` when the email exists for the kind.
    async fn create(&self, account: &Account) -> AuthResult<()>;

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>>;

    /// Lookup by login identifier within one kind
    async fn find_by_email(&self, kind: AccountKind, email: &Email)
    -> AuthResult<Option<Account>>;

    /// Apply a lockout transition as one atomic read-modify-write and return
    /// the account as it is afterwards. `None` if the account is gone.
    ///
    /// Concurrent calls must never lose an increment, and a lock must be set
    /// at most once per crossing of the threshold.
    async fn apply_lockout(
        &self,
        account_id: &AccountId,
        update: LockoutUpdate,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<Account>>;

    /// Persist `password_hash`, `status`, `last_password_updated_at` and the
    /// cleared lockout fields of `account`.
    async fn update_password(&self, account: &Account) -> AuthResult<()>;

    /// Set status `ARCHIVE` and return the account afterwards. `None` if
    /// there is no such account. Never removes the record.
    async fn archive(&self, account_id: &AccountId, now: DateTime<Utc>)
    -> AuthResult<Option<Account>>;

    /// Replace the display name and return the account afterwards.
    async fn update_name(
        &self,
        account_id: &AccountId,
        name: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<Account>>;

    /// Stamp `last_login_at`
    async fn record_login(&self, account_id: &AccountId, now: DateTime<Utc>) -> AuthResult<()>;
}
