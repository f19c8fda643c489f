//! In-Memory Repository
//!
//! Used when no database is configured and in tests. Every mutation runs
//! under one map lock, which makes `apply_lockout` atomic per account.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use kernel::id::AccountId;

use crate::domain::entity::account::Account;
use crate::domain::lockout::LockoutUpdate;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{AccountKind, Email};
use crate::error::{AuthError, AuthResult};

#[derive(Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<Mutex<HashMap<AccountId, Account>>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AuthResult<MutexGuard<'_, HashMap<AccountId, Account>>> {
        self.accounts
            .lock()
            .map_err(|_| AuthError::Internal("account store lock poisoned".to_string()))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        let mut map = self.lock()?;
        let taken = map
            .values()
            .any(|a| a.kind == account.kind && a.email == account.email);
        if taken {
            return Err(AuthError::EmailTaken);
        }
        map.insert(account.account_id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        Ok(self.lock()?.get(account_id).cloned())
    }

    async fn find_by_email(
        &self,
        kind: AccountKind,
        email: &Email,
    ) -> AuthResult<Option<Account>> {
        Ok(self
            .lock()?
            .values()
            .find(|a| a.kind == kind && &a.email == email)
            .cloned())
    }

    async fn apply_lockout(
        &self,
        account_id: &AccountId,
        update: LockoutUpdate,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<Account>> {
        let mut map = self.lock()?;
        Ok(map.get_mut(account_id).map(|account| {
            update.apply(account, now);
            account.clone()
        }))
    }

    async fn update_password(&self, account: &Account) -> AuthResult<()> {
        let mut map = self.lock()?;
        let stored = map
            .get_mut(&account.account_id)
            .ok_or(AuthError::AccountNotFound)?;
        stored.password_hash = account.password_hash.clone();
        stored.status = account.status;
        stored.last_password_updated_at = account.last_password_updated_at;
        stored.login_attempts = account.login_attempts;
        stored.lock_until = account.lock_until;
        stored.updated_at = account.updated_at;
        Ok(())
    }

    async fn archive(
        &self,
        account_id: &AccountId,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<Account>> {
        let mut map = self.lock()?;
        Ok(map.get_mut(account_id).map(|account| {
            account.archive(now);
            account.clone()
        }))
    }

    async fn update_name(
        &self,
        account_id: &AccountId,
        name: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<Account>> {
        let mut map = self.lock()?;
        Ok(map.get_mut(account_id).map(|account| {
            account.rename(name.to_string(), now);
            account.clone()
        }))
    }

    async fn record_login(&self, account_id: &AccountId, now: DateTime<Utc>) -> AuthResult<()> {
        if let Some(account) = self.lock()?.get_mut(account_id) {
            account.record_login(now);
        }
        Ok(())
    }
}
