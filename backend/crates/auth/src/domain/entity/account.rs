//! Account Entity
//!
//! One credential-bearing record per developer or company. The lockout
//! bookkeeping (`login_attempts`, `lock_until`) lives on the record itself
//! and is only ever changed through [`crate::domain::lockout::LockoutUpdate`].

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use platform::password::HashedPassword;

use crate::domain::value_object::{AccountKind, AccountStatus, Email};

#[derive(Debug, Clone)]
pub struct Account {
    /// Immutable, assigned at creation
    pub account_id: AccountId,
    pub kind: AccountKind,
    /// Unique per kind
    pub email: Email,
    /// Display name
    pub name: String,
    /// `None` until a password is set
    pub password_hash: Option<HashedPassword>,
    /// Consecutive failed attempts since the last success or lock expiry
    pub login_attempts: u32,
    /// Absent means not locked. Once in the past the account is unlocked
    /// even if the field is still set.
    pub lock_until: Option<DateTime<Utc>>,
    pub status: AccountStatus,
    pub last_password_updated_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// New account without a password, status `INACTIVE`
    pub fn new(kind: AccountKind, email: Email, name: String, now: DateTime<Utc>) -> Self {
        Self {
            account_id: AccountId::new(),
            kind,
            email,
            name,
            password_hash: None,
            login_attempts: 0,
            lock_until: None,
            status: AccountStatus::default(),
            last_password_updated_at: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether attempts are currently refused.
    ///
    /// Strictly greater: at the exact expiry instant the account is open.
    #[inline]
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.lock_until.is_some_and(|until| until > now)
    }

    /// A lock that is still recorded but no longer in force
    #[inline]
    pub fn has_expired_lock(&self, now: DateTime<Utc>) -> bool {
        self.lock_until.is_some_and(|until| until <= now)
    }

    /// Install a freshly hashed password.
    ///
    /// Activates the account and clears any lockout state.
    pub fn set_password(&mut self, hash: HashedPassword, now: DateTime<Utc>) {
        self.password_hash = Some(hash);
        self.status = AccountStatus::Active;
        self.last_password_updated_at = Some(now);
        self.login_attempts = 0;
        self.lock_until = None;
        self.updated_at = now;
    }

    /// Soft delete. The record and its credentials stay; only sign-in and
    /// owner access are refused from now on.
    pub fn archive(&mut self, now: DateTime<Utc>) {
        self.status = AccountStatus::Archive;
        self.updated_at = now;
    }

    pub fn rename(&mut self, name: String, now: DateTime<Utc>) {
        self.name = name;
        self.updated_at = now;
    }

    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    #[inline]
    pub fn is_archived(&self) -> bool {
        self.status.is_archived()
    }
}
