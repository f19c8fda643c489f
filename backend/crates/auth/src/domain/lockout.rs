//! Lockout State Machine
//!
//! ```text
//!   OPEN --(attempts reach max)--> LOCKED --(now >= lock_until)--> OPEN
//! ```
//!
//! LOCKED -> OPEN is lazy: nothing sweeps expired locks. The next failure
//! on an account with an expired lock starts a fresh count at 1, the next
//! success resets everything.
//!
//! [`LockoutUpdate::apply`] is the single definition of the transition. The
//! in-memory store calls it under its lock; the Postgres store expresses the
//! same rules as one conditional `UPDATE`.

use chrono::{DateTime, Duration, Utc};

use crate::domain::entity::account::Account;

/// Installation-wide lockout parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Failures that trigger a lock, at least 1
    pub max_attempts: u32,
    pub lock_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lock_duration: Duration::hours(2),
        }
    }
}

impl LockoutPolicy {
    /// `None` when `now + lock_duration` is past the representable range.
    pub fn failure(&self, now: DateTime<Utc>) -> Option<LockoutUpdate> {
        let lock_until = now.checked_add_signed(self.lock_duration)?;
        Some(LockoutUpdate::Failure {
            max_attempts: self.max_attempts,
            lock_until,
        })
    }
}

/// Atomic mutation of an account's lockout fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutUpdate {
    /// Count one failed attempt, locking until `lock_until` on reaching
    /// `max_attempts`.
    Failure {
        max_attempts: u32,
        lock_until: DateTime<Utc>,
    },
    /// Successful authentication
    Reset,
}

impl LockoutUpdate {
    /// Whether applying this update would leave the account unchanged.
    pub fn is_noop(&self, account: &Account) -> bool {
        matches!(self, Self::Reset) && account.login_attempts == 0 && account.lock_until.is_none()
    }

    /// Apply to `account` as observed at `now`. Returns true when a new lock
    /// was set by this update.
    pub fn apply(&self, account: &mut Account, now: DateTime<Utc>) -> bool {
        if self.is_noop(account) {
            return false;
        }

        let mut locked = false;
        match *self {
            Self::Failure {
                max_attempts,
                lock_until,
            } => {
                if account.has_expired_lock(now) {
                    account.login_attempts = 1;
                    account.lock_until = None;
                } else {
                    account.login_attempts = account.login_attempts.saturating_add(1);
                    if account.login_attempts >= max_attempts && account.lock_until.is_none() {
                        account.lock_until = Some(lock_until);
                        locked = true;
                    }
                }
            }
            Self::Reset => {
                account.login_attempts = 0;
                account.lock_until = None;
            }
        }
        account.updated_at = now;
        locked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{AccountKind, Email};

    fn account(now: DateTime<Utc>) -> Account {
        Account::new(
            AccountKind::Company,
            Email::new("hr@company.io").unwrap(),
            "Company".to_string(),
            now,
        )
    }

    #[test]
    fn test_failures_lock_at_max() {
        let now = Utc::now();
        let policy = LockoutPolicy::default();
        let mut acc = account(now);

        for expected in 1..policy.max_attempts {
            assert!(!policy.failure(now).unwrap().apply(&mut acc, now));
            assert_eq!(acc.login_attempts, expected);
            assert!(!acc.is_locked(now));
        }

        assert!(policy.failure(now).unwrap().apply(&mut acc, now));
        assert_eq!(acc.login_attempts, policy.max_attempts);
        assert_eq!(acc.lock_until, Some(now + Duration::hours(2)));
        assert!(acc.is_locked(now));
    }

    #[test]
    fn test_failure_while_locked_keeps_original_lock() {
        let now = Utc::now();
        let policy = LockoutPolicy::default();
        let mut acc = account(now);
        let original = now + Duration::minutes(30);
        acc.login_attempts = 5;
        acc.lock_until = Some(original);

        let later = now + Duration::minutes(1);
        assert!(!policy.failure(later).unwrap().apply(&mut acc, later));
        assert_eq!(acc.login_attempts, 6);
        assert_eq!(acc.lock_until, Some(original));
    }

    #[test]
    fn test_failure_after_expired_lock_restarts_at_one() {
        let now = Utc::now();
        let policy = LockoutPolicy::default();
        let mut acc = account(now);
        acc.login_attempts = 4;
        acc.lock_until = Some(now - Duration::seconds(1));

        assert!(!policy.failure(now).unwrap().apply(&mut acc, now));
        assert_eq!(acc.login_attempts, 1);
        assert!(acc.lock_until.is_none());
    }

    #[test]
    fn test_lock_expiring_exactly_now_counts_as_expired() {
        let now = Utc::now();
        let policy = LockoutPolicy::default();
        let mut acc = account(now);
        acc.login_attempts = 5;
        acc.lock_until = Some(now);

        policy.failure(now).unwrap().apply(&mut acc, now);
        assert_eq!(acc.login_attempts, 1);
        assert!(acc.lock_until.is_none());
    }

    #[test]
    fn test_max_attempts_one_locks_immediately() {
        let now = Utc::now();
        let policy = LockoutPolicy {
            max_attempts: 1,
            lock_duration: Duration::minutes(5),
        };
        let mut acc = account(now);

        assert!(policy.failure(now).unwrap().apply(&mut acc, now));
        assert!(acc.is_locked(now));
        assert!(!acc.is_locked(now + Duration::minutes(5)));
    }

    #[test]
    fn test_unrepresentable_lock_until_is_refused() {
        let now = Utc::now();
        let policy = LockoutPolicy {
            max_attempts: 5,
            lock_duration: Duration::MAX,
        };
        assert!(policy.failure(now).is_none());
    }

    #[test]
    fn test_reset_clears_counter_and_lock() {
        let now = Utc::now();
        let mut acc = account(now);
        acc.login_attempts = 3;
        acc.lock_until = Some(now - Duration::minutes(1));

        LockoutUpdate::Reset.apply(&mut acc, now);
        assert_eq!(acc.login_attempts, 0);
        assert!(acc.lock_until.is_none());
    }

    #[test]
    fn test_reset_on_clean_account_is_noop() {
        let created = Utc::now();
        let mut acc = account(created);
        let later = created + Duration::minutes(10);

        assert!(LockoutUpdate::Reset.is_noop(&acc));
        LockoutUpdate::Reset.apply(&mut acc, later);
        assert_eq!(acc.updated_at, created);
    }
}
