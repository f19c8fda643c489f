//! Account Status Value Object
//!
//! - **Inactive**: created, no password set yet (default)
//! - **Active**: a password has been set; may sign in
//! - **Archive**: retired; never hard-deleted, never signs in again
//!
//! Temporary lockout after failed attempts is NOT a status. It lives in
//! `lock_until` and expires on its own.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum AccountStatus {
    Active = 0,

    #[default]
    Inactive = 1,

    Archive = 2,
}

impl AccountStatus {
    /// Numeric ID for database storage
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Archive => "ARCHIVE",
        }
    }

    /// Archived accounts are closed to every credential operation.
    #[inline]
    pub const fn is_archived(&self) -> bool {
        matches!(self, Self::Archive)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Active),
            1 => Some(Self::Inactive),
            2 => Some(Self::Archive),
            _ => None,
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ACTIVE" => Some(Self::Active),
            "INACTIVE" => Some(Self::Inactive),
            "ARCHIVE" => Some(Self::Archive),
            _ => None,
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_inactive() {
        assert_eq!(AccountStatus::default(), AccountStatus::Inactive);
    }

    #[test]
    fn test_from_id() {
        assert_eq!(AccountStatus::from_id(0), Some(AccountStatus::Active));
        assert_eq!(AccountStatus::from_id(1), Some(AccountStatus::Inactive));
        assert_eq!(AccountStatus::from_id(2), Some(AccountStatus::Archive));
        assert_eq!(AccountStatus::from_id(99), None);
    }

    #[test]
    fn test_from_code() {
        assert_eq!(
            AccountStatus::from_code("ACTIVE"),
            Some(AccountStatus::Active)
        );
        assert_eq!(
            AccountStatus::from_code("ARCHIVE"),
            Some(AccountStatus::Archive)
        );
        assert_eq!(AccountStatus::from_code("active"), None);
    }

    #[test]
    fn test_display_and_serde_agree() {
        for status in [
            AccountStatus::Active,
            AccountStatus::Inactive,
            AccountStatus::Archive,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
        }
    }

    #[test]
    fn test_is_archived() {
        assert!(AccountStatus::Archive.is_archived());
        assert!(!AccountStatus::Inactive.is_archived());
    }
}
