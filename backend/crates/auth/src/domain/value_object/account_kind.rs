//! Account Kind Value Object
//!
//! Developers and companies share one account shape; the kind tag keeps
//! their identifier namespaces apart.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Which population an account belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum AccountKind {
    #[display("developer")]
    Developer = 0,
    #[display("company")]
    Company = 1,
}

impl AccountKind {
    /// Numeric ID for database storage
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    /// String code used in tokens and API payloads
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Developer => "developer",
            Self::Company => "company",
        }
    }

    /// Companies are provisioned a password when created without one.
    #[inline]
    pub const fn provisions_password(&self) -> bool {
        matches!(self, Self::Company)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Developer),
            1 => Some(Self::Company),
            _ => None,
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "developer" => Some(Self::Developer),
            "company" => Some(Self::Company),
            _ => None,
        }
    }
}
