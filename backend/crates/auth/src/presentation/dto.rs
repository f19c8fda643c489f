//! API DTOs (Data Transfer Objects)
//!
//! Request types carrying passwords deliberately do not implement `Debug`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entity::account::Account;
use crate::domain::value_object::{AccountKind, AccountStatus};

// ============================================================================
// Sign In
// ============================================================================

/// Sign in request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Sign in response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub account_id: Uuid,
    pub kind: AccountKind,
}

// ============================================================================
// Password
// ============================================================================

/// Change own password request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ============================================================================
// Accounts
// ============================================================================

/// Create developer / company request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub password: Option<String>,
}

/// Update own account request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub name: String,
}

/// Public account summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub account_id: Uuid,
    pub kind: AccountKind,
    pub email: String,
    pub name: String,
    pub status: AccountStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_password_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.account_id.into_uuid(),
            kind: account.kind,
            email: account.email.as_str().to_string(),
            name: account.name.clone(),
            status: account.status,
            last_login_at: account.last_login_at,
            last_password_updated_at: account.last_password_updated_at,
            created_at: account.created_at,
        }
    }
}

/// Create account response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountResponse {
    #[serde(flatten)]
    pub account: AccountResponse,
    /// Generated password, returned once
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub provisioned_password: Option<String>,
}
