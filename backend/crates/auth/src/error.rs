//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::client::BearerError;
use platform::password::{PasswordHashError, PasswordPolicyError};
use thiserror::Error;

use crate::application::token::TokenError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Why a login attempt was refused.
///
/// The numeric codes are stable and part of the external contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FailureReason {
    NotFound = 0,
    PasswordIncorrect = 1,
    MaxAttempts = 2,
}

impl FailureReason {
    #[inline]
    pub const fn code(&self) -> u8 {
        *self as u8
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::PasswordIncorrect => "PASSWORD_INCORRECT",
            Self::MaxAttempts => "MAX_ATTEMPTS",
        }
    }
}

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// No account with this identifier for the requested kind
    #[error("Account not found")]
    AccountNotFound,

    /// Password did not match (or no password is set)
    #[error("Password incorrect")]
    PasswordIncorrect,

    /// Too many failed attempts; refused without checking the password
    #[error("Account is temporarily locked")]
    AccountLocked,

    /// Account is archived
    #[error("Account is archived")]
    AccountArchived,

    /// Token holder is not the owner of the addressed account
    #[error("Access to this account is not allowed")]
    NotOwner,

    /// Email already registered for this kind
    #[error("Email already registered")]
    EmailTaken,

    /// Hashing failed (RNG or CPU); never retried
    #[error("Password hashing failed: {0}")]
    HashingFailure(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Token malformed")]
    TokenMalformed,

    #[error("Token signature invalid")]
    TokenSignatureInvalid,

    /// No bearer token on a protected route
    #[error("Missing bearer token")]
    MissingToken,

    /// Password validation error
    #[error("Password validation failed: {0}")]
    PasswordValidation(String),

    /// Request validation error
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::AccountNotFound | AuthError::PasswordIncorrect => ErrorKind::Unauthorized,
            AuthError::AccountLocked => ErrorKind::Locked,
            AuthError::AccountArchived | AuthError::NotOwner => ErrorKind::Forbidden,
            AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::TokenExpired
            | AuthError::TokenMalformed
            | AuthError::TokenSignatureInvalid
            | AuthError::MissingToken => ErrorKind::Unauthorized,
            AuthError::PasswordValidation(_) | AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::Database(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)) => {
                ErrorKind::ServiceUnavailable
            }
            AuthError::HashingFailure(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Login failure classification, `None` for non-login errors
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            AuthError::AccountNotFound => Some(FailureReason::NotFound),
            AuthError::PasswordIncorrect => Some(FailureReason::PasswordIncorrect),
            AuthError::AccountLocked => Some(FailureReason::MaxAttempts),
            _ => None,
        }
    }

    /// Convert to AppError.
    ///
    /// Not-found and wrong-password collapse into one message so the
    /// response does not reveal which identifiers exist. Server-side
    /// details are never rendered.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::AccountNotFound | AuthError::PasswordIncorrect => {
                AppError::unauthorized("Invalid credentials")
            }
            AuthError::AccountLocked => AppError::locked("Account is temporarily locked")
                .with_action("Try again later"),
            AuthError::TokenExpired => {
                AppError::unauthorized("Token expired").with_action("Sign in again")
            }
            AuthError::TokenMalformed | AuthError::TokenSignatureInvalid => {
                AppError::unauthorized("Invalid token")
            }
            AuthError::HashingFailure(_) | AuthError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            AuthError::Database(_) => AppError::new(self.kind(), "Database error"),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::HashingFailure(msg) => {
                tracing::error!(message = %msg, "Password hashing failed");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::AccountNotFound | AuthError::PasswordIncorrect => {
                tracing::warn!(reason = ?self.failure_reason(), "Invalid login attempt");
            }
            AuthError::AccountLocked => {
                tracing::warn!("Login attempt on locked account");
            }
            AuthError::TokenSignatureInvalid => {
                tracing::warn!("Token with invalid signature presented");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => {
                AuthError::Validation(err.message().to_string())
            }
            _ => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<PasswordPolicyError> for AuthError {
    fn from(err: PasswordPolicyError) -> Self {
        AuthError::PasswordValidation(err.to_string())
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        AuthError::HashingFailure(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Malformed => AuthError::TokenMalformed,
            TokenError::SignatureInvalid => AuthError::TokenSignatureInvalid,
            TokenError::Issue => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<BearerError> for AuthError {
    fn from(err: BearerError) -> Self {
        match err {
            BearerError::Missing => AuthError::MissingToken,
            BearerError::InvalidScheme => AuthError::TokenMalformed,
        }
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::HashingFailure(err.to_string())
    }
}
