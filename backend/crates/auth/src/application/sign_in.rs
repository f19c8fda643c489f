//! Sign In Use Case
//!
//! Authenticates an account and mints an identity token.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use platform::password::{ClearTextPassword, CredentialHasher};

use crate::application::authenticate::Authenticator;
use crate::application::config::AuthConfig;
use crate::application::token::TokenService;
use crate::domain::clock::Clock;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::AccountKind;
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub kind: AccountKind,
    pub email: String,
    pub password: String,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub account_id: AccountId,
    pub kind: AccountKind,
}

/// Sign in use case
pub struct SignInUseCase<R>
where
    R: AccountRepository,
{
    authenticator: Authenticator<R>,
    tokens: TokenService,
}

impl<R> SignInUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(
        repo: Arc<R>,
        hasher: Arc<dyn CredentialHasher>,
        config: &AuthConfig,
        tokens: TokenService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            authenticator: Authenticator::new(repo, hasher, config.lockout_policy(), clock),
            tokens,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let password = ClearTextPassword::candidate(input.password);

        let account = self
            .authenticator
            .authenticate(input.kind, &input.email, password)
            .await?;

        let issued = self
            .tokens
            .issue(&account)
            .map_err(|e| AuthError::Internal(format!("token issue failed: {}", e)))?;

        tracing::info!(
            account_id = %account.account_id,
            kind = %account.kind,
            expires_at = %issued.expires_at,
            "Account signed in"
        );

        Ok(SignInOutput {
            token: issued.token,
            expires_at: issued.expires_at,
            account_id: account.account_id,
            kind: account.kind,
        })
    }
}
