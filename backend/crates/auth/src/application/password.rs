//! Change Password Use Case
//!
//! Ends with a fresh digest and salt, status `ACTIVE`,
//! `last_password_updated_at` stamped and lockout state cleared.

use std::sync::Arc;

use kernel::id::AccountId;
use platform::password::{ClearTextPassword, CredentialHasher};

use crate::application::authenticate::Authenticator;
use crate::application::config::AuthConfig;
use crate::application::credentials::hash_password;
use crate::domain::clock::Clock;
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::error::{AuthError, AuthResult};

async fn install_password<R>(
    repo: &R,
    hasher: &Arc<dyn CredentialHasher>,
    clock: &Arc<dyn Clock>,
    mut account: Account,
    password: ClearTextPassword,
) -> AuthResult<Account>
where
    R: AccountRepository,
{
    let hash = hash_password(hasher, password).await?;
    account.set_password(hash, clock.now());
    repo.update_password(&account).await?;

    tracing::info!(
        account_id = %account.account_id,
        kind = %account.kind,
        "Password updated"
    );

    Ok(account)
}

// ============================================================================
// Change Password (owner, proves the current password)
// ============================================================================

pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

pub struct ChangePasswordUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    hasher: Arc<dyn CredentialHasher>,
    authenticator: Authenticator<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ChangePasswordUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(
        repo: Arc<R>,
        hasher: Arc<dyn CredentialHasher>,
        config: &AuthConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            authenticator: Authenticator::new(
                repo.clone(),
                hasher.clone(),
                config.lockout_policy(),
                clock.clone(),
            ),
            repo,
            hasher,
            clock,
        }
    }

    /// The current password goes through the authenticator, so wrong
    /// guesses here count towards the lockout like any sign-in.
    pub async fn execute(
        &self,
        account_id: &AccountId,
        input: ChangePasswordInput,
    ) -> AuthResult<Account> {
        let new_password = ClearTextPassword::new(input.new_password)?;

        let account = self
            .repo
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let account = self
            .authenticator
            .authenticate(
                account.kind,
                account.email.as_str(),
                ClearTextPassword::candidate(input.current_password),
            )
            .await?;

        install_password(&*self.repo, &self.hasher, &self.clock, account, new_password).await
    }
}
