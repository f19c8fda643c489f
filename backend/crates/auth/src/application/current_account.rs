//! Current Account Use Case
//!
//! Resolves verified token claims to the stored account.

use std::sync::Arc;

use crate::application::token::TokenClaims;
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::error::{AuthError, AuthResult};

pub struct CurrentAccountUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
}

impl<R> CurrentAccountUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, claims: &TokenClaims) -> AuthResult<Account> {
        let account = self
            .repo
            .find_by_id(&claims.account_id())
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        // Ids are never shared across kinds.
        if account.kind != claims.knd {
            return Err(AuthError::TokenMalformed);
        }
        if account.is_archived() {
            return Err(AuthError::AccountArchived);
        }

        Ok(account)
    }
}
