//! Own Account Use Cases
//!
//! Read, rename and archive the account addressed by id. Only the token
//! holder may touch their own record, and an archived record refuses all
//! three.

use std::sync::Arc;

use kernel::id::AccountId;

use crate::application::create_account::validate_name;
use crate::application::current_account::CurrentAccountUseCase;
use crate::application::token::TokenClaims;
use crate::domain::clock::Clock;
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::AccountKind;
use crate::error::{AuthError, AuthResult};

/// Which record a request addresses
#[derive(Debug, Clone, Copy)]
pub struct AccountTarget {
    pub kind: AccountKind,
    pub account_id: AccountId,
}

fn ensure_owner(claims: &TokenClaims, target: AccountTarget) -> AuthResult<()> {
    if claims.knd != target.kind || claims.account_id() != target.account_id {
        return Err(AuthError::NotOwner);
    }
    Ok(())
}

pub struct GetAccountUseCase<R>
where
    R: AccountRepository,
{
    current: CurrentAccountUseCase<R>,
}

impl<R> GetAccountUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            current: CurrentAccountUseCase::new(repo),
        }
    }

    pub async fn execute(&self, claims: &TokenClaims, target: AccountTarget) -> AuthResult<Account> {
        ensure_owner(claims, target)?;
        self.current.execute(claims).await
    }
}

pub struct UpdateAccountInput {
    pub name: String,
}

pub struct UpdateAccountUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    current: CurrentAccountUseCase<R>,
    clock: Arc<dyn Clock>,
}

impl<R> UpdateAccountUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            current: CurrentAccountUseCase::new(repo.clone()),
            repo,
            clock,
        }
    }

    /// Email, kind and credentials are not editable here.
    pub async fn execute(
        &self,
        claims: &TokenClaims,
        target: AccountTarget,
        input: UpdateAccountInput,
    ) -> AuthResult<Account> {
        ensure_owner(claims, target)?;
        let name = validate_name(&input.name)?;
        let account = self.current.execute(claims).await?;

        let updated = self
            .repo
            .update_name(&account.account_id, &name, self.clock.now())
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        tracing::info!(
            account_id = %updated.account_id,
            kind = %updated.kind,
            "Account updated"
        );

        Ok(updated)
    }
}

pub struct ArchiveAccountUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    current: CurrentAccountUseCase<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ArchiveAccountUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            current: CurrentAccountUseCase::new(repo.clone()),
            repo,
            clock,
        }
    }

    pub async fn execute(&self, claims: &TokenClaims, target: AccountTarget) -> AuthResult<Account> {
        ensure_owner(claims, target)?;
        let account = self.current.execute(claims).await?;

        let archived = self
            .repo
            .archive(&account.account_id, self.clock.now())
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        tracing::info!(
            account_id = %archived.account_id,
            kind = %archived.kind,
            "Account archived"
        );

        Ok(archived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn claims(kind: AccountKind, id: Uuid) -> TokenClaims {
        TokenClaims {
            sub: id,
            knd: kind,
            iat: 0,
            exp: 60,
        }
    }

    #[test]
    fn test_ensure_owner() {
        let id = Uuid::new_v4();
        let own = AccountTarget {
            kind: AccountKind::Developer,
            account_id: AccountId::from_uuid(id),
        };

        assert!(ensure_owner(&claims(AccountKind::Developer, id), own).is_ok());
        assert!(matches!(
            ensure_owner(&claims(AccountKind::Company, id), own),
            Err(AuthError::NotOwner)
        ));
        assert!(matches!(
            ensure_owner(&claims(AccountKind::Developer, Uuid::new_v4()), own),
            Err(AuthError::NotOwner)
        ));
    }
}
