//! Create Account Use Case
//!
//! Registers a developer or company. Without a password the account stays
//! `INACTIVE`, except for companies, which are provisioned a random one that
//! is handed back exactly once.

use std::sync::Arc;

use platform::password::{
    ClearTextPassword, CredentialHasher, GENERATED_PASSWORD_LENGTH, generate_password,
};

use crate::application::credentials::hash_password;
use crate::domain::clock::Clock;
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{AccountKind, Email};
use crate::error::{AuthError, AuthResult};

/// Maximum display name length in characters
const NAME_MAX_LENGTH: usize = 100;

pub struct CreateAccountInput {
    pub kind: AccountKind,
    pub email: String,
    pub name: String,
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct CreateAccountOutput {
    pub account: Account,
    /// Only set when the password was generated here
    pub provisioned_password: Option<String>,
}

pub struct CreateAccountUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    hasher: Arc<dyn CredentialHasher>,
    clock: Arc<dyn Clock>,
}

impl<R> CreateAccountUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, hasher: Arc<dyn CredentialHasher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            hasher,
            clock,
        }
    }

    pub async fn execute(&self, input: CreateAccountInput) -> AuthResult<CreateAccountOutput> {
        let email = Email::new(&input.email)?;
        let name = validate_name(&input.name)?;

        let (password, provisioned_password) = match input.password {
            Some(raw) => (Some(ClearTextPassword::new(raw)?), None),
            None if input.kind.provisions_password() => {
                let generated = generate_password(GENERATED_PASSWORD_LENGTH);
                (
                    Some(ClearTextPassword::candidate(generated.clone())),
                    Some(generated),
                )
            }
            None => (None, None),
        };

        if self.repo.find_by_email(input.kind, &email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let now = self.clock.now();
        let mut account = Account::new(input.kind, email, name, now);

        if let Some(password) = password {
            let hash = hash_password(&self.hasher, password).await?;
            account.set_password(hash, now);
        }

        self.repo.create(&account).await?;

        tracing::info!(
            account_id = %account.account_id,
            kind = %account.kind,
            status = %account.status,
            provisioned = provisioned_password.is_some(),
            "Account created"
        );

        Ok(CreateAccountOutput {
            account,
            provisioned_password,
        })
    }
}

pub(crate) fn validate_name(raw: &str) -> AuthResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AuthError::Validation("Name cannot be empty".to_string()));
    }
    if name.chars().count() > NAME_MAX_LENGTH {
        return Err(AuthError::Validation(format!(
            "Name must be at most {} characters",
            NAME_MAX_LENGTH
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(AuthError::Validation(
            "Name contains invalid characters".to_string(),
        ));
    }
    Ok(name.to_string())
}
