//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod config;
pub mod create_account;
pub(crate) mod credentials;
pub mod current_account;
pub mod lockout;
pub mod manage_account;
pub mod password;
pub mod sign_in;
pub mod token;

// Re-exports
pub use authenticate::Authenticator;
pub use config::{AuthConfig, ConfigError};
pub use create_account::{CreateAccountInput, CreateAccountOutput, CreateAccountUseCase};
pub use current_account::CurrentAccountUseCase;
pub use lockout::LockoutTracker;
pub use manage_account::{
    AccountTarget, ArchiveAccountUseCase, GetAccountUseCase, UpdateAccountInput,
    UpdateAccountUseCase,
};
pub use password::{ChangePasswordInput, ChangePasswordUseCase};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use token::{IssuedToken, TokenClaims, TokenError, TokenService};
