//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Account entity, lockout state machine, clock, repository traits
//! - `application/` - Authenticator, lockout tracker, token service, use cases
//! - `infra/` - PostgreSQL and in-memory account stores
//! - `presentation/` - HTTP handlers, DTOs, router, bearer middleware
//!
//! ## Features
//! - Developer and company accounts with email + password sign-in
//! - Brute-force mitigation: per-account failed attempt counter with a
//!   temporary lock after too many consecutive failures
//! - Stateless HS256 JWT identity tokens for protected routes
//! - Password change, company password provisioning
//! - Owner-only read, rename and archive (soft delete) of one's own record
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant policy)
//! - Locked accounts are refused before any password comparison
//! - Unknown accounts cost one dummy verification
//! - Lockout counters are updated atomically in the store

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult, FailureReason};
pub use infra::{InMemoryAccountRepository, PgAccountRepository};
pub use presentation::handlers::AuthAppState;
pub use presentation::router::{accounts_router, api_router, auth_router};
