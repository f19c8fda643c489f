//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no knowledge of accounts:
//! - Password hashing and verification (Argon2id) behind [`password::CredentialHasher`]
//! - Password policy and provisioning
//! - Secure random bytes
//! - Bearer token extraction from request headers

pub mod client;
pub mod crypto;
pub mod password;
