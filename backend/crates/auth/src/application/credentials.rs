//! Blocking-pool wrappers around the credential hasher.
//!
//! Argon2 is CPU-bound for tens of milliseconds per call; running it on a
//! runtime worker would stall every other request on that thread.

use std::sync::Arc;

use platform::password::{ClearTextPassword, CredentialHasher, HashedPassword};

use crate::error::AuthResult;

pub(crate) async fn hash_password(
    hasher: &Arc<dyn CredentialHasher>,
    password: ClearTextPassword,
) -> AuthResult<HashedPassword> {
    let hasher = Arc::clone(hasher);
    let hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;
    Ok(hash)
}

/// `None` digest is a guaranteed mismatch that still costs one verification.
pub(crate) async fn verify_password(
    hasher: &Arc<dyn CredentialHasher>,
    password: ClearTextPassword,
    digest: Option<HashedPassword>,
) -> AuthResult<bool> {
    let hasher = Arc::clone(hasher);
    let matched = tokio::task::spawn_blocking(move || match digest {
        Some(digest) => hasher.verify(&password, &digest),
        None => {
            hasher.verify_dummy(&password);
            false
        }
    })
    .await?;
    Ok(matched)
}
