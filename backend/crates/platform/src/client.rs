//! Client identification utilities
//!
//! Pull caller-supplied credentials out of HTTP headers.

use axum::http::{HeaderMap, header};

const BEARER_PREFIX: &str = "Bearer ";

/// Error when reading the `Authorization` header
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    #[error("Missing Authorization header")]
    Missing,

    #[error("Authorization scheme must be Bearer")]
    InvalidScheme,
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme name is matched case-insensitively (RFC 7235). The token
/// itself is returned untouched and is not validated here.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, BearerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(BearerError::Missing)?
        .to_str()
        .map_err(|_| BearerError::InvalidScheme)?;

    if value.len() < BEARER_PREFIX.len()
        || !value[..BEARER_PREFIX.len()].eq_ignore_ascii_case(BEARER_PREFIX)
    {
        return Err(BearerError::InvalidScheme);
    }

    let token = value[BEARER_PREFIX.len()..].trim();
    if token.is_empty() {
        return Err(BearerError::Missing);
    }

    Ok(token.to_string())
}
