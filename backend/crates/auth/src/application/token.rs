//! Identity Token Service
//!
//! Stateless HS256 JWTs carrying the account id and kind. Expiry is checked
//! against the injected [`Clock`] rather than the library's wall clock, so
//! token lifetime follows the same time source as lockout.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use kernel::id::AccountId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::clock::Clock;
use crate::domain::entity::account::Account;
use crate::domain::value_object::AccountKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("token malformed")]
    Malformed,

    #[error("token signature invalid")]
    SignatureInvalid,

    #[error("token could not be issued")]
    Issue,
}

/// Signed claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Account id
    pub sub: Uuid,
    /// Account kind
    pub knd: AccountKind,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

impl TokenClaims {
    pub fn account_id(&self) -> AccountId {
        AccountId::from_uuid(self.sub)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

/// A freshly minted token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints and checks identity tokens. The key is fixed at construction.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(&config.token_secret),
            decoding: DecodingKey::from_secret(&config.token_secret),
            validation,
            ttl: config.token_lifetime(),
            clock,
        }
    }

    pub fn issue(&self, account: &Account) -> Result<IssuedToken, TokenError> {
        let now = self.clock.now();
        let expires_at = now.checked_add_signed(self.ttl).ok_or(TokenError::Issue)?;
        let claims = TokenClaims {
            sub: account.account_id.into_uuid(),
            knd: account.kind,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Issue)?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Signature first, then claims, then expiry against the clock.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let data = decode::<TokenClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                JwtErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                _ => TokenError::Malformed,
            }
        })?;

        if data.claims.exp <= self.clock.now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}
