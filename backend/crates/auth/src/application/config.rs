//! Application Configuration
//!
//! Built once at startup, validated, then shared read-only as
//! `Arc<AuthConfig>`.

use std::time::Duration;

use platform::crypto::random_bytes;
use platform::password::{DEFAULT_MEMORY_KIB, DEFAULT_WORK_FACTOR};
use chrono::TimeDelta;
use thiserror::Error;

use crate::domain::lockout::LockoutPolicy;

/// Minimum token signing key length in bytes
pub const MIN_TOKEN_SECRET_LEN: usize = 32;

/// Lower bound on the Argon2 time cost
pub const MIN_WORK_FACTOR: u32 = 4;

/// Upper bound on the Argon2 time cost so a typo cannot stall every login
pub const MAX_WORK_FACTOR: u32 = 64;

/// Longest accepted lock duration and token lifetime
pub const MAX_DURATION: Duration = Duration::from_secs(365 * 24 * 3600);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "work factor must be between {min} and {max} (got {0})",
        min = MIN_WORK_FACTOR,
        max = MAX_WORK_FACTOR
    )]
    WorkFactor(u32),

    #[error("memory cost must be at least 8 KiB (got {0})")]
    MemoryCost(u32),

    #[error("max login attempts must be at least 1")]
    MaxLoginAttempts,

    #[error("lock duration must be positive")]
    LockDuration,

    #[error("lock duration must be at most 365 days (got {0:?})")]
    LockDurationTooLong(Duration),

    #[error("token lifetime must be positive")]
    TokenTtl,

    #[error("token lifetime must be at most 365 days (got {0:?})")]
    TokenTtlTooLong(Duration),

    #[error("token secret must be at least {min} bytes (got {0})", min = MIN_TOKEN_SECRET_LEN)]
    TokenSecret(usize),
}

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Argon2 time cost
    pub work_factor: u32,
    /// Argon2 memory cost in KiB
    pub memory_kib: u32,
    /// Consecutive failures before the account locks
    pub max_login_attempts: u32,
    /// How long a lock lasts
    pub lock_duration: Duration,
    /// HS256 signing key for identity tokens
    pub token_secret: Vec<u8>,
    /// Identity token lifetime
    pub token_ttl: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            work_factor: DEFAULT_WORK_FACTOR,
            memory_kib: DEFAULT_MEMORY_KIB,
            max_login_attempts: 5,
            lock_duration: Duration::from_secs(2 * 3600), // 2 hours
            token_secret: Vec::new(),
            token_ttl: Duration::from_secs(24 * 3600), // 24 hours
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Create config with a random token secret
    pub fn with_random_secret() -> Self {
        Self {
            token_secret: random_bytes(MIN_TOKEN_SECRET_LEN),
            ..Default::default()
        }
    }

    /// Create config for development (tokens do not survive restarts)
    pub fn development() -> Self {
        Self::with_random_secret()
    }

    /// Check every range. Call once before building services.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_WORK_FACTOR..=MAX_WORK_FACTOR).contains(&self.work_factor) {
            return Err(ConfigError::WorkFactor(self.work_factor));
        }
        if self.memory_kib < 8 {
            return Err(ConfigError::MemoryCost(self.memory_kib));
        }
        if self.max_login_attempts == 0 {
            return Err(ConfigError::MaxLoginAttempts);
        }
        if self.lock_duration.is_zero() {
            return Err(ConfigError::LockDuration);
        }
        if self.lock_duration > MAX_DURATION {
            return Err(ConfigError::LockDurationTooLong(self.lock_duration));
        }
        if self.token_ttl.is_zero() {
            return Err(ConfigError::TokenTtl);
        }
        if self.token_ttl > MAX_DURATION {
            return Err(ConfigError::TokenTtlTooLong(self.token_ttl));
        }
        if self.token_secret.len() < MIN_TOKEN_SECRET_LEN {
            return Err(ConfigError::TokenSecret(self.token_secret.len()));
        }
        Ok(())
    }

    /// Lockout parameters for the domain layer
    pub fn lockout_policy(&self) -> LockoutPolicy {
        LockoutPolicy {
            max_attempts: self.max_login_attempts,
            lock_duration: to_time_delta(self.lock_duration),
        }
    }

    /// Identity token lifetime
    pub fn token_lifetime(&self) -> TimeDelta {
        to_time_delta(self.token_ttl)
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

/// Whole seconds; saturates at `TimeDelta::MAX` so an unvalidated config
/// surfaces as a checked-arithmetic failure downstream instead of a panic.
fn to_time_delta(duration: Duration) -> TimeDelta {
    i64::try_from(duration.as_secs())
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("work_factor", &self.work_factor)
            .field("memory_kib", &self.memory_kib)
            .field("max_login_attempts", &self.max_login_attempts)
            .field("lock_duration", &self.lock_duration)
            .field("token_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
