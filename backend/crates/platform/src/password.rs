//! Password Hashing and Verification
//!
//! - Argon2id digests in PHC string format. Algorithm, version, cost
//!   parameters and salt all live inside the digest, so verification needs
//!   nothing but the digest itself.
//! - The time cost ("work factor") and memory cost are configured per
//!   installation through [`Argon2Hasher::new`].
//! - Clear text is zeroized on drop and redacted from `Debug`.
//! - NIST SP 800-63B style policy for newly chosen passwords.
//!
//! Login attempts are never rejected by policy: a candidate password only
//! goes through NFKC normalization ([`ClearTextPassword::candidate`]) so that
//! a password set under an older policy keeps working.

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::{Rng, distributions::Alphanumeric, rngs::OsRng};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

// ============================================================================
// Constants
// ============================================================================

/// Minimum password length in code points (NIST: SHALL be at least 8)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length in code points
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Length of provisioned passwords
pub const GENERATED_PASSWORD_LENGTH: usize = 10;

/// Default Argon2 time cost
pub const DEFAULT_WORK_FACTOR: u32 = 4;

/// Default Argon2 memory cost in KiB (19 MiB)
pub const DEFAULT_MEMORY_KIB: u32 = 19 * 1024;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    #[error("Password is too common or follows a predictable pattern")]
    CommonPattern,
}

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// RNG or Argon2 failure. Environmental, not retried.
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,

    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password, zeroized when dropped.
///
/// Not `Clone` so copies cannot be made by accident.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Validate a newly chosen password against the policy.
    ///
    /// Unicode is NFKC-normalized before any check; lengths count code points.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let candidate = Self::candidate(raw);
        let normalized = candidate.0.as_str();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        let char_count = normalized.chars().count();
        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }
        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if normalized
            .chars()
            .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        if is_common_pattern(normalized) {
            return Err(PasswordPolicyError::CommonPattern);
        }

        Ok(candidate)
    }

    /// Wrap a password presented at login. Normalized, never rejected.
    pub fn candidate(raw: String) -> Self {
        let mut raw = raw;
        let normalized: String = raw.nfkc().collect();
        raw.zeroize();
        Self(normalized)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Expose the clear text once, e.g. to hand a provisioned password back
    /// to the caller that created the account.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Argon2id digest in PHC string format, e.g.
/// `$argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>`.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Parse a stored digest, rejecting anything that is not a PHC string.
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Credential Hasher
// ============================================================================

/// Derives and verifies salted password digests. Stateless across calls.
pub trait CredentialHasher: Send + Sync + 'static {
    /// Hash with a fresh random salt. Two calls never return the same digest.
    fn hash(&self, password: &ClearTextPassword) -> Result<HashedPassword, PasswordHashError>;

    /// Constant-time check. A wrong password or unusable digest is `false`,
    /// never an error.
    fn verify(&self, password: &ClearTextPassword, digest: &HashedPassword) -> bool;

    /// Spend the same work as a real verification without a real digest.
    ///
    /// Used when the account does not exist so the response time does not
    /// reveal it.
    fn verify_dummy(&self, _password: &ClearTextPassword) {}
}

/// Argon2id hasher with installation-wide parameters and optional pepper.
pub struct Argon2Hasher {
    params: Params,
    pepper: Option<Zeroizing<Vec<u8>>>,
    dummy: HashedPassword,
}

impl Argon2Hasher {
    /// Build a hasher.
    ///
    /// * `work_factor` - Argon2 time cost (iterations)
    /// * `memory_kib` - Argon2 memory cost, at least 8 KiB
    /// * `pepper` - application-wide secret appended to every password
    pub fn new(
        work_factor: u32,
        memory_kib: u32,
        pepper: Option<Vec<u8>>,
    ) -> Result<Self, PasswordHashError> {
        let params = Params::new(memory_kib, work_factor, 1, None)
            .map_err(|e| PasswordHashError::InvalidParams(e.to_string()))?;

        let mut hasher = Self {
            params,
            pepper: pepper.map(Zeroizing::new),
            dummy: HashedPassword {
                hash: String::new(),
            },
        };

        let dummy_password = ClearTextPassword::candidate(generate_password(32));
        hasher.dummy = hasher.hash(&dummy_password)?;

        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    fn peppered(&self, password: &ClearTextPassword) -> Zeroizing<Vec<u8>> {
        let mut combined = password.as_bytes().to_vec();
        if let Some(pepper) = &self.pepper {
            combined.extend_from_slice(pepper);
        }
        Zeroizing::new(combined)
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &ClearTextPassword) -> Result<HashedPassword, PasswordHashError> {
        // 128-bit salt from the OS RNG
        let salt = SaltString::generate(OsRng);

        let hash = self
            .argon2()
            .hash_password(&self.peppered(password), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }

    fn verify(&self, password: &ClearTextPassword, digest: &HashedPassword) -> bool {
        let Ok(parsed) = PasswordHash::new(&digest.hash) else {
            return false;
        };

        // Parameters come from the digest, not from `self.params`.
        self.argon2()
            .verify_password(&self.peppered(password), &parsed)
            .is_ok()
    }

    fn verify_dummy(&self, password: &ClearTextPassword) {
        let _ = self.verify(password, &self.dummy);
    }
}

impl fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argon2Hasher")
            .field("t_cost", &self.params.t_cost())
            .field("m_cost", &self.params.m_cost())
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ============================================================================
// Provisioning
// ============================================================================

/// Random alphanumeric password containing at least one digit and one letter
/// that passes [`ClearTextPassword::new`].
pub fn generate_password(len: usize) -> String {
    let len = len.max(MIN_PASSWORD_LENGTH);
    loop {
        let candidate: String = OsRng
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect();

        let has_digit = candidate.chars().any(|c| c.is_ascii_digit());
        let has_letter = candidate.chars().any(|c| c.is_ascii_alphabetic());
        if has_digit && has_letter && !is_common_pattern(&candidate) {
            return candidate;
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn is_common_pattern(password: &str) -> bool {
    let lower = password.to_lowercase();

    let mut chars = lower.chars();
    if let Some(first) = chars.next() {
        if chars.all(|c| c == first) {
            return true;
        }
    }

    if is_sequential_numbers(&lower) {
        return true;
    }

    const KEYBOARD_PATTERNS: &[&str] = &["qwerty", "asdfgh", "zxcvbn", "qazwsx", "1qaz2wsx"];
    if KEYBOARD_PATTERNS.iter().any(|p| lower.contains(p)) {
        return true;
    }

    const COMMON_PASSWORDS: &[&str] = &[
        "password",
        "password1",
        "password123",
        "abcdefgh",
        "letmein1",
        "welcome1",
        "admin123",
        "iloveyou",
        "sunshine",
        "princess",
        "football",
        "baseball",
        "trustno1",
    ];
    COMMON_PASSWORDS.contains(&lower.as_str())
}

/// Digits only, strictly ascending or descending (wrapping 9→0 / 0→9).
fn is_sequential_numbers(s: &str) -> bool {
    if !s.chars().all(|c| c.is_ascii_digit()) || s.len() < 4 {
        return false;
    }
    let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();

    let ascending = digits.windows(2).all(|w| (w[0] + 1) % 10 == w[1]);
    let descending = digits.windows(2).all(|w| (w[1] + 1) % 10 == w[0]);
    ascending || descending
}

// ============================================================================
// Tests
// ============================================================================
