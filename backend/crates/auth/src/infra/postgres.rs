//! PostgreSQL Repository Implementation
//!
//! Lockout transitions are single `UPDATE ... RETURNING` statements whose
//! `SET` expressions read the pre-update row. Concurrent attempts on one
//! account serialize on the row lock and each sees the previous result.

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use platform::password::HashedPassword;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::account::Account;
use crate::domain::lockout::LockoutUpdate;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{AccountKind, AccountStatus, Email};
use crate::error::{AuthError, AuthResult};

/// Column list shared by every query that yields an [`AccountRow`]
const ACCOUNT_COLUMNS: &str = r#"
    account_id,
    kind,
    email,
    name,
    password_hash,
    login_attempts,
    lock_until,
    status,
    last_password_updated_at,
    last_login_at,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed account repository
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl AccountRepository for PgAccountRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id,
                kind,
                email,
                name,
                password_hash,
                login_attempts,
                lock_until,
                status,
                last_password_updated_at,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.kind.id())
        .bind(account.email.as_str())
        .bind(&account.name)
        .bind(account.password_hash.as_ref().map(|h| h.as_phc_string()))
        .bind(attempts_to_db(account.login_attempts))
        .bind(account.lock_until)
        .bind(account.status.id())
        .bind(account.last_password_updated_at)
        .bind(account.last_login_at)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AuthError::EmailTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(account_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_by_email(
        &self,
        kind: AccountKind,
        email: &Email,
    ) -> AuthResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE kind = $1 AND email = $2");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(kind.id())
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn apply_lockout(
        &self,
        account_id: &AccountId,
        update: LockoutUpdate,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<Account>> {
        let row = match update {
            LockoutUpdate::Failure {
                max_attempts,
                lock_until,
            } => {
                let sql = format!(
                    r#"
                    UPDATE accounts SET
                        login_attempts = CASE
                            WHEN lock_until IS NOT NULL AND lock_until <= $2 THEN 1
                            ELSE login_attempts + 1
                        END,
                        lock_until = CASE
                            WHEN lock_until IS NOT NULL AND lock_until <= $2 THEN NULL
                            WHEN lock_until IS NULL AND login_attempts + 1 >= $3 THEN $4
                            ELSE lock_until
                        END,
                        updated_at = $2
                    WHERE account_id = $1
                    RETURNING {ACCOUNT_COLUMNS}
                    "#
                );
                sqlx::query_as::<_, AccountRow>(&sql)
                    .bind(account_id.as_uuid())
                    .bind(now)
                    .bind(attempts_to_db(max_attempts))
                    .bind(lock_until)
                    .fetch_optional(&self.pool)
                    .await?
            }
            LockoutUpdate::Reset => {
                let sql = format!(
                    r#"
                    UPDATE accounts SET
                        login_attempts = 0,
                        lock_until = NULL,
                        updated_at = $2
                    WHERE account_id = $1
                    RETURNING {ACCOUNT_COLUMNS}
                    "#
                );
                sqlx::query_as::<_, AccountRow>(&sql)
                    .bind(account_id.as_uuid())
                    .bind(now)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };

        row.map(AccountRow::into_account).transpose()
    }

    async fn update_password(&self, account: &Account) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                password_hash = $2,
                status = $3,
                last_password_updated_at = $4,
                login_attempts = $5,
                lock_until = $6,
                updated_at = $7
            WHERE account_id = $1
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.password_hash.as_ref().map(|h| h.as_phc_string()))
        .bind(account.status.id())
        .bind(account.last_password_updated_at)
        .bind(attempts_to_db(account.login_attempts))
        .bind(account.lock_until)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::AccountNotFound);
        }
        Ok(())
    }

    async fn archive(
        &self,
        account_id: &AccountId,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<Account>> {
        let sql = format!(
            r#"
            UPDATE accounts SET
                status = $2,
                updated_at = $3
            WHERE account_id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(account_id.as_uuid())
            .bind(AccountStatus::Archive.id())
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn update_name(
        &self,
        account_id: &AccountId,
        name: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<Account>> {
        let sql = format!(
            r#"
            UPDATE accounts SET
                name = $2,
                updated_at = $3
            WHERE account_id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(account_id.as_uuid())
            .bind(name)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn record_login(&self, account_id: &AccountId, now: DateTime<Utc>) -> AuthResult<()> {
        sqlx::query("UPDATE accounts SET last_login_at = $2, updated_at = $2 WHERE account_id = $1")
            .bind(account_id.as_uuid())
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Row Types
// ============================================================================

fn attempts_to_db(attempts: u32) -> i32 {
    i32::try_from(attempts).unwrap_or(i32::MAX)
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    kind: i16,
    email: String,
    name: String,
    password_hash: Option<String>,
    login_attempts: i32,
    lock_until: Option<DateTime<Utc>>,
    status: i16,
    last_password_updated_at: Option<DateTime<Utc>>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let kind = AccountKind::from_id(self.kind)
            .ok_or_else(|| AuthError::Internal(format!("Invalid account kind: {}", self.kind)))?;

        let status = AccountStatus::from_id(self.status)
            .ok_or_else(|| AuthError::Internal(format!("Invalid account status: {}", self.status)))?;

        // An unreadable digest behaves like a missing one: it never matches.
        let password_hash = self.password_hash.and_then(|phc| {
            HashedPassword::from_phc_string(phc)
                .inspect_err(|_| {
                    tracing::error!(account_id = %self.account_id, "Stored password digest is unreadable");
                })
                .ok()
        });

        Ok(Account {
            account_id: AccountId::from_uuid(self.account_id),
            kind,
            email: Email::from_db(self.email),
            name: self.name,
            password_hash,
            login_attempts: u32::try_from(self.login_attempts).unwrap_or(0),
            lock_until: self.lock_until,
            status,
            last_password_updated_at: self.last_password_updated_at,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
