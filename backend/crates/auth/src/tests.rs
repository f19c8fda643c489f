//! Cross-layer scenarios: authenticator + lockout tracker + store + tokens,
//! and the HTTP surface on top of them.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Duration;
use kernel::id::AccountId;
use platform::password::{
    Argon2Hasher, ClearTextPassword, CredentialHasher, HashedPassword, PasswordHashError,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::application::{
    AccountTarget, ArchiveAccountUseCase, Authenticator, ChangePasswordInput,
    ChangePasswordUseCase, CreateAccountInput, CreateAccountUseCase, LockoutTracker, SignInInput,
    SignInUseCase, TokenService,
};
use crate::domain::clock::{Clock, ManualClock};
use crate::domain::entity::account::Account;
use crate::domain::lockout::LockoutUpdate;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{AccountKind, AccountStatus};
use crate::error::{AuthError, FailureReason};
use crate::infra::memory::InMemoryAccountRepository;
use crate::presentation::handlers::AuthAppState;
use crate::presentation::router::api_router;
use crate::AuthConfig;

const PASSWORD: &str = "correct-Horse-42";
const WRONG: &str = "wrong-Horse-42";

// ============================================================================
// Harness
// ============================================================================

/// Argon2 with minimal cost, counting every call.
struct CountingHasher {
    inner: Argon2Hasher,
    hashes: AtomicUsize,
    verifies: AtomicUsize,
    dummies: AtomicUsize,
}

impl CountingHasher {
    fn new() -> Self {
        Self {
            // Cheap parameters keep the suite fast; the config under test
            // keeps its validated defaults.
            inner: Argon2Hasher::new(1, 64, None).unwrap(),
            hashes: AtomicUsize::new(0),
            verifies: AtomicUsize::new(0),
            dummies: AtomicUsize::new(0),
        }
    }

    fn verifies(&self) -> usize {
        self.verifies.load(Ordering::SeqCst)
    }

    fn dummies(&self) -> usize {
        self.dummies.load(Ordering::SeqCst)
    }
}

impl CredentialHasher for CountingHasher {
    fn hash(&self, password: &ClearTextPassword) -> Result<HashedPassword, PasswordHashError> {
        self.hashes.fetch_add(1, Ordering::SeqCst);
        self.inner.hash(password)
    }

    fn verify(&self, password: &ClearTextPassword, digest: &HashedPassword) -> bool {
        self.verifies.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(password, digest)
    }

    fn verify_dummy(&self, password: &ClearTextPassword) {
        self.dummies.fetch_add(1, Ordering::SeqCst);
        self.inner.verify_dummy(password)
    }
}

struct Harness {
    repo: Arc<InMemoryAccountRepository>,
    hasher: Arc<CountingHasher>,
    clock: Arc<ManualClock>,
    config: AuthConfig,
}

impl Harness {
    fn new() -> Self {
        Self {
            repo: Arc::new(InMemoryAccountRepository::new()),
            hasher: Arc::new(CountingHasher::new()),
            clock: Arc::new(ManualClock::default()),
            config: AuthConfig::development(),
        }
    }

    fn authenticator(&self) -> Authenticator<InMemoryAccountRepository> {
        Authenticator::new(
            self.repo.clone(),
            self.hasher.clone(),
            self.config.lockout_policy(),
            self.clock.clone(),
        )
    }

    fn tracker(&self) -> LockoutTracker<InMemoryAccountRepository> {
        LockoutTracker::new(
            self.repo.clone(),
            self.config.lockout_policy(),
            self.clock.clone(),
        )
    }

    async fn create(&self, kind: AccountKind, email: &str, password: Option<&str>) -> Account {
        CreateAccountUseCase::new(self.repo.clone(), self.hasher.clone(), self.clock.clone())
            .execute(CreateAccountInput {
                kind,
                email: email.to_string(),
                name: "Test".to_string(),
                password: password.map(str::to_string),
            })
            .await
            .unwrap()
            .account
    }

    async fn developer(&self) -> Account {
        self.create(AccountKind::Developer, "dev@example.com", Some(PASSWORD))
            .await
    }

    async fn attempt(&self, password: &str) -> Result<Account, AuthError> {
        self.authenticator()
            .authenticate(
                AccountKind::Developer,
                "dev@example.com",
                ClearTextPassword::candidate(password.to_string()),
            )
            .await
    }

    async fn stored(&self, account: &Account) -> Account {
        self.repo
            .find_by_id(&account.account_id)
            .await
            .unwrap()
            .unwrap()
    }

    /// Overwrite the lockout fields of a stored account.
    async fn force_lockout_state(
        &self,
        account: &Account,
        attempts: u32,
        lock_until: Option<chrono::DateTime<chrono::Utc>>,
    ) {
        let mut forced = self.stored(account).await;
        forced.login_attempts = attempts;
        forced.lock_until = lock_until;
        self.repo.update_password(&forced).await.unwrap();
    }

    fn app(&self) -> Router {
        let state = AuthAppState::new(
            (*self.repo).clone(),
            self.config.clone(),
            self.hasher.clone(),
            self.clock.clone(),
        );
        api_router(state)
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// ============================================================================
// Lockout scenarios
// ============================================================================

#[tokio::test]
async fn test_five_failures_lock_then_unlock_after_window() {
    let h = Harness::new();
    let account = h.developer().await;

    for _ in 0..5 {
        let err = h.attempt(WRONG).await.unwrap_err();
        assert_eq!(err.failure_reason(), Some(FailureReason::PasswordIncorrect));
    }

    let stored = h.stored(&account).await;
    assert_eq!(stored.login_attempts, 5);
    assert_eq!(stored.lock_until, Some(h.clock.now() + Duration::hours(2)));
    assert!(h.tracker().is_locked(&stored));

    // Even the right password is refused, and the hasher is never asked.
    let verifies_before = h.hasher.verifies();
    let err = h.attempt(PASSWORD).await.unwrap_err();
    assert_eq!(err.failure_reason(), Some(FailureReason::MaxAttempts));
    assert_eq!(h.hasher.verifies(), verifies_before);
    assert_eq!(h.stored(&account).await.login_attempts, 5);

    h.clock.advance(Duration::hours(2) + Duration::seconds(1));

    let signed_in = h.attempt(PASSWORD).await.unwrap();
    assert_eq!(signed_in.login_attempts, 0);
    assert!(signed_in.lock_until.is_none());

    let stored = h.stored(&account).await;
    assert_eq!(stored.login_attempts, 0);
    assert!(stored.lock_until.is_none());
    assert_eq!(stored.last_login_at, Some(h.clock.now()));
}

#[tokio::test]
async fn test_still_locked_one_second_before_expiry() {
    let h = Harness::new();
    h.developer().await;

    for _ in 0..5 {
        h.attempt(WRONG).await.unwrap_err();
    }

    h.clock.advance(Duration::hours(2) - Duration::seconds(1));
    assert!(matches!(
        h.attempt(PASSWORD).await,
        Err(AuthError::AccountLocked)
    ));

    h.clock.advance(Duration::seconds(1));
    assert!(h.attempt(PASSWORD).await.is_ok());
}

#[tokio::test]
async fn test_failure_with_expired_lock_restarts_count() {
    let h = Harness::new();
    let account = h.developer().await;
    h.force_lockout_state(&account, 4, Some(h.clock.now() - Duration::minutes(1)))
        .await;

    let err = h.attempt(WRONG).await.unwrap_err();
    assert!(matches!(err, AuthError::PasswordIncorrect));

    let stored = h.stored(&account).await;
    assert_eq!(stored.login_attempts, 1);
    assert!(stored.lock_until.is_none());
}

#[tokio::test]
async fn test_success_before_max_resets_counter() {
    let h = Harness::new();
    let account = h.developer().await;

    for _ in 0..4 {
        h.attempt(WRONG).await.unwrap_err();
    }
    assert_eq!(h.stored(&account).await.login_attempts, 4);

    h.attempt(PASSWORD).await.unwrap();
    let stored = h.stored(&account).await;
    assert_eq!(stored.login_attempts, 0);
    assert!(stored.lock_until.is_none());

    // The count starts over: four more failures do not lock.
    for _ in 0..4 {
        h.attempt(WRONG).await.unwrap_err();
    }
    assert!(!h.tracker().is_locked(&h.stored(&account).await));
}

#[tokio::test]
async fn test_success_with_expired_lock_clears_it() {
    let h = Harness::new();
    let account = h.developer().await;
    h.force_lockout_state(&account, 5, Some(h.clock.now())).await;

    h.attempt(PASSWORD).await.unwrap();
    let stored = h.stored(&account).await;
    assert_eq!(stored.login_attempts, 0);
    assert!(stored.lock_until.is_none());
}

#[tokio::test]
async fn test_unknown_account_is_not_found_without_side_effects() {
    let h = Harness::new();
    let account = h.developer().await;

    let err = h
        .authenticator()
        .authenticate(
            AccountKind::Developer,
            "nobody@example.com",
            ClearTextPassword::candidate(PASSWORD.to_string()),
        )
        .await
        .unwrap_err();

    assert_eq!(err.failure_reason(), Some(FailureReason::NotFound));
    assert_eq!(h.hasher.dummies(), 1);
    assert_eq!(h.stored(&account).await.login_attempts, 0);
}

#[tokio::test]
async fn test_malformed_email_is_not_found() {
    let h = Harness::new();
    h.developer().await;

    let err = h
        .authenticator()
        .authenticate(
            AccountKind::Developer,
            "not-an-email",
            ClearTextPassword::candidate(PASSWORD.to_string()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AccountNotFound));
}

#[tokio::test]
async fn test_email_lookup_is_case_insensitive() {
    let h = Harness::new();
    h.developer().await;

    let account = h
        .authenticator()
        .authenticate(
            AccountKind::Developer,
            "  DEV@Example.com ",
            ClearTextPassword::candidate(PASSWORD.to_string()),
        )
        .await
        .unwrap();
    assert_eq!(account.email.as_str(), "dev@example.com");
}

#[tokio::test]
async fn test_kinds_do_not_share_credentials() {
    let h = Harness::new();
    h.developer().await;

    let err = h
        .authenticator()
        .authenticate(
            AccountKind::Company,
            "dev@example.com",
            ClearTextPassword::candidate(PASSWORD.to_string()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AccountNotFound));
}

#[tokio::test]
async fn test_account_without_password_never_matches_and_counts() {
    let h = Harness::new();
    let account = h
        .create(AccountKind::Developer, "dev@example.com", None)
        .await;
    assert_eq!(account.status, AccountStatus::Inactive);
    assert!(account.password_hash.is_none());

    let err = h.attempt("").await.unwrap_err();
    assert!(matches!(err, AuthError::PasswordIncorrect));
    assert_eq!(h.stored(&account).await.login_attempts, 1);
}

#[tokio::test]
async fn test_archived_account_cannot_sign_in() {
    let h = Harness::new();
    let account = h.developer().await;
    h.repo
        .archive(&account.account_id, h.clock.now())
        .await
        .unwrap()
        .unwrap();

    assert!(matches!(
        h.attempt(PASSWORD).await,
        Err(AuthError::AccountArchived)
    ));
}

#[tokio::test]
async fn test_archived_account_wrong_password_still_counts() {
    let h = Harness::new();
    let account = h.developer().await;
    h.repo
        .archive(&account.account_id, h.clock.now())
        .await
        .unwrap();

    assert!(matches!(
        h.attempt(WRONG).await,
        Err(AuthError::PasswordIncorrect)
    ));
    assert_eq!(h.stored(&account).await.login_attempts, 1);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_failures_at_threshold_lock_exactly_once() {
    let h = Harness::new();
    let account = h.developer().await;
    h.force_lockout_state(&account, 4, None).await;

    let tracker = Arc::new(h.tracker());
    let a = {
        let tracker = tracker.clone();
        let account = account.clone();
        tokio::spawn(async move { tracker.record_failure(&account).await })
    };
    let b = {
        let tracker = tracker.clone();
        let account = account.clone();
        tokio::spawn(async move { tracker.record_failure(&account).await })
    };
    let (a, b) = (a.await.unwrap().unwrap(), b.await.unwrap().unwrap());

    let mut seen = [a.login_attempts, b.login_attempts];
    seen.sort_unstable();
    assert_eq!(seen, [5, 6]);

    let stored = h.stored(&account).await;
    assert_eq!(stored.login_attempts, 6);
    assert_eq!(stored.lock_until, Some(h.clock.now() + Duration::hours(2)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_parallel_failures_lose_no_increment() {
    let h = Harness::new();
    let account = h.developer().await;
    let base = h.clock.now();

    // Each task proposes a different lock expiry; only the first crossing
    // of the threshold may install one.
    let mut tasks = Vec::new();
    for i in 0..32 {
        let repo = h.repo.clone();
        let id = account.account_id;
        tasks.push(tokio::spawn(async move {
            repo.apply_lockout(
                &id,
                LockoutUpdate::Failure {
                    max_attempts: 5,
                    lock_until: base + Duration::hours(2) + Duration::seconds(i),
                },
                base,
            )
            .await
            .unwrap()
            .unwrap()
        }));
    }

    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await.unwrap());
    }

    let stored = h.stored(&account).await;
    assert_eq!(stored.login_attempts, 32);

    let crossing = results.iter().find(|a| a.login_attempts == 5).unwrap();
    assert!(crossing.lock_until.is_some());
    assert_eq!(stored.lock_until, crossing.lock_until);
    assert!(
        results
            .iter()
            .filter(|a| a.login_attempts < 5)
            .all(|a| a.lock_until.is_none())
    );
}

// ============================================================================
// Password management
// ============================================================================

#[tokio::test]
async fn test_change_password_regenerates_digest() {
    let h = Harness::new();
    let account = h.developer().await;
    let old_digest = h.stored(&account).await.password_hash.unwrap();

    h.clock.advance(Duration::minutes(5));
    ChangePasswordUseCase::new(h.repo.clone(), h.hasher.clone(), &h.config, h.clock.clone())
        .execute(
            &account.account_id,
            ChangePasswordInput {
                current_password: PASSWORD.to_string(),
                new_password: "brand-New-Secret-7".to_string(),
            },
        )
        .await
        .unwrap();

    let stored = h.stored(&account).await;
    assert_ne!(stored.password_hash.unwrap(), old_digest);
    assert_eq!(stored.last_password_updated_at, Some(h.clock.now()));

    assert!(h.attempt(PASSWORD).await.is_err());
    assert!(h.attempt("brand-New-Secret-7").await.is_ok());
}

#[tokio::test]
async fn test_change_password_wrong_current_counts_as_failure() {
    let h = Harness::new();
    let account = h.developer().await;

    let err = ChangePasswordUseCase::new(h.repo.clone(), h.hasher.clone(), &h.config, h.clock.clone())
        .execute(
            &account.account_id,
            ChangePasswordInput {
                current_password: WRONG.to_string(),
                new_password: "brand-New-Secret-7".to_string(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::PasswordIncorrect));
    assert_eq!(h.stored(&account).await.login_attempts, 1);
}

// ============================================================================
// Archive
// ============================================================================

#[tokio::test]
async fn test_archive_keeps_record_and_refuses_owner_access() {
    let h = Harness::new();
    let account = h.developer().await;
    let tokens = TokenService::new(&h.config, h.clock.clone());
    let claims = tokens.verify(&tokens.issue(&account).unwrap().token).unwrap();
    let target = AccountTarget {
        kind: AccountKind::Developer,
        account_id: account.account_id,
    };

    h.clock.advance(Duration::minutes(1));
    let use_case = ArchiveAccountUseCase::new(h.repo.clone(), h.clock.clone());
    let archived = use_case.execute(&claims, target).await.unwrap();
    assert_eq!(archived.status, AccountStatus::Archive);
    assert_eq!(archived.updated_at, h.clock.now());

    // Soft delete: the row and its digest are still there.
    let stored = h.stored(&account).await;
    assert_eq!(stored.status, AccountStatus::Archive);
    assert!(stored.password_hash.is_some());
    assert_eq!(h.repo.len(), 1);

    assert!(matches!(
        use_case.execute(&claims, target).await,
        Err(AuthError::AccountArchived)
    ));
}

#[tokio::test]
async fn test_archive_of_unknown_id_is_none() {
    let h = Harness::new();
    assert!(
        h.repo
            .archive(&AccountId::new(), h.clock.now())
            .await
            .unwrap()
            .is_none()
    );
}

// ============================================================================
// Account creation
// ============================================================================

#[tokio::test]
async fn test_company_without_password_is_provisioned_one() {
    let h = Harness::new();
    let output = CreateAccountUseCase::new(h.repo.clone(), h.hasher.clone(), h.clock.clone())
        .execute(CreateAccountInput {
            kind: AccountKind::Company,
            email: "hr@company.io".to_string(),
            name: "Company".to_string(),
            password: None,
        })
        .await
        .unwrap();

    let provisioned = output.provisioned_password.unwrap();
    assert_eq!(provisioned.len(), 10);
    assert_eq!(output.account.status, AccountStatus::Active);

    let account = h
        .authenticator()
        .authenticate(
            AccountKind::Company,
            "hr@company.io",
            ClearTextPassword::candidate(provisioned),
        )
        .await
        .unwrap();
    assert_eq!(account.kind, AccountKind::Company);
}

#[tokio::test]
async fn test_duplicate_email_per_kind_is_rejected() {
    let h = Harness::new();
    h.developer().await;

    let err = CreateAccountUseCase::new(h.repo.clone(), h.hasher.clone(), h.clock.clone())
        .execute(CreateAccountInput {
            kind: AccountKind::Developer,
            email: "DEV@example.com".to_string(),
            name: "Again".to_string(),
            password: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::EmailTaken));

    // Same address, other kind
    h.create(AccountKind::Company, "dev@example.com", Some(PASSWORD))
        .await;
    assert_eq!(h.repo.len(), 2);
}

#[tokio::test]
async fn test_stored_digest_is_not_plaintext() {
    let h = Harness::new();
    let account = h.developer().await;
    let digest = h.stored(&account).await.password_hash.unwrap();
    assert!(!digest.as_phc_string().contains(PASSWORD));
    assert!(digest.as_phc_string().starts_with("$argon2id$"));
}

// ============================================================================
// Sign in + tokens
// ============================================================================

#[tokio::test]
async fn test_sign_in_token_identifies_account() {
    let h = Harness::new();
    let account = h.developer().await;
    let tokens = TokenService::new(&h.config, h.clock.clone());

    let output = SignInUseCase::new(
        h.repo.clone(),
        h.hasher.clone(),
        &h.config,
        tokens.clone(),
        h.clock.clone(),
    )
    .execute(SignInInput {
        kind: AccountKind::Developer,
        email: "dev@example.com".to_string(),
        password: PASSWORD.to_string(),
    })
    .await
    .unwrap();

    assert_eq!(output.account_id, account.account_id);
    let claims = tokens.verify(&output.token).unwrap();
    assert_eq!(claims.account_id(), account.account_id);
    assert_eq!(claims.knd, AccountKind::Developer);

    h.clock.advance(Duration::hours(24));
    assert!(matches!(
        tokens.verify(&output.token).map_err(AuthError::from),
        Err(AuthError::TokenExpired)
    ));
}

// ============================================================================
// HTTP
// ============================================================================

#[tokio::test]
async fn test_http_company_signup_signin_and_me() {
    let h = Harness::new();
    let app = h.app();

    let (status, created) = send(
        &app,
        "POST",
        "/api/companies",
        None,
        Some(json!({ "email": "HR@Company.io", "name": "Company" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["kind"], "company");
    assert_eq!(created["status"], "ACTIVE");
    assert_eq!(created["email"], "hr@company.io");
    let password = created["provisionedPassword"].as_str().unwrap().to_string();

    let (status, signed_in) = send(
        &app,
        "POST",
        "/api/auth/companies/signin",
        None,
        Some(json!({ "email": "hr@company.io", "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(signed_in["accountId"], created["accountId"]);
    let token = signed_in["token"].as_str().unwrap().to_string();

    let (status, me) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["accountId"], created["accountId"]);
    assert_eq!(me["kind"], "company");
    assert!(me.get("provisionedPassword").is_none());
}

#[tokio::test]
async fn test_http_developer_without_password_is_inactive() {
    let h = Harness::new();
    let app = h.app();

    let (status, created) = send(
        &app,
        "POST",
        "/api/developers",
        None,
        Some(json!({ "email": "dev@example.com", "name": "Dev" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "INACTIVE");
    assert!(created.get("provisionedPassword").is_none());
}

#[tokio::test]
async fn test_http_invalid_input_is_bad_request() {
    let h = Harness::new();
    let app = h.app();

    let (status, _) = send(
        &app,
        "POST",
        "/api/developers",
        None,
        Some(json!({ "email": "nope", "name": "Dev" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/developers",
        None,
        Some(json!({ "email": "dev@example.com", "name": "Dev", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_http_lockout_reports_423_after_max_attempts() {
    let h = Harness::new();
    h.developer().await;
    let app = h.app();
    let wrong = json!({ "email": "dev@example.com", "password": WRONG });

    for _ in 0..5 {
        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/developers/signin",
            None,
            Some(wrong.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Invalid credentials");
    }

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/developers/signin",
        None,
        Some(json!({ "email": "dev@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::LOCKED);
    assert_eq!(body["status"], 423);
}

#[tokio::test]
async fn test_http_unknown_and_wrong_password_look_the_same() {
    let h = Harness::new();
    h.developer().await;
    let app = h.app();

    let unknown = send(
        &app,
        "POST",
        "/api/auth/developers/signin",
        None,
        Some(json!({ "email": "ghost@example.com", "password": PASSWORD })),
    )
    .await;
    let wrong = send(
        &app,
        "POST",
        "/api/auth/developers/signin",
        None,
        Some(json!({ "email": "dev@example.com", "password": WRONG })),
    )
    .await;

    assert_eq!(unknown, wrong);
}

#[tokio::test]
async fn test_http_protected_routes_require_valid_token() {
    let h = Harness::new();
    h.developer().await;
    let app = h.app();

    let (status, _) = send(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/auth/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, signed_in) = send(
        &app,
        "POST",
        "/api/auth/developers/signin",
        None,
        Some(json!({ "email": "dev@example.com", "password": PASSWORD })),
    )
    .await;
    let token = signed_in["token"].as_str().unwrap().to_string();

    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });
    let (status, _) = send(&app, "GET", "/api/auth/me", Some(&tampered), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    h.clock.advance(Duration::hours(24));
    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Token expired");
}

#[tokio::test]
async fn test_http_change_password() {
    let h = Harness::new();
    h.developer().await;
    let app = h.app();

    let (_, signed_in) = send(
        &app,
        "POST",
        "/api/auth/developers/signin",
        None,
        Some(json!({ "email": "dev@example.com", "password": PASSWORD })),
    )
    .await;
    let token = signed_in["token"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/password",
        Some(&token),
        Some(json!({ "currentPassword": PASSWORD, "newPassword": "brand-New-Secret-7" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/developers/signin",
        None,
        Some(json!({ "email": "dev@example.com", "password": "brand-New-Secret-7" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

async fn sign_in_developer(app: &Router) -> (String, String) {
    let (status, signed_in) = send(
        app,
        "POST",
        "/api/auth/developers/signin",
        None,
        Some(json!({ "email": "dev@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (
        signed_in["token"].as_str().unwrap().to_string(),
        signed_in["accountId"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_http_owner_reads_and_renames_own_record() {
    let h = Harness::new();
    h.developer().await;
    let app = h.app();
    let (token, id) = sign_in_developer(&app).await;
    let uri = format!("/api/developers/{}", id);

    let (status, body) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accountId"], id.as_str());
    assert_eq!(body["name"], "Test");

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "name": "  Renamed  " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["email"], "dev@example.com");

    let (status, _) = send(&app, "PUT", &uri, Some(&token), Some(json!({ "name": " " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_http_owner_routes_require_token_and_ownership() {
    let h = Harness::new();
    h.developer().await;
    let other = h
        .create(AccountKind::Developer, "other@example.com", Some(PASSWORD))
        .await;
    let app = h.app();
    let (token, id) = sign_in_developer(&app).await;

    let (status, _) = send(&app, "GET", &format!("/api/developers/{}", id), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "DELETE", &format!("/api/developers/{}", id), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let other_uri = format!("/api/developers/{}", other.account_id.into_uuid());
    for method in ["GET", "DELETE"] {
        let (status, _) = send(&app, method, &other_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{method}");
    }
    assert_eq!(h.stored(&other).await.status, AccountStatus::Active);

    // Same id under the other kind's route
    let (status, _) = send(&app, "GET", &format!("/api/companies/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_http_delete_archives_developer() {
    let h = Harness::new();
    let account = h.developer().await;
    let app = h.app();
    let (token, id) = sign_in_developer(&app).await;
    let uri = format!("/api/developers/{}", id);

    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let stored = h.stored(&account).await;
    assert_eq!(stored.status, AccountStatus::Archive);

    let (status, _) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/developers/signin",
        None,
        Some(json!({ "email": "dev@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The email stays taken.
    let (status, _) = send(
        &app,
        "POST",
        "/api/developers",
        None,
        Some(json!({ "email": "dev@example.com", "name": "Again" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
