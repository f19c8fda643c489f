//! HTTP Handlers

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::Arc;

use kernel::id::AccountId;
use platform::password::CredentialHasher;
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::application::{
    AccountTarget, ArchiveAccountUseCase, ChangePasswordInput, ChangePasswordUseCase,
    CreateAccountInput, CreateAccountUseCase, CurrentAccountUseCase, GetAccountUseCase,
    SignInInput, SignInUseCase, TokenClaims, TokenService, UpdateAccountInput,
    UpdateAccountUseCase,
};
use crate::domain::clock::Clock;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::AccountKind;
use crate::error::AuthResult;
use crate::presentation::dto::{
    AccountResponse, ChangePasswordRequest, CreateAccountRequest, CreateAccountResponse,
    SignInRequest, SignInResponse, UpdateAccountRequest,
};
use crate::presentation::middleware::Authenticated;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub hasher: Arc<dyn CredentialHasher>,
    pub tokens: TokenService,
    pub clock: Arc<dyn Clock>,
}

impl<R> AuthAppState<R>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    /// The token key is taken from `config` here and never changes after.
    pub fn new(
        repo: R,
        config: AuthConfig,
        hasher: Arc<dyn CredentialHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tokens = TokenService::new(&config, clock.clone());
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
            hasher,
            tokens,
            clock,
        }
    }
}

// ============================================================================
// Sign In
// ============================================================================

/// POST /api/auth/developers/signin
pub async fn sign_in_developer<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<SignInRequest>,
) -> AuthResult<Json<SignInResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    sign_in(state, AccountKind::Developer, req).await
}

/// POST /api/auth/companies/signin
pub async fn sign_in_company<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<SignInRequest>,
) -> AuthResult<Json<SignInResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    sign_in(state, AccountKind::Company, req).await
}

async fn sign_in<R>(
    state: AuthAppState<R>,
    kind: AccountKind,
    req: SignInRequest,
) -> AuthResult<Json<SignInResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.hasher.clone(),
        &state.config,
        state.tokens.clone(),
        state.clock.clone(),
    );

    let output = use_case
        .execute(SignInInput {
            kind,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(SignInResponse {
        token: output.token,
        expires_at: output.expires_at,
        account_id: output.account_id.into_uuid(),
        kind: output.kind,
    }))
}

// ============================================================================
// Current Account (requires authentication)
// ============================================================================

/// GET /api/auth/me
pub async fn current_account<R>(
    State(state): State<AuthAppState<R>>,
    Extension(Authenticated(claims)): Extension<Authenticated>,
) -> AuthResult<Json<AccountResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let use_case = CurrentAccountUseCase::new(state.repo.clone());
    let account = use_case.execute(&claims).await?;

    Ok(Json(AccountResponse::from(&account)))
}

/// POST /api/auth/password
pub async fn change_password<R>(
    State(state): State<AuthAppState<R>>,
    Extension(Authenticated(claims)): Extension<Authenticated>,
    Json(req): Json<ChangePasswordRequest>,
) -> AuthResult<StatusCode>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let use_case = ChangePasswordUseCase::new(
        state.repo.clone(),
        state.hasher.clone(),
        &state.config,
        state.clock.clone(),
    );

    use_case
        .execute(
            &claims.account_id(),
            ChangePasswordInput {
                current_password: req.current_password,
                new_password: req.new_password,
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Accounts
// ============================================================================

/// POST /api/developers
pub async fn create_developer<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<CreateAccountRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    create_account(state, AccountKind::Developer, req).await
}

/// POST /api/companies
pub async fn create_company<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<CreateAccountRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    create_account(state, AccountKind::Company, req).await
}

async fn create_account<R>(
    state: AuthAppState<R>,
    kind: AccountKind,
    req: CreateAccountRequest,
) -> AuthResult<(StatusCode, Json<CreateAccountResponse>)>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let use_case = CreateAccountUseCase::new(
        state.repo.clone(),
        state.hasher.clone(),
        state.clock.clone(),
    );

    let output = use_case
        .execute(CreateAccountInput {
            kind,
            email: req.email,
            name: req.name,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateAccountResponse {
            account: AccountResponse::from(&output.account),
            provisioned_password: output.provisioned_password,
        }),
    ))
}

// ============================================================================
// Own Account (requires authentication)
// ============================================================================

fn target(kind: AccountKind, account_id: Uuid) -> AccountTarget {
    AccountTarget {
        kind,
        account_id: AccountId::from_uuid(account_id),
    }
}

/// GET /api/developers/{account_id}
pub async fn get_developer<R>(
    State(state): State<AuthAppState<R>>,
    Extension(Authenticated(claims)): Extension<Authenticated>,
    Path(account_id): Path<Uuid>,
) -> AuthResult<Json<AccountResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    get_account(state, claims, target(AccountKind::Developer, account_id)).await
}

/// GET /api/companies/{account_id}
pub async fn get_company<R>(
    State(state): State<AuthAppState<R>>,
    Extension(Authenticated(claims)): Extension<Authenticated>,
    Path(account_id): Path<Uuid>,
) -> AuthResult<Json<AccountResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    get_account(state, claims, target(AccountKind::Company, account_id)).await
}

async fn get_account<R>(
    state: AuthAppState<R>,
    claims: TokenClaims,
    target: AccountTarget,
) -> AuthResult<Json<AccountResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let use_case = GetAccountUseCase::new(state.repo.clone());
    let account = use_case.execute(&claims, target).await?;

    Ok(Json(AccountResponse::from(&account)))
}

/// PUT /api/developers/{account_id}
pub async fn update_developer<R>(
    State(state): State<AuthAppState<R>>,
    Extension(Authenticated(claims)): Extension<Authenticated>,
    Path(account_id): Path<Uuid>,
    Json(req): Json<UpdateAccountRequest>,
) -> AuthResult<Json<AccountResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    update_account(state, claims, target(AccountKind::Developer, account_id), req).await
}

/// PUT /api/companies/{account_id}
pub async fn update_company<R>(
    State(state): State<AuthAppState<R>>,
    Extension(Authenticated(claims)): Extension<Authenticated>,
    Path(account_id): Path<Uuid>,
    Json(req): Json<UpdateAccountRequest>,
) -> AuthResult<Json<AccountResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    update_account(state, claims, target(AccountKind::Company, account_id), req).await
}

async fn update_account<R>(
    state: AuthAppState<R>,
    claims: TokenClaims,
    target: AccountTarget,
    req: UpdateAccountRequest,
) -> AuthResult<Json<AccountResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let use_case = UpdateAccountUseCase::new(state.repo.clone(), state.clock.clone());
    let account = use_case
        .execute(&claims, target, UpdateAccountInput { name: req.name })
        .await?;

    Ok(Json(AccountResponse::from(&account)))
}

/// DELETE /api/developers/{account_id}
pub async fn archive_developer<R>(
    State(state): State<AuthAppState<R>>,
    Extension(Authenticated(claims)): Extension<Authenticated>,
    Path(account_id): Path<Uuid>,
) -> AuthResult<StatusCode>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    archive_account(state, claims, target(AccountKind::Developer, account_id)).await
}

/// DELETE /api/companies/{account_id}
pub async fn archive_company<R>(
    State(state): State<AuthAppState<R>>,
    Extension(Authenticated(claims)): Extension<Authenticated>,
    Path(account_id): Path<Uuid>,
) -> AuthResult<StatusCode>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    archive_account(state, claims, target(AccountKind::Company, account_id)).await
}

async fn archive_account<R>(
    state: AuthAppState<R>,
    claims: TokenClaims,
    target: AccountTarget,
) -> AuthResult<StatusCode>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let use_case = ArchiveAccountUseCase::new(state.repo.clone(), state.clock.clone());
    use_case.execute(&claims, target).await?;

    Ok(StatusCode::NO_CONTENT)
}
