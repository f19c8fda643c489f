//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::domain::repository::AccountRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_token;

/// Sign-in and token-protected routes, to be nested under `/api/auth`
pub fn auth_router<R>(state: AuthAppState<R>) -> Router
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let protected = Router::new()
        .route("/me", get(handlers::current_account::<R>))
        .route("/password", post(handlers::change_password::<R>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_token::<R>,
        ));

    Router::new()
        .route("/developers/signin", post(handlers::sign_in_developer::<R>))
        .route("/companies/signin", post(handlers::sign_in_company::<R>))
        .merge(protected)
        .with_state(state)
}

/// Account registration and own-record routes, to be nested under `/api`
pub fn accounts_router<R>(state: AuthAppState<R>) -> Router
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let owned = Router::new()
        .route(
            "/developers/{account_id}",
            get(handlers::get_developer::<R>)
                .put(handlers::update_developer::<R>)
                .delete(handlers::archive_developer::<R>),
        )
        .route(
            "/companies/{account_id}",
            get(handlers::get_company::<R>)
                .put(handlers::update_company::<R>)
                .delete(handlers::archive_company::<R>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_token::<R>,
        ));

    Router::new()
        .route("/developers", post(handlers::create_developer::<R>))
        .route("/companies", post(handlers::create_company::<R>))
        .merge(owned)
        .with_state(state)
}

/// Every route of this crate at its full path
pub fn api_router<R>(state: AuthAppState<R>) -> Router
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .nest("/api/auth", auth_router(state.clone()))
        .nest("/api", accounts_router(state))
}
