//! Auth Middleware
//!
//! Bearer token gate for protected routes.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use platform::client::extract_bearer_token;

use crate::application::token::TokenClaims;
use crate::domain::repository::AccountRepository;
use crate::error::AuthError;
use crate::presentation::handlers::AuthAppState;

/// Verified token claims, stored in request extensions
#[derive(Debug, Clone)]
pub struct Authenticated(pub TokenClaims);

/// Middleware that requires a valid identity token.
///
/// On success the claims are available to handlers as
/// `Extension<Authenticated>`.
pub async fn require_token<R>(
    State(state): State<AuthAppState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let token = extract_bearer_token(req.headers())?;
    let claims = state.tokens.verify(&token)?;

    req.extensions_mut().insert(Authenticated(claims));

    Ok(next.run(req).await)
}
