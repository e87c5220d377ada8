//! Role gates applied as route layers.
//!
//! Finer rules (ownership, scoping) live in the services; these layers only
//! reject callers whose role can never reach the routes behind them.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};

use lectern_core::AppError;
use lectern_models::UserRole;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Runs the request only when the bearer token belongs to one of `allowed_roles`.
pub async fn require_roles(
    state: AppState,
    req: Request,
    next: Next,
    allowed_roles: &[UserRole],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user =
        <AuthUser as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state).await?;
    auth_user.caller()?.require_any_role(allowed_roles)?;

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// Usage:
///
/// ```rust,ignore
/// init_users_router()
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
/// ```
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_roles(state, req, next, &[UserRole::Admin]).await
}
