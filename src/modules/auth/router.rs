use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{get_me, login_user, refresh_token, register_user};

/// Credential endpoints. The router applies the per-IP rate limit to these.
pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login_user))
        .route("/refresh", post(refresh_token))
}

/// Token-protected auth endpoints, outside the rate limit.
pub fn init_session_router() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}
