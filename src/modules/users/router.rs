use axum::{
    Router,
    routing::{get, put},
};

use crate::modules::users::controller::{
    delete_user, get_user, get_users, update_me, update_my_profile,
};
use crate::state::AppState;

/// Routes any authenticated user may call; per-record checks happen in the handlers.
pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/me", put(update_me))
        .route("/me/profile", put(update_my_profile))
        .route("/{id}", get(get_user).delete(delete_user))
}

/// Listing is admin-only and gated by a route layer.
pub fn init_users_admin_router() -> Router<AppState> {
    Router::new().route("/", get(get_users))
}
