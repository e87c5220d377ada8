use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    create_contact_message, delete_contact_message, get_contact_messages, update_contact_message,
};

pub fn init_contact_router() -> Router<AppState> {
    Router::new().route("/", post(create_contact_message))
}

/// Inbox management; mounted behind the admin route layer.
pub fn init_contact_admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_contact_messages))
        .route(
            "/{id}",
            put(update_contact_message).delete(delete_contact_message),
        )
}
