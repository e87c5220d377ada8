use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{delete_message, get_message, get_messages, mark_message_read, send_message};

pub fn init_messages_router() -> Router<AppState> {
    Router::new()
        .route("/", post(send_message).get(get_messages))
        .route("/{id}", get(get_message).delete(delete_message))
        .route("/{id}/read", post(mark_message_read))
}
