use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{create_event, delete_event, get_event, get_events, update_event};

pub fn init_events_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_events).post(create_event))
        .route("/{id}", get(get_event).put(update_event).delete(delete_event))
}
