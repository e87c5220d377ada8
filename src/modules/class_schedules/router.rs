use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_schedule, delete_schedule, get_schedule, get_schedules, update_schedule,
};

pub fn init_class_schedules_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_schedule).get(get_schedules))
        .route(
            "/{id}",
            get(get_schedule).put(update_schedule).delete(delete_schedule),
        )
}
