use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    delete_attendance, get_attendance, get_attendance_records, record_attendance,
    update_attendance,
};

pub fn init_attendance_router() -> Router<AppState> {
    Router::new()
        .route("/", post(record_attendance).get(get_attendance_records))
        .route(
            "/{id}",
            get(get_attendance)
                .put(update_attendance)
                .delete(delete_attendance),
        )
}
