use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_submission, delete_submission, get_submission, get_submissions, grade_submission,
    update_submission,
};

pub fn init_submissions_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_submission).get(get_submissions))
        .route(
            "/{id}",
            get(get_submission)
                .put(update_submission)
                .delete(delete_submission),
        )
        .route("/{id}/grade", post(grade_submission))
}
