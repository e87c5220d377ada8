use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

use super::controller::{
    delete_testimonial, get_testimonials, submit_testimonial, update_testimonial,
};

pub fn init_testimonials_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_testimonials).post(submit_testimonial))
        .route("/{id}", put(update_testimonial).delete(delete_testimonial))
}
