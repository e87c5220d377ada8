use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    admin_dashboard, student_dashboard, students_overview, tutor_dashboard, tutors_overview,
};

/// Role checks happen in the service so each dashboard reports its own 403.
pub fn init_dashboards_router() -> Router<AppState> {
    Router::new()
        .route("/student", get(student_dashboard))
        .route("/tutor", get(tutor_dashboard))
        .route("/admin", get(admin_dashboard))
        .route("/admin/tutors", get(tutors_overview))
        .route("/admin/students", get(students_overview))
}
