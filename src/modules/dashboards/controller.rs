use axum::{Json, extract::State};
use tracing::instrument;

use lectern_core::AppError;
use lectern_models::{
    AdminDashboard, PublicStats, StudentDashboard, StudentOverview, TutorDashboard, TutorOverview,
};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::dashboards::service::DashboardService;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/dashboard/student",
    responses(
        (status = 200, description = "Student dashboard", body = StudentDashboard),
        (status = 403, description = "Students only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboards"
)]
#[instrument(skip(state))]
pub async fn student_dashboard(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<StudentDashboard>, AppError> {
    let dashboard = DashboardService::student_dashboard(&state.db, &auth_user.caller()?).await?;
    Ok(Json(dashboard))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/tutor",
    responses(
        (status = 200, description = "Tutor dashboard", body = TutorDashboard),
        (status = 403, description = "Tutors only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboards"
)]
#[instrument(skip(state))]
pub async fn tutor_dashboard(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<TutorDashboard>, AppError> {
    let dashboard = DashboardService::tutor_dashboard(&state.db, &auth_user.caller()?).await?;
    Ok(Json(dashboard))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/admin",
    responses(
        (status = 200, description = "Admin dashboard", body = AdminDashboard),
        (status = 403, description = "Admins only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboards"
)]
#[instrument(skip(state))]
pub async fn admin_dashboard(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<AdminDashboard>, AppError> {
    let dashboard = DashboardService::admin_dashboard(&state.db, &auth_user.caller()?).await?;
    Ok(Json(dashboard))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/admin/tutors",
    responses(
        (status = 200, description = "Per-tutor workload", body = Vec<TutorOverview>),
        (status = 403, description = "Admins only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboards"
)]
#[instrument(skip(state))]
pub async fn tutors_overview(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<TutorOverview>>, AppError> {
    let tutors = DashboardService::tutors_overview(&state.db, &auth_user.caller()?).await?;
    Ok(Json(tutors))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/admin/students",
    responses(
        (status = 200, description = "Per-student progress", body = Vec<StudentOverview>),
        (status = 403, description = "Admins only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboards"
)]
#[instrument(skip(state))]
pub async fn students_overview(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<StudentOverview>>, AppError> {
    let students = DashboardService::students_overview(&state.db, &auth_user.caller()?).await?;
    Ok(Json(students))
}

#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Public headline numbers", body = PublicStats)
    ),
    tag = "Dashboards"
)]
#[instrument(skip(state))]
pub async fn public_stats(State(state): State<AppState>) -> Result<Json<PublicStats>, AppError> {
    let stats = DashboardService::public_stats(&state.db).await?;
    Ok(Json(stats))
}
