use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use lectern_core::AppError;
use lectern_models::{
    CreateEnrollmentDto, Enrollment, EnrollmentDetail, EnrollmentFilterParams, EnrollmentId,
    PaginatedEnrollmentsResponse, UpdateEnrollmentDto,
};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::enrollments::service::EnrollmentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/enrollments",
    request_body = CreateEnrollmentDto,
    responses(
        (status = 201, description = "Enrolled", body = Enrollment),
        (status = 400, description = "Course inactive or full", body = ErrorResponse),
        (status = 403, description = "Cannot enroll another user", body = ErrorResponse),
        (status = 404, description = "Course or student not found", body = ErrorResponse),
        (status = 409, description = "Already enrolled", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state, dto))]
pub async fn create_enrollment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateEnrollmentDto>,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    let enrollment =
        EnrollmentService::create_enrollment(&state.db, &auth_user.caller()?, dto).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

#[utoipa::path(
    get,
    path = "/api/enrollments",
    params(EnrollmentFilterParams),
    responses(
        (status = 200, description = "Enrollments visible to the caller", body = PaginatedEnrollmentsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state))]
pub async fn get_enrollments(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<EnrollmentFilterParams>,
) -> Result<Json<PaginatedEnrollmentsResponse>, AppError> {
    let enrollments =
        EnrollmentService::list_enrollments(&state.db, &auth_user.caller()?, filters).await?;
    Ok(Json(enrollments))
}

#[utoipa::path(
    get,
    path = "/api/enrollments/{id}",
    params(("id" = EnrollmentId, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Enrollment with course and student", body = EnrollmentDetail),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state))]
pub async fn get_enrollment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<EnrollmentId>,
) -> Result<Json<EnrollmentDetail>, AppError> {
    let enrollment = EnrollmentService::get_enrollment(&state.db, &auth_user.caller()?, id).await?;
    Ok(Json(enrollment))
}

#[utoipa::path(
    put,
    path = "/api/enrollments/{id}",
    params(("id" = EnrollmentId, Path, description = "Enrollment ID")),
    request_body = UpdateEnrollmentDto,
    responses(
        (status = 200, description = "Enrollment updated", body = Enrollment),
        (status = 400, description = "Invalid status transition", body = ErrorResponse),
        (status = 403, description = "Not permitted", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state, dto))]
pub async fn update_enrollment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<EnrollmentId>,
    ValidatedJson(dto): ValidatedJson<UpdateEnrollmentDto>,
) -> Result<Json<Enrollment>, AppError> {
    let enrollment =
        EnrollmentService::update_enrollment(&state.db, &auth_user.caller()?, id, dto).await?;
    Ok(Json(enrollment))
}

#[utoipa::path(
    delete,
    path = "/api/enrollments/{id}",
    params(("id" = EnrollmentId, Path, description = "Enrollment ID")),
    responses(
        (status = 204, description = "Enrollment removed"),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state))]
pub async fn delete_enrollment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<EnrollmentId>,
) -> Result<StatusCode, AppError> {
    EnrollmentService::delete_enrollment(&state.db, &auth_user.caller()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
