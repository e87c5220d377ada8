use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use lectern_core::AppError;
use lectern_models::{
    Assignment, AssignmentFilterParams, AssignmentId, CreateAssignmentDto,
    PaginatedAssignmentsResponse, UpdateAssignmentDto,
};

use crate::middleware::auth::AuthUser;
use crate::modules::assignments::service::AssignmentService;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/assignments",
    request_body = CreateAssignmentDto,
    responses(
        (status = 201, description = "Assignment created", body = Assignment),
        (status = 403, description = "Not the course tutor", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
#[instrument(skip(state, dto))]
pub async fn create_assignment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateAssignmentDto>,
) -> Result<(StatusCode, Json<Assignment>), AppError> {
    let assignment =
        AssignmentService::create_assignment(&state.db, &auth_user.caller()?, dto).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

#[utoipa::path(
    get,
    path = "/api/assignments",
    params(AssignmentFilterParams),
    responses(
        (status = 200, description = "Assignments visible to the caller", body = PaginatedAssignmentsResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
#[instrument(skip(state))]
pub async fn get_assignments(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<AssignmentFilterParams>,
) -> Result<Json<PaginatedAssignmentsResponse>, AppError> {
    let assignments =
        AssignmentService::list_assignments(&state.db, &auth_user.caller()?, filters).await?;
    Ok(Json(assignments))
}

#[utoipa::path(
    get,
    path = "/api/assignments/{id}",
    params(("id" = AssignmentId, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment", body = Assignment),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
#[instrument(skip(state))]
pub async fn get_assignment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<AssignmentId>,
) -> Result<Json<Assignment>, AppError> {
    let assignment = AssignmentService::find_visible(&state.db, &auth_user.caller()?, id).await?;
    Ok(Json(assignment))
}

#[utoipa::path(
    put,
    path = "/api/assignments/{id}",
    params(("id" = AssignmentId, Path, description = "Assignment ID")),
    request_body = UpdateAssignmentDto,
    responses(
        (status = 200, description = "Assignment updated", body = Assignment),
        (status = 403, description = "Not the assignment's tutor", body = ErrorResponse),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
#[instrument(skip(state, dto))]
pub async fn update_assignment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<AssignmentId>,
    ValidatedJson(dto): ValidatedJson<UpdateAssignmentDto>,
) -> Result<Json<Assignment>, AppError> {
    let assignment =
        AssignmentService::update_assignment(&state.db, &auth_user.caller()?, id, dto).await?;
    Ok(Json(assignment))
}

#[utoipa::path(
    delete,
    path = "/api/assignments/{id}",
    params(("id" = AssignmentId, Path, description = "Assignment ID")),
    responses(
        (status = 204, description = "Assignment deleted"),
        (status = 403, description = "Not the assignment's tutor", body = ErrorResponse),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
#[instrument(skip(state))]
pub async fn delete_assignment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<AssignmentId>,
) -> Result<StatusCode, AppError> {
    AssignmentService::delete_assignment(&state.db, &auth_user.caller()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
