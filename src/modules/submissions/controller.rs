use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use lectern_core::AppError;
use lectern_models::{
    CreateSubmissionDto, GradeSubmissionDto, PaginatedSubmissionsResponse, Submission,
    SubmissionFilterParams, SubmissionId, UpdateSubmissionDto,
};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::submissions::service::SubmissionService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/submissions",
    request_body = CreateSubmissionDto,
    responses(
        (status = 201, description = "Submission received", body = Submission),
        (status = 403, description = "Students only", body = ErrorResponse),
        (status = 404, description = "Assignment not found", body = ErrorResponse),
        (status = 409, description = "Already submitted", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Submissions"
)]
#[instrument(skip(state, dto))]
pub async fn create_submission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateSubmissionDto>,
) -> Result<(StatusCode, Json<Submission>), AppError> {
    let submission =
        SubmissionService::create_submission(&state.db, &auth_user.caller()?, dto).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

#[utoipa::path(
    get,
    path = "/api/submissions",
    params(SubmissionFilterParams),
    responses(
        (status = 200, description = "Submissions visible to the caller", body = PaginatedSubmissionsResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Submissions"
)]
#[instrument(skip(state))]
pub async fn get_submissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<SubmissionFilterParams>,
) -> Result<Json<PaginatedSubmissionsResponse>, AppError> {
    let submissions =
        SubmissionService::list_submissions(&state.db, &auth_user.caller()?, filters).await?;
    Ok(Json(submissions))
}

#[utoipa::path(
    get,
    path = "/api/submissions/{id}",
    params(("id" = SubmissionId, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission", body = Submission),
        (status = 404, description = "Submission not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Submissions"
)]
#[instrument(skip(state))]
pub async fn get_submission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<SubmissionId>,
) -> Result<Json<Submission>, AppError> {
    let submission = SubmissionService::find_visible(&state.db, &auth_user.caller()?, id).await?;
    Ok(Json(submission))
}

#[utoipa::path(
    put,
    path = "/api/submissions/{id}",
    params(("id" = SubmissionId, Path, description = "Submission ID")),
    request_body = UpdateSubmissionDto,
    responses(
        (status = 200, description = "Submission updated", body = Submission),
        (status = 400, description = "Already graded", body = ErrorResponse),
        (status = 403, description = "Not the submitting student", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Submissions"
)]
#[instrument(skip(state, dto))]
pub async fn update_submission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<SubmissionId>,
    ValidatedJson(dto): ValidatedJson<UpdateSubmissionDto>,
) -> Result<Json<Submission>, AppError> {
    let submission =
        SubmissionService::update_submission(&state.db, &auth_user.caller()?, id, dto).await?;
    Ok(Json(submission))
}

#[utoipa::path(
    post,
    path = "/api/submissions/{id}/grade",
    params(("id" = SubmissionId, Path, description = "Submission ID")),
    request_body = GradeSubmissionDto,
    responses(
        (status = 200, description = "Submission graded", body = Submission),
        (status = 400, description = "Grade missing or out of range", body = ErrorResponse),
        (status = 403, description = "Only the assignment's tutor can grade", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Submissions"
)]
#[instrument(skip(state, dto))]
pub async fn grade_submission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<SubmissionId>,
    ValidatedJson(dto): ValidatedJson<GradeSubmissionDto>,
) -> Result<Json<Submission>, AppError> {
    let submission =
        SubmissionService::grade_submission(&state.db, &auth_user.caller()?, id, dto).await?;
    Ok(Json(submission))
}

#[utoipa::path(
    delete,
    path = "/api/submissions/{id}",
    params(("id" = SubmissionId, Path, description = "Submission ID")),
    responses(
        (status = 204, description = "Submission deleted"),
        (status = 403, description = "Not permitted", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Submissions"
)]
#[instrument(skip(state))]
pub async fn delete_submission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<SubmissionId>,
) -> Result<StatusCode, AppError> {
    SubmissionService::delete_submission(&state.db, &auth_user.caller()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
