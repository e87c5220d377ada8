use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use lectern_core::AppError;
use lectern_models::{
    Attendance, AttendanceFilterParams, AttendanceId, PaginatedAttendanceResponse,
    RecordAttendanceDto, UpdateAttendanceDto,
};

use crate::middleware::auth::AuthUser;
use crate::modules::attendance::service::AttendanceService;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = RecordAttendanceDto,
    responses(
        (status = 201, description = "Attendance recorded", body = Attendance),
        (status = 400, description = "Student not enrolled or tracking disabled", body = ErrorResponse),
        (status = 403, description = "Not the session's tutor", body = ErrorResponse),
        (status = 404, description = "Class schedule not found", body = ErrorResponse),
        (status = 409, description = "Already recorded", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state, dto))]
pub async fn record_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<RecordAttendanceDto>,
) -> Result<(StatusCode, Json<Attendance>), AppError> {
    let attendance =
        AttendanceService::record_attendance(&state.db, &auth_user.caller()?, dto).await?;
    Ok((StatusCode::CREATED, Json(attendance)))
}

#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceFilterParams),
    responses(
        (status = 200, description = "Attendance visible to the caller", body = PaginatedAttendanceResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state))]
pub async fn get_attendance_records(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<AttendanceFilterParams>,
) -> Result<Json<PaginatedAttendanceResponse>, AppError> {
    let records =
        AttendanceService::list_attendance(&state.db, &auth_user.caller()?, filters).await?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/api/attendance/{id}",
    params(("id" = AttendanceId, Path, description = "Attendance ID")),
    responses(
        (status = 200, description = "Attendance record", body = Attendance),
        (status = 404, description = "Attendance record not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state))]
pub async fn get_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<AttendanceId>,
) -> Result<Json<Attendance>, AppError> {
    let attendance = AttendanceService::find_visible(&state.db, &auth_user.caller()?, id).await?;
    Ok(Json(attendance))
}

#[utoipa::path(
    put,
    path = "/api/attendance/{id}",
    params(("id" = AttendanceId, Path, description = "Attendance ID")),
    request_body = UpdateAttendanceDto,
    responses(
        (status = 200, description = "Attendance updated", body = Attendance),
        (status = 403, description = "Not the session's tutor", body = ErrorResponse),
        (status = 404, description = "Attendance record not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state, dto))]
pub async fn update_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<AttendanceId>,
    ValidatedJson(dto): ValidatedJson<UpdateAttendanceDto>,
) -> Result<Json<Attendance>, AppError> {
    let attendance =
        AttendanceService::update_attendance(&state.db, &auth_user.caller()?, id, dto).await?;
    Ok(Json(attendance))
}

#[utoipa::path(
    delete,
    path = "/api/attendance/{id}",
    params(("id" = AttendanceId, Path, description = "Attendance ID")),
    responses(
        (status = 204, description = "Attendance deleted"),
        (status = 403, description = "Not the session's tutor", body = ErrorResponse),
        (status = 404, description = "Attendance record not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state))]
pub async fn delete_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<AttendanceId>,
) -> Result<StatusCode, AppError> {
    AttendanceService::delete_attendance(&state.db, &auth_user.caller()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
