use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use lectern_core::AppError;
use lectern_models::{
    ClassSchedule, ClassScheduleFilterParams, ClassScheduleId, CreateClassScheduleDto,
    PaginatedClassSchedulesResponse, UpdateClassScheduleDto,
};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::class_schedules::service::ClassScheduleService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/class-schedules",
    request_body = CreateClassScheduleDto,
    responses(
        (status = 201, description = "Class scheduled", body = ClassSchedule),
        (status = 403, description = "Not the course tutor", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Class Schedules"
)]
#[instrument(skip(state, dto))]
pub async fn create_schedule(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateClassScheduleDto>,
) -> Result<(StatusCode, Json<ClassSchedule>), AppError> {
    let schedule =
        ClassScheduleService::create_schedule(&state.db, &auth_user.caller()?, dto).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

#[utoipa::path(
    get,
    path = "/api/class-schedules",
    params(ClassScheduleFilterParams),
    responses(
        (status = 200, description = "Sessions visible to the caller", body = PaginatedClassSchedulesResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Class Schedules"
)]
#[instrument(skip(state))]
pub async fn get_schedules(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<ClassScheduleFilterParams>,
) -> Result<Json<PaginatedClassSchedulesResponse>, AppError> {
    let schedules =
        ClassScheduleService::list_schedules(&state.db, &auth_user.caller()?, filters).await?;
    Ok(Json(schedules))
}

#[utoipa::path(
    get,
    path = "/api/class-schedules/{id}",
    params(("id" = ClassScheduleId, Path, description = "Class schedule ID")),
    responses(
        (status = 200, description = "Class session", body = ClassSchedule),
        (status = 404, description = "Class schedule not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Class Schedules"
)]
#[instrument(skip(state))]
pub async fn get_schedule(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<ClassScheduleId>,
) -> Result<Json<ClassSchedule>, AppError> {
    let schedule = ClassScheduleService::find_visible(&state.db, &auth_user.caller()?, id).await?;
    Ok(Json(schedule))
}

#[utoipa::path(
    put,
    path = "/api/class-schedules/{id}",
    params(("id" = ClassScheduleId, Path, description = "Class schedule ID")),
    request_body = UpdateClassScheduleDto,
    responses(
        (status = 200, description = "Class session updated", body = ClassSchedule),
        (status = 403, description = "Not the session's tutor", body = ErrorResponse),
        (status = 404, description = "Class schedule not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Class Schedules"
)]
#[instrument(skip(state, dto))]
pub async fn update_schedule(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<ClassScheduleId>,
    ValidatedJson(dto): ValidatedJson<UpdateClassScheduleDto>,
) -> Result<Json<ClassSchedule>, AppError> {
    let schedule =
        ClassScheduleService::update_schedule(&state.db, &auth_user.caller()?, id, dto).await?;
    Ok(Json(schedule))
}

#[utoipa::path(
    delete,
    path = "/api/class-schedules/{id}",
    params(("id" = ClassScheduleId, Path, description = "Class schedule ID")),
    responses(
        (status = 204, description = "Class session deleted"),
        (status = 403, description = "Not the session's tutor", body = ErrorResponse),
        (status = 404, description = "Class schedule not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Class Schedules"
)]
#[instrument(skip(state))]
pub async fn delete_schedule(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<ClassScheduleId>,
) -> Result<StatusCode, AppError> {
    ClassScheduleService::delete_schedule(&state.db, &auth_user.caller()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
