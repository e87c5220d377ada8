use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use lectern_core::AppError;
use lectern_models::{
    ContentFilterParams, CreateEventDto, Event, EventId, PaginatedEventsResponse, UpdateEventDto,
};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::events::service::EventService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/events",
    params(ContentFilterParams),
    responses(
        (status = 200, description = "Published events; admins see drafts too", body = PaginatedEventsResponse)
    ),
    tag = "Events"
)]
#[instrument(skip(state))]
pub async fn get_events(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
    Query(filters): Query<ContentFilterParams>,
) -> Result<Json<PaginatedEventsResponse>, AppError> {
    let caller = auth_user.map(|u| u.caller()).transpose()?;
    let events = EventService::list_events(&state.db, caller.as_ref(), filters).await?;
    Ok(Json(events))
}

#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(("id" = EventId, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event", body = Event),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "Events"
)]
#[instrument(skip(state))]
pub async fn get_event(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
    Path(id): Path<EventId>,
) -> Result<Json<Event>, AppError> {
    let caller = auth_user.map(|u| u.caller()).transpose()?;
    let event = EventService::get_event(&state.db, caller.as_ref(), id).await?;
    Ok(Json(event))
}

#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventDto,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
#[instrument(skip(state, dto))]
pub async fn create_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateEventDto>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = EventService::create_event(&state.db, &auth_user.caller()?, dto).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

#[utoipa::path(
    put,
    path = "/api/events/{id}",
    params(("id" = EventId, Path, description = "Event ID")),
    request_body = UpdateEventDto,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
#[instrument(skip(state, dto))]
pub async fn update_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<EventId>,
    ValidatedJson(dto): ValidatedJson<UpdateEventDto>,
) -> Result<Json<Event>, AppError> {
    let event = EventService::update_event(&state.db, &auth_user.caller()?, id, dto).await?;
    Ok(Json(event))
}

#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    params(("id" = EventId, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
#[instrument(skip(state))]
pub async fn delete_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<EventId>,
) -> Result<StatusCode, AppError> {
    EventService::delete_event(&state.db, &auth_user.caller()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
