use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use lectern_core::AppError;
use lectern_models::{
    ContentFilterParams, CreateNewsDto, News, NewsId, PaginatedNewsResponse, UpdateNewsDto,
};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::news::service::NewsService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/news",
    params(ContentFilterParams),
    responses(
        (status = 200, description = "Published news; admins see drafts too", body = PaginatedNewsResponse)
    ),
    tag = "News"
)]
#[instrument(skip(state))]
pub async fn get_news_list(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
    Query(filters): Query<ContentFilterParams>,
) -> Result<Json<PaginatedNewsResponse>, AppError> {
    let caller = auth_user.map(|u| u.caller()).transpose()?;
    let news = NewsService::list_news(&state.db, caller.as_ref(), filters).await?;
    Ok(Json(news))
}

#[utoipa::path(
    get,
    path = "/api/news/{id}",
    params(("id" = NewsId, Path, description = "News ID")),
    responses(
        (status = 200, description = "News article", body = News),
        (status = 404, description = "News article not found", body = ErrorResponse)
    ),
    tag = "News"
)]
#[instrument(skip(state))]
pub async fn get_news(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
    Path(id): Path<NewsId>,
) -> Result<Json<News>, AppError> {
    let caller = auth_user.map(|u| u.caller()).transpose()?;
    let news = NewsService::get_news(&state.db, caller.as_ref(), id).await?;
    Ok(Json(news))
}

#[utoipa::path(
    post,
    path = "/api/news",
    request_body = CreateNewsDto,
    responses(
        (status = 201, description = "News article created", body = News),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "News"
)]
#[instrument(skip(state, dto))]
pub async fn create_news(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateNewsDto>,
) -> Result<(StatusCode, Json<News>), AppError> {
    let news = NewsService::create_news(&state.db, &auth_user.caller()?, dto).await?;
    Ok((StatusCode::CREATED, Json(news)))
}

#[utoipa::path(
    put,
    path = "/api/news/{id}",
    params(("id" = NewsId, Path, description = "News ID")),
    request_body = UpdateNewsDto,
    responses(
        (status = 200, description = "News article updated", body = News),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "News article not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "News"
)]
#[instrument(skip(state, dto))]
pub async fn update_news(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<NewsId>,
    ValidatedJson(dto): ValidatedJson<UpdateNewsDto>,
) -> Result<Json<News>, AppError> {
    let news = NewsService::update_news(&state.db, &auth_user.caller()?, id, dto).await?;
    Ok(Json(news))
}

#[utoipa::path(
    delete,
    path = "/api/news/{id}",
    params(("id" = NewsId, Path, description = "News ID")),
    responses(
        (status = 204, description = "News article deleted"),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "News article not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "News"
)]
#[instrument(skip(state))]
pub async fn delete_news(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<NewsId>,
) -> Result<StatusCode, AppError> {
    NewsService::delete_news(&state.db, &auth_user.caller()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
