use axum::{
    Json,
    extract::{Query, State},
};
use tracing::instrument;

use lectern_core::AppError;
use lectern_models::{
    HomeContent, SearchParams, SearchResults, SiteStatistics, UpdateSiteStatisticsDto,
};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::site::service::SiteService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/statistics",
    responses(
        (status = 200, description = "Site statistics, zeros when unset", body = SiteStatistics)
    ),
    tag = "Site"
)]
#[instrument(skip(state))]
pub async fn get_statistics(
    State(state): State<AppState>,
) -> Result<Json<SiteStatistics>, AppError> {
    let stats = SiteService::get_statistics(&state.db).await?;
    Ok(Json(stats))
}

#[utoipa::path(
    put,
    path = "/api/statistics",
    request_body = UpdateSiteStatisticsDto,
    responses(
        (status = 200, description = "Site statistics saved", body = SiteStatistics),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Site"
)]
#[instrument(skip(state, dto))]
pub async fn update_statistics(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateSiteStatisticsDto>,
) -> Result<Json<SiteStatistics>, AppError> {
    let stats = SiteService::update_statistics(&state.db, &auth_user.caller()?, dto).await?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/api/home",
    responses(
        (status = 200, description = "Landing page content", body = HomeContent)
    ),
    tag = "Site"
)]
#[instrument(skip(state))]
pub async fn get_home(State(state): State<AppState>) -> Result<Json<HomeContent>, AppError> {
    let home = SiteService::home(&state.db).await?;
    Ok(Json(home))
}

#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching courses, news and events", body = SearchResults),
        (status = 400, description = "Missing query", body = ErrorResponse)
    ),
    tag = "Site"
)]
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>, AppError> {
    let caller = auth_user.map(|u| u.caller()).transpose()?;
    let results = SiteService::search(&state.db, caller.as_ref(), params.q).await?;
    Ok(Json(results))
}
