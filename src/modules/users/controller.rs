use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use lectern_core::AppError;
use lectern_models::{
    PaginatedUsersResponse, Profile, UpdateMeDto, UpdateProfileDto, User, UserFilterParams,
    UserId, UserRole, UserWithProfile,
};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/users",
    params(UserFilterParams),
    responses(
        (status = 200, description = "Paginated users", body = PaginatedUsersResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
    Query(filters): Query<UserFilterParams>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let users = UserService::list_users(&state.db, filters).await?;
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = UserId, Path, description = "User ID")),
    responses(
        (status = 200, description = "User with profile", body = UserWithProfile),
        (status = 403, description = "Only admins may read other accounts", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<UserId>,
) -> Result<Json<UserWithProfile>, AppError> {
    let caller = auth_user.caller()?;
    if caller.id != id {
        caller.require_role(UserRole::Admin)?;
    }

    let user = UserService::get_user_with_profile(&state.db, id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = UserId, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Admins cannot delete themselves", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<UserId>,
) -> Result<StatusCode, AppError> {
    let caller = auth_user.caller()?;
    caller.require_role(UserRole::Admin)?;

    if caller.id == id {
        return Err(AppError::validation("You cannot delete your own account"));
    }

    UserService::delete_user(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UpdateMeDto,
    responses(
        (status = 200, description = "Account updated", body = User),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn update_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateMeDto>,
) -> Result<Json<User>, AppError> {
    let user = UserService::update_me(&state.db, auth_user.user_id()?, dto).await?;
    Ok(Json(user))
}

#[utoipa::path(
    put,
    path = "/api/users/me/profile",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Role profile updated", body = Profile),
        (status = 404, description = "Profile not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn update_my_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateProfileDto>,
) -> Result<Json<Profile>, AppError> {
    let profile = UserService::update_profile(&state.db, auth_user.user_id()?, dto).await?;
    Ok(Json(profile))
}
