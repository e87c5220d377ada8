use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use lectern_core::AppError;
use lectern_models::{
    CreateTestimonialDto, PaginatedTestimonialsResponse, Testimonial, TestimonialFilterParams,
    TestimonialId, UpdateTestimonialDto,
};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::testimonials::service::TestimonialService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/testimonials",
    params(TestimonialFilterParams),
    responses(
        (status = 200, description = "Approved testimonials; admins see all", body = PaginatedTestimonialsResponse)
    ),
    tag = "Testimonials"
)]
#[instrument(skip(state))]
pub async fn get_testimonials(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
    Query(filters): Query<TestimonialFilterParams>,
) -> Result<Json<PaginatedTestimonialsResponse>, AppError> {
    let caller = auth_user.map(|u| u.caller()).transpose()?;
    let testimonials =
        TestimonialService::list_testimonials(&state.db, caller.as_ref(), filters).await?;
    Ok(Json(testimonials))
}

#[utoipa::path(
    post,
    path = "/api/testimonials",
    request_body = CreateTestimonialDto,
    responses(
        (status = 201, description = "Testimonial submitted for review", body = Testimonial),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Testimonials"
)]
#[instrument(skip(state, dto))]
pub async fn submit_testimonial(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
    ValidatedJson(dto): ValidatedJson<CreateTestimonialDto>,
) -> Result<(StatusCode, Json<Testimonial>), AppError> {
    let caller = auth_user.map(|u| u.caller()).transpose()?;
    let testimonial =
        TestimonialService::submit_testimonial(&state.db, caller.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(testimonial)))
}

#[utoipa::path(
    put,
    path = "/api/testimonials/{id}",
    params(("id" = TestimonialId, Path, description = "Testimonial ID")),
    request_body = UpdateTestimonialDto,
    responses(
        (status = 200, description = "Testimonial updated", body = Testimonial),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Testimonial not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Testimonials"
)]
#[instrument(skip(state, dto))]
pub async fn update_testimonial(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<TestimonialId>,
    ValidatedJson(dto): ValidatedJson<UpdateTestimonialDto>,
) -> Result<Json<Testimonial>, AppError> {
    let testimonial =
        TestimonialService::update_testimonial(&state.db, &auth_user.caller()?, id, dto).await?;
    Ok(Json(testimonial))
}

#[utoipa::path(
    delete,
    path = "/api/testimonials/{id}",
    params(("id" = TestimonialId, Path, description = "Testimonial ID")),
    responses(
        (status = 204, description = "Testimonial deleted"),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Testimonial not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Testimonials"
)]
#[instrument(skip(state))]
pub async fn delete_testimonial(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<TestimonialId>,
) -> Result<StatusCode, AppError> {
    TestimonialService::delete_testimonial(&state.db, &auth_user.caller()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
