use std::sync::Arc;

use axum::http::{HeaderValue, Method, StatusCode};
use axum::{Json, Router, extract::State, middleware, routing::get};
use serde_json::{Value, json};
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use lectern_observability::{logging_middleware, metrics_middleware};

use crate::docs::ApiDoc;
use crate::middleware::role::require_admin;
use crate::modules::announcements::init_announcements_router;
use crate::modules::assignments::init_assignments_router;
use crate::modules::attendance::init_attendance_router;
use crate::modules::auth::{init_auth_router, init_session_router};
use crate::modules::class_schedules::init_class_schedules_router;
use crate::modules::contact::{init_contact_admin_router, init_contact_router};
use crate::modules::courses::init_courses_router;
use crate::modules::dashboards::init_dashboards_router;
use crate::modules::enrollments::init_enrollments_router;
use crate::modules::events::init_events_router;
use crate::modules::messages::init_messages_router;
use crate::modules::news::init_news_router;
use crate::modules::notifications::init_notifications_router;
use crate::modules::site::init_site_router;
use crate::modules::submissions::init_submissions_router;
use crate::modules::testimonials::init_testimonials_router;
use crate::modules::users::{init_users_admin_router, init_users_router};
use crate::state::AppState;

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    let credentials = match state.rate_limit_config.auth_governor_config() {
        Some(config) => init_auth_router().layer(GovernorLayer::new(Arc::new(config))),
        None => init_auth_router(),
    };

    credentials.merge(init_session_router())
}

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/health", get(health))
        .nest(
            "/api",
            Router::new()
                .nest("/auth", auth_routes(&state))
                .nest(
                    "/users",
                    init_users_router().merge(
                        init_users_admin_router()
                            .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
                    ),
                )
                .nest("/courses", init_courses_router())
                .nest("/enrollments", init_enrollments_router())
                .nest("/assignments", init_assignments_router())
                .nest("/submissions", init_submissions_router())
                .nest("/class-schedules", init_class_schedules_router())
                .nest("/attendance", init_attendance_router())
                .nest("/dashboard", init_dashboards_router())
                .nest("/announcements", init_announcements_router())
                .nest("/notifications", init_notifications_router())
                .nest("/messages", init_messages_router())
                .nest("/news", init_news_router())
                .nest("/events", init_events_router())
                .nest("/testimonials", init_testimonials_router())
                .nest(
                    "/contact",
                    init_contact_router().merge(
                        init_contact_admin_router()
                            .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
                    ),
                )
                .merge(init_site_router()),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
