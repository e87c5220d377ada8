mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use lectern::lectern_config::RateLimitConfig;
use lectern::router::init_router;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

fn strict_rate_limit_config() -> RateLimitConfig {
    RateLimitConfig {
        enabled: true,
        auth_replenish_seconds: 60,
        auth_burst_size: 1,
    }
}

fn login_request(ip: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": "nobody@example.com",
                "password": "password123"
            }))
            .unwrap(),
        ))
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_auth_rate_limit_exceeded(pool: PgPool) {
    let app = init_router(common::test_state(pool, strict_rate_limit_config()));

    let first = app.clone().oneshot(login_request("192.168.1.100")).await.unwrap();
    assert_eq!(first.status(), StatusCode::UNAUTHORIZED);

    let second = app.clone().oneshot(login_request("192.168.1.100")).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rate_limit_is_per_ip(pool: PgPool) {
    let app = init_router(common::test_state(pool, strict_rate_limit_config()));

    let first = app.clone().oneshot(login_request("10.0.0.1")).await.unwrap();
    assert_eq!(first.status(), StatusCode::UNAUTHORIZED);

    let other_ip = app.clone().oneshot(login_request("10.0.0.2")).await.unwrap();
    assert_eq!(other_ip.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_non_auth_routes_are_not_limited(pool: PgPool) {
    let app = init_router(common::test_state(pool, strict_rate_limit_config()));

    for _ in 0..3 {
        let request = Request::builder()
            .uri("/api/statistics")
            .header("x-forwarded-for", "192.168.1.200")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_disabled_rate_limit_allows_bursts(pool: PgPool) {
    let app = common::setup_test_app(pool);

    for _ in 0..5 {
        let response = app.clone().oneshot(login_request("192.168.1.150")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
