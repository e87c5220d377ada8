mod common;

use axum::http::StatusCode;
use common::{TEST_PASSWORD, create_test_user, generate_unique_email, send, setup_test_app};
use lectern::lectern_models::UserRole;
use serde_json::{Value, json};
use sqlx::PgPool;

fn register_body(email: &str, role: &str) -> Value {
    json!({
        "username": format!("user_{}", &common::unique_suffix()),
        "email": email,
        "first_name": "Ada",
        "last_name": "Lovelace",
        "password": "password123",
        "password_confirm": "password123",
        "role": role
    })
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_student_creates_profile(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let email = generate_unique_email();

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(register_body(&email, "student")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], email);
    assert_eq!(body["role"], "student");
    assert!(body.get("password").is_none());

    let profiles: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM student_profiles sp JOIN users u ON u.id = sp.user_id WHERE u.email = $1",
    )
    .bind(&email)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(profiles, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_admin_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(register_body(&generate_unique_email(), "admin")),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(admins, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_duplicate_email_conflicts(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let email = generate_unique_email();

    let (first, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(register_body(&email, "tutor")),
    )
    .await;
    assert_eq!(first, StatusCode::CREATED);

    let (second, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(register_body(&email, "tutor")),
    )
    .await;
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_refresh_and_me(pool: PgPool) {
    let user = create_test_user(&pool, UserRole::Tutor).await;
    let app = setup_test_app(pool.clone());

    let (status, login) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": user.email, "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["token_type"], "Bearer");
    assert_eq!(login["user"]["email"], user.email);

    let refresh_token = login["refresh_token"].as_str().unwrap().to_string();
    let (status, refreshed) = send(
        &app,
        "POST",
        "/api/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh_token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let access_token = refreshed["access_token"].as_str().unwrap().to_string();

    let (status, me) = send(&app, "GET", "/api/auth/me", Some(&access_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], user.id.to_string());
    assert_eq!(me["profile"]["kind"], "tutor");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_access_token_is_not_a_refresh_token(pool: PgPool) {
    let user = create_test_user(&pool, UserRole::Student).await;
    let app = setup_test_app(pool.clone());

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/refresh",
        None,
        Some(json!({ "refresh_token": user.token })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    let user = create_test_user(&pool, UserRole::Student).await;
    let app = setup_test_app(pool.clone());

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": user.email, "password": "not-the-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_requires_token(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, _) = send(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/auth/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
