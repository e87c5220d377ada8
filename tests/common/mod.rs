#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use lectern::lectern_auth::create_access_token;
use lectern::lectern_config::{CorsConfig, JwtConfig, RateLimitConfig, ServerConfig};
use lectern::lectern_core::hash_password;
use lectern::lectern_models::UserRole;
use lectern::router::init_router;
use lectern::state::AppState;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "testpass123";

pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub token: String,
}

pub fn test_state(pool: PgPool, rate_limit_config: RateLimitConfig) -> AppState {
    dotenvy::dotenv().ok();
    AppState {
        db: pool,
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        rate_limit_config,
        server_config: ServerConfig::default(),
    }
}

/// Router with rate limiting off so tests can hammer the auth routes.
pub fn setup_test_app(pool: PgPool) -> Router {
    init_router(test_state(pool, RateLimitConfig::disabled()))
}

pub fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

/// Inserts a user of `role` with a matching profile row and mints an access token.
pub async fn create_test_user(pool: &PgPool, role: UserRole) -> TestUser {
    let suffix = unique_suffix();
    let email = format!("{}-{suffix}@test.com", role.as_str());
    let hashed = hash_password(TEST_PASSWORD).unwrap();

    let id: Uuid = sqlx::query_scalar(
        r#"INSERT INTO users (username, email, first_name, last_name, password, role)
           VALUES ($1, $2, 'Test', $3, $4, $5)
           RETURNING id"#,
    )
    .bind(format!("{}_{suffix}", role.as_str()))
    .bind(&email)
    .bind(role.as_str())
    .bind(hashed)
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap();

    let profile = match role {
        UserRole::Student => {
            "INSERT INTO student_profiles (user_id, student_number) \
             VALUES ($1, 'STU' || LPAD(nextval('student_number_seq')::text, 6, '0'))"
        }
        UserRole::Tutor => {
            "INSERT INTO tutor_profiles (user_id, staff_number) \
             VALUES ($1, 'TUT' || LPAD(nextval('staff_number_seq')::text, 6, '0'))"
        }
        UserRole::Admin => "INSERT INTO admin_profiles (user_id) VALUES ($1)",
        UserRole::Alumni => "INSERT INTO alumni_profiles (user_id) VALUES ($1)",
    };
    sqlx::query(profile).bind(id).execute(pool).await.unwrap();

    let jwt_config = JwtConfig::from_env();
    let token = create_access_token(id, &email, role.as_str(), &jwt_config).unwrap();

    TestUser {
        id,
        email,
        role,
        token,
    }
}

pub async fn create_test_course(pool: &PgPool, tutor_id: Option<Uuid>, max_students: i32) -> Uuid {
    sqlx::query_scalar(
        r#"INSERT INTO courses (code, title, tutor_id, max_students)
           VALUES ($1, 'Test Course', $2, $3)
           RETURNING id"#,
    )
    .bind(format!("C{}", &unique_suffix()[..8]))
    .bind(tutor_id)
    .bind(max_students)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn enroll(pool: &PgPool, student_id: Uuid, course_id: Uuid) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO enrollments (student_id, course_id) VALUES ($1, $2) RETURNING id",
    )
    .bind(student_id)
    .bind(course_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_assignment(pool: &PgPool, course_id: Uuid, tutor_id: Uuid) -> Uuid {
    sqlx::query_scalar(
        r#"INSERT INTO assignments (course_id, tutor_id, title, due_date, max_points)
           VALUES ($1, $2, 'Essay 1', NOW() + INTERVAL '7 days', 100)
           RETURNING id"#,
    )
    .bind(course_id)
    .bind(tutor_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_schedule(pool: &PgPool, course_id: Uuid, tutor_id: Uuid) -> Uuid {
    sqlx::query_scalar(
        r#"INSERT INTO class_schedules (course_id, tutor_id, title, scheduled_date)
           VALUES ($1, $2, 'Lecture 1', NOW() + INTERVAL '1 day')
           RETURNING id"#,
    )
    .bind(course_id)
    .bind(tutor_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Sends one request and returns the status with the JSON body (`Null` when empty).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}
