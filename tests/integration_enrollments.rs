mod common;

use axum::http::StatusCode;
use common::{create_test_course, create_test_user, enroll, send, setup_test_app};
use lectern::lectern_models::UserRole;
use serde_json::json;
use sqlx::PgPool;

async fn enrollment_count(pool: &PgPool, course_id: uuid::Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE course_id = $1")
        .bind(course_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_enrolls_self(pool: PgPool) {
    let student = create_test_user(&pool, UserRole::Student).await;
    let course_id = create_test_course(&pool, None, 10).await;
    let app = setup_test_app(pool.clone());

    let (status, body) = send(
        &app,
        "POST",
        "/api/enrollments",
        Some(&student.token),
        Some(json!({ "course_id": course_id })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["student_id"], student.id.to_string());
    assert_eq!(body["status"], "enrolled");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_enrollment_conflicts(pool: PgPool) {
    let student = create_test_user(&pool, UserRole::Student).await;
    let course_id = create_test_course(&pool, None, 10).await;
    enroll(&pool, student.id, course_id).await;
    let app = setup_test_app(pool.clone());

    let (status, body) = send(
        &app,
        "POST",
        "/api/enrollments",
        Some(&student.token),
        Some(json!({ "course_id": course_id })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_ENROLLMENT");
    assert_eq!(enrollment_count(&pool, course_id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_enrollments_leave_one_row(pool: PgPool) {
    let student = create_test_user(&pool, UserRole::Student).await;
    let course_id = create_test_course(&pool, None, 10).await;
    let app = setup_test_app(pool.clone());

    let body = json!({ "course_id": course_id });
    let (first, second) = tokio::join!(
        send(&app, "POST", "/api/enrollments", Some(&student.token), Some(body.clone())),
        send(&app, "POST", "/api/enrollments", Some(&student.token), Some(body.clone())),
    );

    let mut statuses = [first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
    assert_eq!(enrollment_count(&pool, course_id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_full_course_rejects_enrollment(pool: PgPool) {
    let first = create_test_user(&pool, UserRole::Student).await;
    let second = create_test_user(&pool, UserRole::Student).await;
    let course_id = create_test_course(&pool, None, 1).await;
    enroll(&pool, first.id, course_id).await;
    let app = setup_test_app(pool.clone());

    let (status, body) = send(
        &app,
        "POST",
        "/api/enrollments",
        Some(&second.token),
        Some(json!({ "course_id": course_id })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(enrollment_count(&pool, course_id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_enrollments_respect_capacity(pool: PgPool) {
    let first = create_test_user(&pool, UserRole::Student).await;
    let second = create_test_user(&pool, UserRole::Student).await;
    let course_id = create_test_course(&pool, None, 1).await;
    let app = setup_test_app(pool.clone());

    let body = json!({ "course_id": course_id });
    let (a, b) = tokio::join!(
        send(&app, "POST", "/api/enrollments", Some(&first.token), Some(body.clone())),
        send(&app, "POST", "/api/enrollments", Some(&second.token), Some(body.clone())),
    );

    let mut statuses = [a.0, b.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::BAD_REQUEST]);
    assert_eq!(enrollment_count(&pool, course_id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_cannot_enroll_someone_else(pool: PgPool) {
    let student = create_test_user(&pool, UserRole::Student).await;
    let other = create_test_user(&pool, UserRole::Student).await;
    let course_id = create_test_course(&pool, None, 10).await;
    let app = setup_test_app(pool.clone());

    let (status, _) = send(
        &app,
        "POST",
        "/api/enrollments",
        Some(&student.token),
        Some(json!({ "course_id": course_id, "student_id": other.id })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(enrollment_count(&pool, course_id).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_enrolls_student(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let student = create_test_user(&pool, UserRole::Student).await;
    let tutor = create_test_user(&pool, UserRole::Tutor).await;
    let course_id = create_test_course(&pool, None, 10).await;
    let app = setup_test_app(pool.clone());

    let (status, _) = send(
        &app,
        "POST",
        "/api/enrollments",
        Some(&admin.token),
        Some(json!({ "course_id": course_id, "student_id": student.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/enrollments",
        Some(&admin.token),
        Some(json!({ "course_id": course_id, "student_id": tutor.id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_status_transitions(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let student = create_test_user(&pool, UserRole::Student).await;
    let course_id = create_test_course(&pool, None, 10).await;
    let enrollment_id = enroll(&pool, student.id, course_id).await;
    let app = setup_test_app(pool.clone());
    let uri = format!("/api/enrollments/{enrollment_id}");

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&admin.token),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&admin.token),
        Some(json!({ "status": "enrolled" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&admin.token),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_only_admin_sets_results(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let student = create_test_user(&pool, UserRole::Student).await;
    let course_id = create_test_course(&pool, None, 10).await;
    let enrollment_id = enroll(&pool, student.id, course_id).await;
    let app = setup_test_app(pool.clone());
    let uri = format!("/api/enrollments/{enrollment_id}");

    let (status, _) = send(
        &app,
        "PUT",
        &uri,
        Some(&student.token),
        Some(json!({ "progress": 50.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&admin.token),
        Some(json!({ "progress": 50.0, "grade": "B+" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress"], 50.0);
    assert_eq!(body["grade"], "B+");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_drops_own_enrollment_but_tutor_cannot(pool: PgPool) {
    let tutor = create_test_user(&pool, UserRole::Tutor).await;
    let student = create_test_user(&pool, UserRole::Student).await;
    let course_id = create_test_course(&pool, Some(tutor.id), 10).await;
    let enrollment_id = enroll(&pool, student.id, course_id).await;
    let app = setup_test_app(pool.clone());
    let uri = format!("/api/enrollments/{enrollment_id}");

    let (status, _) = send(
        &app,
        "PUT",
        &uri,
        Some(&tutor.token),
        Some(json!({ "status": "suspended" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&student.token),
        Some(json!({ "status": "dropped" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "dropped");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_enrollments_are_scoped(pool: PgPool) {
    let tutor = create_test_user(&pool, UserRole::Tutor).await;
    let other_tutor = create_test_user(&pool, UserRole::Tutor).await;
    let student = create_test_user(&pool, UserRole::Student).await;
    let classmate = create_test_user(&pool, UserRole::Student).await;
    let course_id = create_test_course(&pool, Some(tutor.id), 10).await;
    let enrollment_id = enroll(&pool, student.id, course_id).await;
    enroll(&pool, classmate.id, course_id).await;
    let app = setup_test_app(pool.clone());

    let (_, body) = send(&app, "GET", "/api/enrollments", Some(&student.token), None).await;
    assert_eq!(body["meta"]["total"], 1);

    let (_, body) = send(&app, "GET", "/api/enrollments", Some(&tutor.token), None).await;
    assert_eq!(body["meta"]["total"], 2);

    let (_, body) = send(&app, "GET", "/api/enrollments", Some(&other_tutor.token), None).await;
    assert_eq!(body["meta"]["total"], 0);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/enrollments/{enrollment_id}"),
        Some(&classmate.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
