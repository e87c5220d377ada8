mod common;

use axum::http::StatusCode;
use common::{create_test_course, create_test_user, enroll, send, setup_test_app};
use lectern::lectern_models::UserRole;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_tutor_creates_own_course(pool: PgPool) {
    let tutor = create_test_user(&pool, UserRole::Tutor).await;
    let app = setup_test_app(pool);

    let (status, course) = send(
        &app,
        "POST",
        "/api/courses",
        Some(&tutor.token),
        Some(json!({ "code": "CS101", "title": "Intro to Computing" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(course["tutor_id"], tutor.id.to_string());
    assert_eq!(course["max_students"], 50);
    assert_eq!(course["is_active"], true);

    let (status, body) = send(
        &app,
        "POST",
        "/api/courses",
        Some(&tutor.token),
        Some(json!({ "code": "CS101", "title": "Duplicate" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_students_cannot_create_courses(pool: PgPool) {
    let student = create_test_user(&pool, UserRole::Student).await;
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        "POST",
        "/api/courses",
        Some(&student.token),
        Some(json!({ "code": "HACK1", "title": "Nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "PERMISSION_DENIED");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_inactive_course_visible_only_when_enrolled(pool: PgPool) {
    let enrolled = create_test_user(&pool, UserRole::Student).await;
    let outsider = create_test_user(&pool, UserRole::Student).await;
    let course_id = create_test_course(&pool, None, 10).await;
    enroll(&pool, enrolled.id, course_id).await;
    sqlx::query("UPDATE courses SET is_active = FALSE WHERE id = $1")
        .bind(course_id)
        .execute(&pool)
        .await
        .unwrap();
    let app = setup_test_app(pool);
    let uri = format!("/api/courses/{course_id}");

    let (status, course) = send(&app, "GET", &uri, Some(&enrolled.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(course["enrolled_count"], 1);

    let (status, _) = send(&app, "GET", &uri, Some(&outsider.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_tutor_sees_only_own_courses(pool: PgPool) {
    let tutor = create_test_user(&pool, UserRole::Tutor).await;
    let other_tutor = create_test_user(&pool, UserRole::Tutor).await;
    create_test_course(&pool, Some(tutor.id), 10).await;
    create_test_course(&pool, Some(tutor.id), 10).await;
    let foreign = create_test_course(&pool, Some(other_tutor.id), 10).await;
    let app = setup_test_app(pool);

    let (_, list) = send(&app, "GET", "/api/courses", Some(&tutor.token), None).await;
    assert_eq!(list["meta"]["total"], 2);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/courses/{foreign}"),
        Some(&tutor.token),
        Some(json!({ "title": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_dashboard_requires_admin(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let tutor = create_test_user(&pool, UserRole::Tutor).await;
    create_test_course(&pool, Some(tutor.id), 10).await;
    let app = setup_test_app(pool);

    let (status, _) = send(&app, "GET", "/api/dashboard/admin", Some(&tutor.token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, dashboard) =
        send(&app, "GET", "/api/dashboard/admin", Some(&admin.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["total_courses"], 1);

    let (status, overview) =
        send(&app, "GET", "/api/dashboard/admin/tutors", Some(&admin.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview.as_array().unwrap().len(), 1);

    let (status, stats) = send(&app, "GET", "/api/stats", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["tutors"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_extreme_pagination_returns_empty_page(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    create_test_course(&pool, None, 10).await;
    let app = setup_test_app(pool);

    for uri in [
        "/api/courses?page=9223372036854775807&limit=100",
        "/api/courses?offset=9223372036854775807",
    ] {
        let (status, body) = send(&app, "GET", uri, Some(&admin.token), None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(body["data"].as_array().unwrap().is_empty());
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["meta"]["has_more"], false);
    }
}
