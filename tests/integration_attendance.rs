mod common;

use axum::http::StatusCode;
use common::{
    create_test_course, create_test_schedule, create_test_user, enroll, send, setup_test_app,
};
use lectern::lectern_models::UserRole;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_attendance_rate_is_zero_without_records(pool: PgPool) {
    let tutor = create_test_user(&pool, UserRole::Tutor).await;
    let student = create_test_user(&pool, UserRole::Student).await;
    let course_id = create_test_course(&pool, Some(tutor.id), 10).await;
    enroll(&pool, student.id, course_id).await;
    create_test_schedule(&pool, course_id, tutor.id).await;
    let app = setup_test_app(pool);

    let (status, dashboard) =
        send(&app, "GET", "/api/dashboard/student", Some(&student.token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["attendance_rate"], 0.0);
    assert_eq!(dashboard["avg_grade"], 0.0);
    assert_eq!(dashboard["upcoming_classes"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_tutor_records_attendance(pool: PgPool) {
    let tutor = create_test_user(&pool, UserRole::Tutor).await;
    let student = create_test_user(&pool, UserRole::Student).await;
    let course_id = create_test_course(&pool, Some(tutor.id), 10).await;
    enroll(&pool, student.id, course_id).await;
    let schedule_id = create_test_schedule(&pool, course_id, tutor.id).await;
    let app = setup_test_app(pool);
    let body = json!({
        "class_schedule_id": schedule_id,
        "student_id": student.id,
        "status": "late"
    });

    let (status, record) =
        send(&app, "POST", "/api/attendance", Some(&tutor.token), Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["status"], "late");

    let (status, _) = send(&app, "POST", "/api/attendance", Some(&tutor.token), Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, dashboard) =
        send(&app, "GET", "/api/dashboard/student", Some(&student.token), None).await;
    assert_eq!(dashboard["attendance_rate"], 100.0);

    let (_, list) = send(&app, "GET", "/api/attendance", Some(&student.token), None).await;
    assert_eq!(list["meta"]["total"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_attendance_requires_enrolled_student(pool: PgPool) {
    let tutor = create_test_user(&pool, UserRole::Tutor).await;
    let outsider = create_test_user(&pool, UserRole::Student).await;
    let course_id = create_test_course(&pool, Some(tutor.id), 10).await;
    let schedule_id = create_test_schedule(&pool, course_id, tutor.id).await;
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        "POST",
        "/api/attendance",
        Some(&tutor.token),
        Some(json!({ "class_schedule_id": schedule_id, "student_id": outsider.id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_other_tutor_cannot_record_attendance(pool: PgPool) {
    let tutor = create_test_user(&pool, UserRole::Tutor).await;
    let other_tutor = create_test_user(&pool, UserRole::Tutor).await;
    let student = create_test_user(&pool, UserRole::Student).await;
    let course_id = create_test_course(&pool, Some(tutor.id), 10).await;
    enroll(&pool, student.id, course_id).await;
    let schedule_id = create_test_schedule(&pool, course_id, tutor.id).await;
    let app = setup_test_app(pool.clone());

    let (status, _) = send(
        &app,
        "POST",
        "/api/attendance",
        Some(&other_tutor.token),
        Some(json!({ "class_schedule_id": schedule_id, "student_id": student.id })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/api/attendance",
        Some(&student.token),
        Some(json!({ "class_schedule_id": schedule_id, "student_id": student.id })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendance")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 0);
}
