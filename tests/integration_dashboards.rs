mod common;

use axum::http::StatusCode;
use common::{
    create_test_assignment, create_test_course, create_test_user, enroll, send, setup_test_app,
};
use lectern::lectern_models::UserRole;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

async fn set_status(pool: &PgPool, enrollment_id: Uuid, status: &str) {
    sqlx::query("UPDATE enrollments SET status = $2::enrollment_status WHERE id = $1")
        .bind(enrollment_id)
        .bind(status)
        .execute(pool)
        .await
        .unwrap();
}

/// One enrolled, one completed and one dropped course, plus one ungraded submission.
async fn mixed_history(pool: &PgPool) -> (common::TestUser, common::TestUser) {
    let tutor = create_test_user(pool, UserRole::Tutor).await;
    let student = create_test_user(pool, UserRole::Student).await;

    let active = create_test_course(pool, Some(tutor.id), 10).await;
    let finished = create_test_course(pool, Some(tutor.id), 10).await;
    let abandoned = create_test_course(pool, Some(tutor.id), 10).await;
    enroll(pool, student.id, active).await;
    let completed = enroll(pool, student.id, finished).await;
    let dropped = enroll(pool, student.id, abandoned).await;
    set_status(pool, completed, "completed").await;
    set_status(pool, dropped, "dropped").await;

    let assignment_id = create_test_assignment(pool, active, tutor.id).await;
    sqlx::query(
        "INSERT INTO submissions (assignment_id, student_id, submitted_content) VALUES ($1, $2, 'Draft')",
    )
    .bind(assignment_id)
    .bind(student.id)
    .execute(pool)
    .await
    .unwrap();

    (tutor, student)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_dashboard_counts_every_enrollment(pool: PgPool) {
    let (_, student) = mixed_history(&pool).await;
    let app = setup_test_app(pool);

    let (status, dashboard) =
        send(&app, "GET", "/api/dashboard/student", Some(&student.token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["enrolled_courses"], 3);
    assert_eq!(dashboard["completed_courses"], 1);
    assert_eq!(dashboard["pending_assignments"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_students_overview_rates_completed_share(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let (_, student) = mixed_history(&pool).await;
    let app = setup_test_app(pool);

    let (status, overview) = send(
        &app,
        "GET",
        "/api/dashboard/admin/students",
        Some(&admin.token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let row = overview
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["user_id"] == json!(student.id.to_string()))
        .unwrap();
    assert_eq!(row["courses_enrolled"], 3);
    assert_eq!(row["completed_courses"], 1);
    assert_eq!(row["progress_rate"], 33.33);
    assert_eq!(row["recent_submissions"], 1);
}
