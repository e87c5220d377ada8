mod common;

use axum::http::StatusCode;
use common::{create_test_user, send, setup_test_app};
use lectern::lectern_models::UserRole;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_lists_users_by_role(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    create_test_user(&pool, UserRole::Student).await;
    create_test_user(&pool, UserRole::Student).await;
    create_test_user(&pool, UserRole::Tutor).await;
    let app = setup_test_app(pool);

    let (status, body) = send(&app, "GET", "/api/users?role=student", Some(&admin.token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);
    assert!(
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|u| u["role"] == "student")
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_user_list_is_admin_only(pool: PgPool) {
    let tutor = create_test_user(&pool, UserRole::Tutor).await;
    let app = setup_test_app(pool);

    let (status, body) = send(&app, "GET", "/api/users", Some(&tutor.token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "PERMISSION_DENIED");

    let (status, _) = send(&app, "GET", "/api/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_users_read_only_their_own_account(pool: PgPool) {
    let student = create_test_user(&pool, UserRole::Student).await;
    let other = create_test_user(&pool, UserRole::Student).await;
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/users/{}", student.id),
        Some(&student.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["kind"], "student");

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/users/{}", other.id),
        Some(&student.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_cannot_delete_self(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let app = setup_test_app(pool.clone());

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/users/{}", admin.id),
        Some(&admin.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(admin.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(exists);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_deletes_user(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let alumni = create_test_user(&pool, UserRole::Alumni).await;
    let app = setup_test_app(pool.clone());

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/users/{}", alumni.id),
        Some(&admin.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let profiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM alumni_profiles WHERE user_id = $1")
        .bind(alumni.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(profiles, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_me_changes_names(pool: PgPool) {
    let student = create_test_user(&pool, UserRole::Student).await;
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/users/me",
        Some(&student.token),
        Some(json!({ "first_name": "Grace", "preferred_language": "fr" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Grace");
    assert_eq!(body["preferred_language"], "fr");
    assert_eq!(body["role"], "student");
}
