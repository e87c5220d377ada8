use anyhow::{Context, bail};
use lectern_core::hash_password;
use lectern_models::value_types::validate_username;
use lectern_models::{Email, UserId, UserRole};
use sqlx::PgPool;

pub struct NewAdmin {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub role_title: Option<String>,
}

/// Creates an admin account and its profile in one transaction.
pub async fn create_admin(db: &PgPool, admin: NewAdmin) -> anyhow::Result<UserId> {
    validate_username(&admin.username)?;
    let email = Email::new(&admin.email)?;
    if admin.password.len() < 8 {
        bail!("Password must be at least 8 characters");
    }

    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 OR username = $2)",
    )
    .bind(&email)
    .bind(&admin.username)
    .fetch_one(db)
    .await?;
    if taken {
        bail!("A user with this email or username already exists");
    }

    let password_hash = hash_password(&admin.password).map_err(|e| e.error)?;

    let mut tx = db.begin().await?;

    let id: UserId = sqlx::query_scalar(
        r#"INSERT INTO users (username, email, first_name, last_name, password, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id"#,
    )
    .bind(&admin.username)
    .bind(&email)
    .bind(&admin.first_name)
    .bind(&admin.last_name)
    .bind(&password_hash)
    .bind(UserRole::Admin)
    .fetch_one(&mut *tx)
    .await
    .context("Failed to insert admin user")?;

    sqlx::query("INSERT INTO admin_profiles (user_id, role_title) VALUES ($1, $2)")
        .bind(id)
        .bind(&admin.role_title)
        .execute(&mut *tx)
        .await
        .context("Failed to insert admin profile")?;

    tx.commit().await?;
    Ok(id)
}
