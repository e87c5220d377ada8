use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use lectern_auth::{create_access_token, create_refresh_token, verify_refresh_token};
use lectern_config::JwtConfig;
use lectern_core::{AppError, hash_password, verify_password};
use lectern_models::{
    LoginRequest, LoginResponse, RefreshTokenResponse, RegisterRequest, User, UserCredentials,
    UserId, UserRole,
};
use lectern_observability::{
    track_login_failure, track_login_success, track_token_issued, track_user_registered,
};

use crate::modules::users::service::USER_COLUMNS;

pub struct AuthService;

fn map_user_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return match db_err.constraint() {
            Some("users_username_key") => AppError::conflict("Username is already taken"),
            _ => AppError::conflict("Email is already registered"),
        };
    }
    AppError::from(e)
}

impl AuthService {
    /// Creates the account and its role profile in one transaction.
    #[instrument(skip(db, dto), fields(username = %dto.username, role = %dto.role))]
    pub async fn register_user(db: &PgPool, dto: RegisterRequest) -> Result<User, AppError> {
        let hashed_password = hash_password(&dto.password)?;

        let mut tx = db.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"INSERT INTO users (username, email, first_name, last_name, password, role, preferred_language)
               VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 'en'))
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(&dto.username)
        .bind(&dto.email)
        .bind(dto.first_name.trim())
        .bind(dto.last_name.trim())
        .bind(&hashed_password)
        .bind(dto.role)
        .bind(&dto.preferred_language)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_user_conflict)?;

        Self::create_profile(&mut tx, &user, &dto).await?;

        tx.commit().await?;

        track_user_registered(user.role.as_str());
        tracing::info!(user_id = %user.id, "User registered");

        Ok(user)
    }

    async fn create_profile(
        tx: &mut Transaction<'_, Postgres>,
        user: &User,
        dto: &RegisterRequest,
    ) -> Result<(), AppError> {
        match user.role {
            UserRole::Student => {
                sqlx::query(
                    r#"INSERT INTO student_profiles (user_id, student_number, course_of_study, admission_year)
                       VALUES ($1, 'STU' || LPAD(nextval('student_number_seq')::text, 6, '0'), $2,
                               COALESCE($3, EXTRACT(YEAR FROM NOW())::int))"#,
                )
                .bind(user.id)
                .bind(&dto.course_of_study)
                .bind(dto.admission_year)
                .execute(&mut **tx)
                .await?;
            }
            UserRole::Tutor => {
                sqlx::query(
                    r#"INSERT INTO tutor_profiles (user_id, staff_number, department)
                       VALUES ($1, 'TUT' || LPAD(nextval('staff_number_seq')::text, 6, '0'), $2)"#,
                )
                .bind(user.id)
                .bind(&dto.department)
                .execute(&mut **tx)
                .await?;
            }
            UserRole::Admin => {
                sqlx::query("INSERT INTO admin_profiles (user_id, department) VALUES ($1, $2)")
                    .bind(user.id)
                    .bind(&dto.department)
                    .execute(&mut **tx)
                    .await?;
            }
            UserRole::Alumni => {
                sqlx::query(
                    "INSERT INTO alumni_profiles (user_id, graduation_year) VALUES ($1, $2)",
                )
                .bind(user.id)
                .bind(dto.graduation_year)
                .execute(&mut **tx)
                .await?;
            }
        }
        Ok(())
    }

    #[instrument(skip(db, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login_user(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let email = dto.email.trim().to_lowercase();

        let credentials = sqlx::query_as::<_, UserCredentials>(&format!(
            "SELECT {USER_COLUMNS}, password FROM users WHERE email = $1"
        ))
        .bind(&email)
        .fetch_optional(db)
        .await?;

        let Some(credentials) = credentials else {
            track_login_failure("unknown_email");
            return Err(AppError::unauthorized("Invalid email or password"));
        };

        if !verify_password(&dto.password, &credentials.password)? {
            track_login_failure("bad_password");
            return Err(AppError::unauthorized("Invalid email or password"));
        }

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET last_login_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(credentials.user.id)
        .fetch_one(db)
        .await?;

        let access_token = create_access_token(
            user.id.into_inner(),
            user.email.as_str(),
            user.role.as_str(),
            jwt_config,
        )?;
        let refresh_token =
            create_refresh_token(user.id.into_inner(), user.email.as_str(), jwt_config)?;

        track_login_success(user.role.as_str());
        track_token_issued("access");
        track_token_issued("refresh");

        Ok(LoginResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_config.access_token_expiry,
            user,
        })
    }

    /// Issues a fresh access token. The role is re-read so the token always
    /// reflects the stored account.
    #[instrument(skip_all)]
    pub async fn refresh_access_token(
        db: &PgPool,
        refresh_token: &str,
        jwt_config: &JwtConfig,
    ) -> Result<RefreshTokenResponse, AppError> {
        let claims = verify_refresh_token(refresh_token, jwt_config)?;
        let user_id: UserId = claims
            .sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid or expired refresh token"))?;

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::unauthorized("Account no longer exists"))?;

        let access_token = create_access_token(
            user.id.into_inner(),
            user.email.as_str(),
            user.role.as_str(),
            jwt_config,
        )?;
        track_token_issued("access");

        Ok(RefreshTokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_config.access_token_expiry,
        })
    }
}
