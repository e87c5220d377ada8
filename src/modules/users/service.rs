use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use lectern_core::{AppError, LIKE_ESCAPE, PaginationMeta, contains_pattern};
use lectern_models::{
    AdminProfile, AlumniProfile, PaginatedUsersResponse, Profile, StudentProfile, TutorProfile,
    UpdateMeDto, UpdateProfileDto, User, UserFilterParams, UserId, UserRole, UserWithProfile,
};

/// Column list matching [`User`]'s `FromRow` layout.
pub const USER_COLUMNS: &str = "id, username, email, first_name, last_name, role, \
     preferred_language, profile_image, last_login_at, created_at, updated_at";

pub struct UserService;

fn push_user_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &UserFilterParams) {
    qb.push(" WHERE TRUE");
    if let Some(role) = filters.role {
        qb.push(" AND role = ").push_bind(role);
    }
    if let Some(search) = &filters.search {
        let pattern = contains_pattern(search);
        qb.push(" AND (username ILIKE ")
            .push_bind(pattern.clone())
            .push(LIKE_ESCAPE)
            .push(" OR email ILIKE ")
            .push_bind(pattern.clone())
            .push(LIKE_ESCAPE)
            .push(" OR (first_name || ' ' || last_name) ILIKE ")
            .push_bind(pattern)
            .push(LIKE_ESCAPE)
            .push(")");
    }
}

impl UserService {
    #[instrument(skip(db))]
    pub async fn get_user(db: &PgPool, id: UserId) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_user_with_profile(
        db: &PgPool,
        id: UserId,
    ) -> Result<UserWithProfile, AppError> {
        let user = Self::get_user(db, id).await?;
        let profile = Self::fetch_profile(db, user.id, user.role).await?;
        Ok(UserWithProfile { user, profile })
    }

    async fn fetch_profile(
        db: &PgPool,
        id: UserId,
        role: UserRole,
    ) -> Result<Option<Profile>, AppError> {
        let profile = match role {
            UserRole::Student => sqlx::query_as::<_, StudentProfile>(
                "SELECT * FROM student_profiles WHERE user_id = $1",
            )
            .bind(id)
            .fetch_optional(db)
            .await?
            .map(Profile::Student),
            UserRole::Tutor => {
                sqlx::query_as::<_, TutorProfile>("SELECT * FROM tutor_profiles WHERE user_id = $1")
                    .bind(id)
                    .fetch_optional(db)
                    .await?
                    .map(Profile::Tutor)
            }
            UserRole::Admin => {
                sqlx::query_as::<_, AdminProfile>("SELECT * FROM admin_profiles WHERE user_id = $1")
                    .bind(id)
                    .fetch_optional(db)
                    .await?
                    .map(Profile::Admin)
            }
            UserRole::Alumni => sqlx::query_as::<_, AlumniProfile>(
                "SELECT * FROM alumni_profiles WHERE user_id = $1",
            )
            .bind(id)
            .fetch_optional(db)
            .await?
            .map(Profile::Alumni),
        };
        Ok(profile)
    }

    #[instrument(skip(db))]
    pub async fn list_users(
        db: &PgPool,
        filters: UserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_user_filters(&mut count, &filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users"));
        push_user_filters(&mut query, &filters);
        query
            .push(" ORDER BY created_at DESC, id LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());
        let users = query.build_query_as::<User>().fetch_all(db).await?;

        Ok(PaginatedUsersResponse {
            data: users,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db, dto))]
    pub async fn update_me(db: &PgPool, id: UserId, dto: UpdateMeDto) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            r#"UPDATE users
               SET first_name = COALESCE($2, first_name),
                   last_name = COALESCE($3, last_name),
                   preferred_language = COALESCE($4, preferred_language),
                   profile_image = COALESCE($5, profile_image),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(id)
        .bind(dto.first_name.as_deref().map(str::trim))
        .bind(dto.last_name.as_deref().map(str::trim))
        .bind(&dto.preferred_language)
        .bind(&dto.profile_image)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))
    }

    /// Updates the profile that belongs to the user's role; other fields are ignored.
    #[instrument(skip(db, dto))]
    pub async fn update_profile(
        db: &PgPool,
        id: UserId,
        dto: UpdateProfileDto,
    ) -> Result<Profile, AppError> {
        let user = Self::get_user(db, id).await?;
        let not_found = || AppError::not_found(anyhow::anyhow!("Profile not found"));

        let profile = match user.role {
            UserRole::Student => sqlx::query_as::<_, StudentProfile>(
                r#"UPDATE student_profiles
                   SET course_of_study = COALESCE($2, course_of_study),
                       admission_year = COALESCE($3, admission_year),
                       updated_at = NOW()
                   WHERE user_id = $1
                   RETURNING *"#,
            )
            .bind(id)
            .bind(&dto.course_of_study)
            .bind(dto.admission_year)
            .fetch_optional(db)
            .await?
            .map(Profile::Student),
            UserRole::Tutor => sqlx::query_as::<_, TutorProfile>(
                r#"UPDATE tutor_profiles
                   SET department = COALESCE($2, department),
                       bio = COALESCE($3, bio),
                       subjects = COALESCE($4, subjects),
                       updated_at = NOW()
                   WHERE user_id = $1
                   RETURNING *"#,
            )
            .bind(id)
            .bind(&dto.department)
            .bind(&dto.bio)
            .bind(&dto.subjects)
            .fetch_optional(db)
            .await?
            .map(Profile::Tutor),
            UserRole::Admin => sqlx::query_as::<_, AdminProfile>(
                r#"INSERT INTO admin_profiles (user_id, role_title, department)
                   VALUES ($1, $2, $3)
                   ON CONFLICT (user_id) DO UPDATE
                   SET role_title = COALESCE(EXCLUDED.role_title, admin_profiles.role_title),
                       department = COALESCE(EXCLUDED.department, admin_profiles.department),
                       updated_at = NOW()
                   RETURNING *"#,
            )
            .bind(id)
            .bind(&dto.role_title)
            .bind(&dto.department)
            .fetch_optional(db)
            .await?
            .map(Profile::Admin),
            UserRole::Alumni => sqlx::query_as::<_, AlumniProfile>(
                r#"INSERT INTO alumni_profiles (user_id, graduation_year, current_employer, bio)
                   VALUES ($1, $2, $3, $4)
                   ON CONFLICT (user_id) DO UPDATE
                   SET graduation_year = COALESCE(EXCLUDED.graduation_year, alumni_profiles.graduation_year),
                       current_employer = COALESCE(EXCLUDED.current_employer, alumni_profiles.current_employer),
                       bio = COALESCE(EXCLUDED.bio, alumni_profiles.bio),
                       updated_at = NOW()
                   RETURNING *"#,
            )
            .bind(id)
            .bind(dto.graduation_year)
            .bind(&dto.current_employer)
            .bind(&dto.bio)
            .fetch_optional(db)
            .await?
            .map(Profile::Alumni),
        };

        profile.ok_or_else(not_found)
    }

    #[instrument(skip(db))]
    pub async fn delete_user(db: &PgPool, id: UserId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}
