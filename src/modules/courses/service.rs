use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use lectern_access::{Caller, Entity, authorize_mutation, visibility};
use lectern_core::{AppError, LIKE_ESCAPE, PaginationMeta, contains_pattern, escape_like};
use lectern_models::{
    Course, CourseFilterParams, CourseId, CourseWithStats, CreateCourseDto,
    PaginatedCoursesResponse, UpdateCourseDto, UserId, UserRole,
};

const COURSE_WITH_STATS: &str = "SELECT c.*, \
     (SELECT COUNT(*) FROM enrollments ec WHERE ec.course_id = c.id AND ec.status = 'enrolled') \
     AS enrolled_count FROM courses c";

pub struct CourseService;

fn push_course_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    caller: &Caller,
    filters: &CourseFilterParams,
) {
    qb.push(" WHERE ");
    visibility(caller, Entity::Course).push_sql(qb);

    if let Some(search) = &filters.search {
        let pattern = contains_pattern(search);
        qb.push(" AND (c.code ILIKE ")
            .push_bind(pattern.clone())
            .push(LIKE_ESCAPE)
            .push(" OR c.title ILIKE ")
            .push_bind(pattern)
            .push(LIKE_ESCAPE)
            .push(")");
    }
    if let Some(subject) = &filters.subject {
        qb.push(" AND c.subject ILIKE ")
            .push_bind(escape_like(subject))
            .push(LIKE_ESCAPE);
    }
    if let Some(is_active) = filters.is_active {
        qb.push(" AND c.is_active = ").push_bind(is_active);
    }
}

fn map_course_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return AppError::conflict("A course with this code already exists");
    }
    AppError::from(e)
}

impl CourseService {
    /// Fetches a course the caller can see. Hidden and absent courses are both `NotFound`.
    #[instrument(skip(db))]
    pub async fn find_visible(
        db: &PgPool,
        caller: &Caller,
        id: CourseId,
    ) -> Result<Course, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT c.* FROM courses c WHERE c.id = ");
        qb.push_bind(id).push(" AND ");
        visibility(caller, Entity::Course).push_sql(&mut qb);

        qb.build_query_as::<Course>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Course not found")))
    }

    #[instrument(skip(db))]
    pub async fn list_courses(
        db: &PgPool,
        caller: &Caller,
        filters: CourseFilterParams,
    ) -> Result<PaginatedCoursesResponse, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM courses c");
        push_course_filters(&mut count, caller, &filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new(COURSE_WITH_STATS);
        push_course_filters(&mut query, caller, &filters);
        query
            .push(" ORDER BY c.code LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());
        let courses = query.build_query_as::<CourseWithStats>().fetch_all(db).await?;

        Ok(PaginatedCoursesResponse {
            data: courses,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_course(
        db: &PgPool,
        caller: &Caller,
        id: CourseId,
    ) -> Result<CourseWithStats, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(COURSE_WITH_STATS);
        qb.push(" WHERE c.id = ").push_bind(id).push(" AND ");
        visibility(caller, Entity::Course).push_sql(&mut qb);

        qb.build_query_as::<CourseWithStats>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Course not found")))
    }

    async fn ensure_tutor(db: &PgPool, tutor_id: UserId) -> Result<(), AppError> {
        let role = sqlx::query_scalar::<_, UserRole>("SELECT role FROM users WHERE id = $1")
            .bind(tutor_id)
            .fetch_optional(db)
            .await?;

        match role {
            Some(UserRole::Tutor) => Ok(()),
            Some(_) => Err(AppError::validation("tutor_id must reference a tutor")),
            None => Err(AppError::not_found(anyhow::anyhow!("Tutor not found"))),
        }
    }

    /// Tutors create courses they teach; admins may name any tutor or none.
    #[instrument(skip(db, dto), fields(code = %dto.code))]
    pub async fn create_course(
        db: &PgPool,
        caller: &Caller,
        dto: CreateCourseDto,
    ) -> Result<Course, AppError> {
        caller.require_any_role(&[UserRole::Admin, UserRole::Tutor])?;

        let tutor_id = if caller.is_admin() {
            dto.tutor_id
        } else {
            match dto.tutor_id {
                Some(other) if other != caller.id => {
                    return Err(AppError::forbidden(
                        "Only admins can assign a course to another tutor",
                    ));
                }
                _ => Some(caller.id),
            }
        };

        if let Some(tutor_id) = tutor_id
            && caller.is_admin()
        {
            Self::ensure_tutor(db, tutor_id).await?;
        }

        let course = sqlx::query_as::<_, Course>(
            r#"INSERT INTO courses (code, title, description, tutor_id, credit_hours, subject, is_active, max_students)
               VALUES ($1, $2, $3, $4, COALESCE($5, 3), $6, COALESCE($7, TRUE), COALESCE($8, 50))
               RETURNING *"#,
        )
        .bind(dto.code.trim())
        .bind(dto.title.trim())
        .bind(&dto.description)
        .bind(tutor_id)
        .bind(dto.credit_hours)
        .bind(&dto.subject)
        .bind(dto.is_active)
        .bind(dto.max_students)
        .fetch_one(db)
        .await
        .map_err(map_course_conflict)?;

        tracing::info!(course_id = %course.id, "Course created");
        Ok(course)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_course(
        db: &PgPool,
        caller: &Caller,
        id: CourseId,
        dto: UpdateCourseDto,
    ) -> Result<Course, AppError> {
        let existing = Self::find_visible(db, caller, id).await?;
        authorize_mutation(caller, &existing)?;

        if let Some(tutor_id) = dto.tutor_id
            && existing.tutor_id != Some(tutor_id)
        {
            if !caller.is_admin() {
                return Err(AppError::forbidden("Only admins can reassign a course"));
            }
            Self::ensure_tutor(db, tutor_id).await?;
        }

        let course = sqlx::query_as::<_, Course>(
            r#"UPDATE courses
               SET code = COALESCE($2, code),
                   title = COALESCE($3, title),
                   description = COALESCE($4, description),
                   tutor_id = COALESCE($5, tutor_id),
                   credit_hours = COALESCE($6, credit_hours),
                   subject = COALESCE($7, subject),
                   is_active = COALESCE($8, is_active),
                   max_students = COALESCE($9, max_students),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(dto.code.as_deref().map(str::trim))
        .bind(dto.title.as_deref().map(str::trim))
        .bind(&dto.description)
        .bind(dto.tutor_id)
        .bind(dto.credit_hours)
        .bind(&dto.subject)
        .bind(dto.is_active)
        .bind(dto.max_students)
        .fetch_one(db)
        .await
        .map_err(map_course_conflict)?;

        Ok(course)
    }

    #[instrument(skip(db))]
    pub async fn delete_course(db: &PgPool, caller: &Caller, id: CourseId) -> Result<(), AppError> {
        let existing = Self::find_visible(db, caller, id).await?;
        authorize_mutation(caller, &existing)?;

        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        tracing::info!(course_id = %id, "Course deleted");
        Ok(())
    }
}
