use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use lectern_access::{Caller, Entity, authorize_mutation, visibility};
use lectern_core::{AppError, PaginationMeta};
use lectern_models::{
    Course, CreateEnrollmentDto, Enrollment, EnrollmentDetail, EnrollmentFilterParams,
    EnrollmentId, PaginatedEnrollmentsResponse, UpdateEnrollmentDto, UserRole,
};
use lectern_observability::{track_enrollment_created, track_enrollment_transition};

const ENROLLMENT_DETAIL: &str = "SELECT e.*, c.code AS course_code, c.title AS course_title, \
     (u.first_name || ' ' || u.last_name) AS student_name \
     FROM enrollments e \
     JOIN courses c ON c.id = e.course_id \
     JOIN users u ON u.id = e.student_id";

pub struct EnrollmentService;

fn push_enrollment_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    caller: &Caller,
    filters: &EnrollmentFilterParams,
) {
    qb.push(" WHERE ");
    visibility(caller, Entity::Enrollment).push_sql(qb);

    if let Some(course_id) = filters.course_id {
        qb.push(" AND e.course_id = ").push_bind(course_id);
    }
    if let Some(student_id) = filters.student_id {
        qb.push(" AND e.student_id = ").push_bind(student_id);
    }
    if let Some(status) = filters.status {
        qb.push(" AND e.status = ").push_bind(status);
    }
}

impl EnrollmentService {
    #[instrument(skip(db))]
    pub async fn find_visible(
        db: &PgPool,
        caller: &Caller,
        id: EnrollmentId,
    ) -> Result<Enrollment, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT e.* FROM enrollments e WHERE e.id = ");
        qb.push_bind(id).push(" AND ");
        visibility(caller, Entity::Enrollment).push_sql(&mut qb);

        qb.build_query_as::<Enrollment>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Enrollment not found")))
    }

    /// Students enroll themselves; admins may enroll any student.
    ///
    /// The course row is locked for the duplicate and capacity checks, and the
    /// `(student, course)` unique constraint backs the duplicate check, so
    /// concurrent attempts never overfill a course or leave two rows.
    #[instrument(skip(db))]
    pub async fn create_enrollment(
        db: &PgPool,
        caller: &Caller,
        dto: CreateEnrollmentDto,
    ) -> Result<Enrollment, AppError> {
        let student_id = dto.student_id.unwrap_or(caller.id);

        let allowed = caller.is_admin() || (caller.is_student() && student_id == caller.id);
        if !allowed {
            return Err(AppError::forbidden(
                "Students may only enroll themselves; admins may enroll any student",
            ));
        }

        let role = sqlx::query_scalar::<_, UserRole>("SELECT role FROM users WHERE id = $1")
            .bind(student_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))?;
        if role != UserRole::Student {
            return Err(AppError::validation("Only students can be enrolled in a course"));
        }

        let mut tx = db.begin().await?;

        // Row lock serializes concurrent enrollments into the same course.
        let course =
            sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1 FOR UPDATE")
                .bind(dto.course_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Course not found")))?;

        let already_enrolled = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE student_id = $1 AND course_id = $2)",
        )
        .bind(student_id)
        .bind(course.id)
        .fetch_one(&mut *tx)
        .await?;
        if already_enrolled {
            return Err(AppError::duplicate_enrollment());
        }

        if !course.is_active {
            return Err(AppError::validation("Course is not accepting enrollments"));
        }

        let enrolled = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM enrollments WHERE course_id = $1 AND status = 'enrolled'",
        )
        .bind(course.id)
        .fetch_one(&mut *tx)
        .await?;
        if enrolled >= i64::from(course.max_students) {
            return Err(AppError::validation("Course is full"));
        }

        let enrollment = sqlx::query_as::<_, Enrollment>(
            "INSERT INTO enrollments (student_id, course_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(student_id)
        .bind(course.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::duplicate_enrollment();
            }
            AppError::from(e)
        })?;

        tx.commit().await?;

        track_enrollment_created();
        tracing::info!(enrollment_id = %enrollment.id, "Student enrolled");

        Ok(enrollment)
    }

    #[instrument(skip(db))]
    pub async fn list_enrollments(
        db: &PgPool,
        caller: &Caller,
        filters: EnrollmentFilterParams,
    ) -> Result<PaginatedEnrollmentsResponse, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM enrollments e");
        push_enrollment_filters(&mut count, caller, &filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new(ENROLLMENT_DETAIL);
        push_enrollment_filters(&mut query, caller, &filters);
        query
            .push(" ORDER BY e.enrolled_at DESC, e.id LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());
        let enrollments = query.build_query_as::<EnrollmentDetail>().fetch_all(db).await?;

        Ok(PaginatedEnrollmentsResponse {
            data: enrollments,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_enrollment(
        db: &PgPool,
        caller: &Caller,
        id: EnrollmentId,
    ) -> Result<EnrollmentDetail, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(ENROLLMENT_DETAIL);
        qb.push(" WHERE e.id = ").push_bind(id).push(" AND ");
        visibility(caller, Entity::Enrollment).push_sql(&mut qb);

        qb.build_query_as::<EnrollmentDetail>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Enrollment not found")))
    }

    /// Status changes follow the enrollment state machine; results are admin-only.
    #[instrument(skip(db, dto))]
    pub async fn update_enrollment(
        db: &PgPool,
        caller: &Caller,
        id: EnrollmentId,
        dto: UpdateEnrollmentDto,
    ) -> Result<Enrollment, AppError> {
        let existing = Self::find_visible(db, caller, id).await?;
        authorize_mutation(caller, &existing)?;

        if dto.touches_results() && !caller.is_admin() {
            return Err(AppError::forbidden("Only admins can set grades or progress"));
        }

        let status = match dto.status {
            Some(next) => existing.status.transition_to(next)?,
            None => existing.status,
        };

        let updated = sqlx::query_as::<_, Enrollment>(
            r#"UPDATE enrollments
               SET status = $3,
                   grade = COALESCE($4, grade),
                   progress = COALESCE($5, progress),
                   final_grade = COALESCE($6, final_grade),
                   updated_at = NOW()
               WHERE id = $1 AND status = $2
               RETURNING *"#,
        )
        .bind(id)
        .bind(existing.status)
        .bind(status)
        .bind(&dto.grade)
        .bind(dto.progress)
        .bind(dto.final_grade)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::conflict("Enrollment was modified concurrently, please retry"))?;

        if existing.status != status {
            track_enrollment_transition(existing.status.as_str(), status.as_str());
            tracing::info!(
                enrollment_id = %id,
                from = %existing.status,
                to = %status,
                "Enrollment status changed"
            );
        }

        Ok(updated)
    }

    #[instrument(skip(db))]
    pub async fn delete_enrollment(
        db: &PgPool,
        caller: &Caller,
        id: EnrollmentId,
    ) -> Result<(), AppError> {
        Self::find_visible(db, caller, id).await?;
        caller.require_role(UserRole::Admin)?;

        sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }
}
