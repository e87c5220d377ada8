use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use lectern_access::{Caller, Entity, authorize_mutation, visibility};
use lectern_core::{AppError, LIKE_ESCAPE, PaginationMeta, contains_pattern};
use lectern_models::{
    Assignment, AssignmentFilterParams, AssignmentId, Course, CreateAssignmentDto,
    PaginatedAssignmentsResponse, UpdateAssignmentDto, UserRole,
};

pub struct AssignmentService;

fn push_assignment_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    caller: &Caller,
    filters: &AssignmentFilterParams,
) {
    qb.push(" WHERE ");
    visibility(caller, Entity::Assignment).push_sql(qb);

    if let Some(course_id) = filters.course_id {
        qb.push(" AND a.course_id = ").push_bind(course_id);
    }
    if let Some(assignment_type) = filters.assignment_type {
        qb.push(" AND a.assignment_type = ").push_bind(assignment_type);
    }
    if let Some(search) = &filters.search {
        qb.push(" AND a.title ILIKE ")
            .push_bind(contains_pattern(search))
            .push(LIKE_ESCAPE);
    }
}

impl AssignmentService {
    #[instrument(skip(db))]
    pub async fn find_visible(
        db: &PgPool,
        caller: &Caller,
        id: AssignmentId,
    ) -> Result<Assignment, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT a.* FROM assignments a WHERE a.id = ");
        qb.push_bind(id).push(" AND ");
        visibility(caller, Entity::Assignment).push_sql(&mut qb);

        qb.build_query_as::<Assignment>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Assignment not found")))
    }

    /// The assignment is owned by the course's tutor, even when an admin sets it.
    #[instrument(skip(db, dto), fields(course_id = %dto.course_id))]
    pub async fn create_assignment(
        db: &PgPool,
        caller: &Caller,
        dto: CreateAssignmentDto,
    ) -> Result<Assignment, AppError> {
        caller.require_any_role(&[UserRole::Admin, UserRole::Tutor])?;

        let course = sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
            .bind(dto.course_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Course not found")))?;

        if !caller.is_admin() && course.tutor_id != Some(caller.id) {
            return Err(AppError::forbidden(
                "You can only create assignments for courses you teach",
            ));
        }
        let tutor_id = course
            .tutor_id
            .ok_or_else(|| AppError::validation("Course has no tutor assigned"))?;

        let assignment = sqlx::query_as::<_, Assignment>(
            r#"INSERT INTO assignments
                   (course_id, tutor_id, title, description, due_date, max_points,
                    assignment_type, attachment_url, instructions)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING *"#,
        )
        .bind(course.id)
        .bind(tutor_id)
        .bind(dto.title.trim())
        .bind(&dto.description)
        .bind(dto.due_date)
        .bind(dto.max_points)
        .bind(dto.assignment_type)
        .bind(&dto.attachment_url)
        .bind(&dto.instructions)
        .fetch_one(db)
        .await?;

        tracing::info!(assignment_id = %assignment.id, "Assignment created");
        Ok(assignment)
    }

    #[instrument(skip(db))]
    pub async fn list_assignments(
        db: &PgPool,
        caller: &Caller,
        filters: AssignmentFilterParams,
    ) -> Result<PaginatedAssignmentsResponse, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM assignments a");
        push_assignment_filters(&mut count, caller, &filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT a.* FROM assignments a");
        push_assignment_filters(&mut query, caller, &filters);
        query
            .push(" ORDER BY a.due_date, a.id LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());
        let assignments = query.build_query_as::<Assignment>().fetch_all(db).await?;

        Ok(PaginatedAssignmentsResponse {
            data: assignments,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db, dto))]
    pub async fn update_assignment(
        db: &PgPool,
        caller: &Caller,
        id: AssignmentId,
        dto: UpdateAssignmentDto,
    ) -> Result<Assignment, AppError> {
        let existing = Self::find_visible(db, caller, id).await?;
        authorize_mutation(caller, &existing)?;

        let assignment = sqlx::query_as::<_, Assignment>(
            r#"UPDATE assignments
               SET title = COALESCE($2, title),
                   description = COALESCE($3, description),
                   due_date = COALESCE($4, due_date),
                   max_points = COALESCE($5, max_points),
                   assignment_type = COALESCE($6, assignment_type),
                   attachment_url = COALESCE($7, attachment_url),
                   instructions = COALESCE($8, instructions),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(dto.title.as_deref().map(str::trim))
        .bind(&dto.description)
        .bind(dto.due_date)
        .bind(dto.max_points)
        .bind(dto.assignment_type)
        .bind(&dto.attachment_url)
        .bind(&dto.instructions)
        .fetch_one(db)
        .await?;

        Ok(assignment)
    }

    #[instrument(skip(db))]
    pub async fn delete_assignment(
        db: &PgPool,
        caller: &Caller,
        id: AssignmentId,
    ) -> Result<(), AppError> {
        let existing = Self::find_visible(db, caller, id).await?;
        authorize_mutation(caller, &existing)?;

        sqlx::query("DELETE FROM assignments WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        tracing::info!(assignment_id = %id, "Assignment deleted");
        Ok(())
    }
}
