use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use lectern_access::{Caller, Entity, authorize_mutation, visibility};
use lectern_core::{AppError, PaginationMeta};
use lectern_models::{
    Assignment, CreateSubmissionDto, GradeSubmissionDto, PaginatedSubmissionsResponse, Submission,
    SubmissionFilterParams, SubmissionId, SubmissionStatus, UpdateSubmissionDto, UserRole,
};
use lectern_observability::{track_submission_created, track_submission_graded};

use crate::modules::assignments::service::AssignmentService;

pub struct SubmissionService;

fn push_submission_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    caller: &Caller,
    filters: &SubmissionFilterParams,
) {
    qb.push(" WHERE ");
    visibility(caller, Entity::Submission).push_sql(qb);

    if let Some(assignment_id) = filters.assignment_id {
        qb.push(" AND s.assignment_id = ").push_bind(assignment_id);
    }
    if let Some(student_id) = filters.student_id {
        qb.push(" AND s.student_id = ").push_bind(student_id);
    }
    if let Some(status) = filters.status {
        qb.push(" AND s.status = ").push_bind(status);
    }
}

impl SubmissionService {
    #[instrument(skip(db))]
    pub async fn find_visible(
        db: &PgPool,
        caller: &Caller,
        id: SubmissionId,
    ) -> Result<Submission, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT s.* FROM submissions s WHERE s.id = ");
        qb.push_bind(id).push(" AND ");
        visibility(caller, Entity::Submission).push_sql(&mut qb);

        qb.build_query_as::<Submission>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Submission not found")))
    }

    /// Students hand in work for assignments they can see; one submission each.
    #[instrument(skip(db, dto), fields(assignment_id = %dto.assignment_id))]
    pub async fn create_submission(
        db: &PgPool,
        caller: &Caller,
        dto: CreateSubmissionDto,
    ) -> Result<Submission, AppError> {
        caller.require_role(UserRole::Student)?;

        let assignment = AssignmentService::find_visible(db, caller, dto.assignment_id).await?;
        let now = Utc::now();
        let status = SubmissionStatus::on_submit(assignment.due_date, now);

        let submission = sqlx::query_as::<_, Submission>(
            r#"INSERT INTO submissions (assignment_id, student_id, submitted_content, file_url, submitted_at, status)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(assignment.id)
        .bind(caller.id)
        .bind(&dto.submitted_content)
        .bind(&dto.file_url)
        .bind(now)
        .bind(status)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::duplicate_submission();
            }
            AppError::from(e)
        })?;

        track_submission_created(if status == SubmissionStatus::Late {
            "late"
        } else {
            "on_time"
        });
        tracing::info!(submission_id = %submission.id, ?status, "Submission received");

        Ok(submission)
    }

    #[instrument(skip(db))]
    pub async fn list_submissions(
        db: &PgPool,
        caller: &Caller,
        filters: SubmissionFilterParams,
    ) -> Result<PaginatedSubmissionsResponse, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM submissions s");
        push_submission_filters(&mut count, caller, &filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT s.* FROM submissions s");
        push_submission_filters(&mut query, caller, &filters);
        query
            .push(" ORDER BY s.submitted_at DESC, s.id LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());
        let submissions = query.build_query_as::<Submission>().fetch_all(db).await?;

        Ok(PaginatedSubmissionsResponse {
            data: submissions,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    /// Content edits are only possible until the work is graded.
    #[instrument(skip(db, dto))]
    pub async fn update_submission(
        db: &PgPool,
        caller: &Caller,
        id: SubmissionId,
        dto: UpdateSubmissionDto,
    ) -> Result<Submission, AppError> {
        let existing = Self::find_visible(db, caller, id).await?;
        authorize_mutation(caller, &existing)?;

        if existing.is_graded() {
            return Err(AppError::validation("Graded submissions cannot be edited"));
        }

        sqlx::query_as::<_, Submission>(
            r#"UPDATE submissions
               SET submitted_content = COALESCE($2, submitted_content),
                   file_url = COALESCE($3, file_url)
               WHERE id = $1 AND grade IS NULL
               RETURNING *"#,
        )
        .bind(id)
        .bind(&dto.submitted_content)
        .bind(&dto.file_url)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::validation("Graded submissions cannot be edited"))
    }

    /// Grades a submission in a single statement so grade, feedback, grader,
    /// timestamp and status change together or not at all.
    #[instrument(skip(db, dto))]
    pub async fn grade_submission(
        db: &PgPool,
        caller: &Caller,
        id: SubmissionId,
        dto: GradeSubmissionDto,
    ) -> Result<Submission, AppError> {
        caller.require_role(UserRole::Tutor)?;
        let submission = Self::find_visible(db, caller, id).await?;

        let assignment = sqlx::query_as::<_, Assignment>("SELECT * FROM assignments WHERE id = $1")
            .bind(submission.assignment_id)
            .fetch_one(db)
            .await?;
        if assignment.tutor_id != caller.id {
            return Err(AppError::forbidden("Only the assignment's tutor can grade it"));
        }

        let grade = dto.checked_grade(assignment.max_points)?;

        let graded = sqlx::query_as::<_, Submission>(
            r#"UPDATE submissions
               SET grade = $2,
                   feedback = $3,
                   graded_by = $4,
                   graded_at = NOW(),
                   status = 'graded'
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(grade)
        .bind(&dto.feedback)
        .bind(caller.id)
        .fetch_one(db)
        .await?;

        track_submission_graded();
        tracing::info!(submission_id = %id, grade, "Submission graded");

        Ok(graded)
    }

    #[instrument(skip(db))]
    pub async fn delete_submission(
        db: &PgPool,
        caller: &Caller,
        id: SubmissionId,
    ) -> Result<(), AppError> {
        let existing = Self::find_visible(db, caller, id).await?;
        authorize_mutation(caller, &existing)?;

        sqlx::query("DELETE FROM submissions WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }
}
