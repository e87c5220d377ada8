use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use lectern_access::{Caller, Entity, authorize_mutation, visibility};
use lectern_core::{AppError, PaginationMeta};
use lectern_models::{
    Attendance, AttendanceFilterParams, AttendanceId, ClassSchedule, ClassScheduleId,
    PaginatedAttendanceResponse, RecordAttendanceDto, UpdateAttendanceDto,
};
use lectern_observability::track_attendance_recorded;

use crate::modules::class_schedules::service::ClassScheduleService;

pub struct AttendanceService;

fn push_attendance_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    caller: &Caller,
    filters: &AttendanceFilterParams,
) {
    qb.push(" WHERE ");
    visibility(caller, Entity::Attendance).push_sql(qb);

    if let Some(schedule_id) = filters.class_schedule_id {
        qb.push(" AND att.class_schedule_id = ").push_bind(schedule_id);
    }
    if let Some(student_id) = filters.student_id {
        qb.push(" AND att.student_id = ").push_bind(student_id);
    }
    if let Some(status) = filters.status {
        qb.push(" AND att.status = ").push_bind(status);
    }
}

impl AttendanceService {
    #[instrument(skip(db))]
    pub async fn find_visible(
        db: &PgPool,
        caller: &Caller,
        id: AttendanceId,
    ) -> Result<Attendance, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT att.* FROM attendance att WHERE att.id = ");
        qb.push_bind(id).push(" AND ");
        visibility(caller, Entity::Attendance).push_sql(&mut qb);

        qb.build_query_as::<Attendance>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Attendance record not found")))
    }

    /// Attendance is written by whoever owns the session, so checks go through it.
    async fn authorize_session(
        db: &PgPool,
        caller: &Caller,
        schedule_id: ClassScheduleId,
    ) -> Result<ClassSchedule, AppError> {
        let schedule =
            sqlx::query_as::<_, ClassSchedule>("SELECT * FROM class_schedules WHERE id = $1")
                .bind(schedule_id)
                .fetch_one(db)
                .await?;
        authorize_mutation(caller, &schedule)?;
        Ok(schedule)
    }

    #[instrument(skip(db, dto))]
    pub async fn record_attendance(
        db: &PgPool,
        caller: &Caller,
        dto: RecordAttendanceDto,
    ) -> Result<Attendance, AppError> {
        let schedule = ClassScheduleService::find_visible(db, caller, dto.class_schedule_id).await?;
        authorize_mutation(caller, &schedule)?;

        if !schedule.attendance_tracking {
            return Err(AppError::validation(
                "Attendance tracking is disabled for this session",
            ));
        }

        let enrolled = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE student_id = $1 AND course_id = $2 AND status = 'enrolled')",
        )
        .bind(dto.student_id)
        .bind(schedule.course_id)
        .fetch_one(db)
        .await?;
        if !enrolled {
            return Err(AppError::validation("Student is not enrolled in this course"));
        }

        let attendance = sqlx::query_as::<_, Attendance>(
            r#"INSERT INTO attendance (class_schedule_id, student_id, status, notes)
               VALUES ($1, $2, $3, $4)
               RETURNING *"#,
        )
        .bind(schedule.id)
        .bind(dto.student_id)
        .bind(dto.status)
        .bind(&dto.notes)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict("Attendance already recorded for this student");
            }
            AppError::from(e)
        })?;

        track_attendance_recorded(attendance.status.as_str());

        Ok(attendance)
    }

    #[instrument(skip(db))]
    pub async fn list_attendance(
        db: &PgPool,
        caller: &Caller,
        filters: AttendanceFilterParams,
    ) -> Result<PaginatedAttendanceResponse, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM attendance att");
        push_attendance_filters(&mut count, caller, &filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT att.* FROM attendance att");
        push_attendance_filters(&mut query, caller, &filters);
        query
            .push(" ORDER BY att.attended_at DESC, att.id LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());
        let records = query.build_query_as::<Attendance>().fetch_all(db).await?;

        Ok(PaginatedAttendanceResponse {
            data: records,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db, dto))]
    pub async fn update_attendance(
        db: &PgPool,
        caller: &Caller,
        id: AttendanceId,
        dto: UpdateAttendanceDto,
    ) -> Result<Attendance, AppError> {
        let existing = Self::find_visible(db, caller, id).await?;
        Self::authorize_session(db, caller, existing.class_schedule_id).await?;

        let attendance = sqlx::query_as::<_, Attendance>(
            r#"UPDATE attendance
               SET status = COALESCE($2, status),
                   notes = COALESCE($3, notes)
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(dto.status)
        .bind(&dto.notes)
        .fetch_one(db)
        .await?;

        Ok(attendance)
    }

    #[instrument(skip(db))]
    pub async fn delete_attendance(
        db: &PgPool,
        caller: &Caller,
        id: AttendanceId,
    ) -> Result<(), AppError> {
        let existing = Self::find_visible(db, caller, id).await?;
        Self::authorize_session(db, caller, existing.class_schedule_id).await?;

        sqlx::query("DELETE FROM attendance WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }
}
