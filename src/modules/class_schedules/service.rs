use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use lectern_access::{Caller, Entity, authorize_mutation, visibility};
use lectern_core::{AppError, PaginationMeta};
use lectern_models::{
    ClassSchedule, ClassScheduleFilterParams, ClassScheduleId, Course, CreateClassScheduleDto,
    PaginatedClassSchedulesResponse, UpdateClassScheduleDto, UserRole,
};

pub struct ClassScheduleService;

fn push_schedule_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    caller: &Caller,
    filters: &ClassScheduleFilterParams,
) {
    qb.push(" WHERE ");
    visibility(caller, Entity::ClassSchedule).push_sql(qb);

    if let Some(course_id) = filters.course_id {
        qb.push(" AND cs.course_id = ").push_bind(course_id);
    }
    if let Some(class_type) = filters.class_type {
        qb.push(" AND cs.class_type = ").push_bind(class_type);
    }
    if filters.upcoming == Some(true) {
        qb.push(" AND cs.scheduled_date >= NOW()");
    }
}

impl ClassScheduleService {
    #[instrument(skip(db))]
    pub async fn find_visible(
        db: &PgPool,
        caller: &Caller,
        id: ClassScheduleId,
    ) -> Result<ClassSchedule, AppError> {
        let mut qb =
            QueryBuilder::<Postgres>::new("SELECT cs.* FROM class_schedules cs WHERE cs.id = ");
        qb.push_bind(id).push(" AND ");
        visibility(caller, Entity::ClassSchedule).push_sql(&mut qb);

        qb.build_query_as::<ClassSchedule>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Class schedule not found")))
    }

    #[instrument(skip(db, dto), fields(course_id = %dto.course_id))]
    pub async fn create_schedule(
        db: &PgPool,
        caller: &Caller,
        dto: CreateClassScheduleDto,
    ) -> Result<ClassSchedule, AppError> {
        caller.require_any_role(&[UserRole::Admin, UserRole::Tutor])?;

        let course = sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
            .bind(dto.course_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Course not found")))?;

        if !caller.is_admin() && course.tutor_id != Some(caller.id) {
            return Err(AppError::forbidden(
                "You can only schedule classes for courses you teach",
            ));
        }
        let tutor_id = course
            .tutor_id
            .ok_or_else(|| AppError::validation("Course has no tutor assigned"))?;

        let schedule = sqlx::query_as::<_, ClassSchedule>(
            r#"INSERT INTO class_schedules
                   (course_id, tutor_id, title, description, scheduled_date, duration_minutes,
                    meeting_link, attendance_tracking, class_type)
               VALUES ($1, $2, $3, $4, $5, COALESCE($6, 60), $7, COALESCE($8, TRUE), $9)
               RETURNING *"#,
        )
        .bind(course.id)
        .bind(tutor_id)
        .bind(dto.title.trim())
        .bind(&dto.description)
        .bind(dto.scheduled_date)
        .bind(dto.duration_minutes)
        .bind(&dto.meeting_link)
        .bind(dto.attendance_tracking)
        .bind(dto.class_type)
        .fetch_one(db)
        .await?;

        tracing::info!(schedule_id = %schedule.id, "Class scheduled");
        Ok(schedule)
    }

    #[instrument(skip(db))]
    pub async fn list_schedules(
        db: &PgPool,
        caller: &Caller,
        filters: ClassScheduleFilterParams,
    ) -> Result<PaginatedClassSchedulesResponse, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM class_schedules cs");
        push_schedule_filters(&mut count, caller, &filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT cs.* FROM class_schedules cs");
        push_schedule_filters(&mut query, caller, &filters);
        query
            .push(" ORDER BY cs.scheduled_date, cs.id LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());
        let schedules = query.build_query_as::<ClassSchedule>().fetch_all(db).await?;

        Ok(PaginatedClassSchedulesResponse {
            data: schedules,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db, dto))]
    pub async fn update_schedule(
        db: &PgPool,
        caller: &Caller,
        id: ClassScheduleId,
        dto: UpdateClassScheduleDto,
    ) -> Result<ClassSchedule, AppError> {
        let existing = Self::find_visible(db, caller, id).await?;
        authorize_mutation(caller, &existing)?;

        let schedule = sqlx::query_as::<_, ClassSchedule>(
            r#"UPDATE class_schedules
               SET title = COALESCE($2, title),
                   description = COALESCE($3, description),
                   scheduled_date = COALESCE($4, scheduled_date),
                   duration_minutes = COALESCE($5, duration_minutes),
                   meeting_link = COALESCE($6, meeting_link),
                   attendance_tracking = COALESCE($7, attendance_tracking),
                   class_type = COALESCE($8, class_type)
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(dto.title.as_deref().map(str::trim))
        .bind(&dto.description)
        .bind(dto.scheduled_date)
        .bind(dto.duration_minutes)
        .bind(&dto.meeting_link)
        .bind(dto.attendance_tracking)
        .bind(dto.class_type)
        .fetch_one(db)
        .await?;

        Ok(schedule)
    }

    #[instrument(skip(db))]
    pub async fn delete_schedule(
        db: &PgPool,
        caller: &Caller,
        id: ClassScheduleId,
    ) -> Result<(), AppError> {
        let existing = Self::find_visible(db, caller, id).await?;
        authorize_mutation(caller, &existing)?;

        sqlx::query("DELETE FROM class_schedules WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }
}
