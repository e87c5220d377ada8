use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use lectern_access::Caller;
use lectern_core::{AppError, LIKE_ESCAPE, PaginationMeta, contains_pattern};
use lectern_models::{
    ContentFilterParams, CreateEventDto, Event, EventId, PaginatedEventsResponse, UpdateEventDto,
    UserRole,
};

pub struct EventService;

fn push_event_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    is_admin: bool,
    filters: &ContentFilterParams,
) {
    if is_admin {
        qb.push(" WHERE TRUE");
        if let Some(published) = filters.published {
            qb.push(" AND published = ").push_bind(published);
        }
    } else {
        qb.push(" WHERE published");
    }

    if let Some(search) = &filters.search {
        let pattern = contains_pattern(search);
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(LIKE_ESCAPE)
            .push(" OR content ILIKE ")
            .push_bind(pattern.clone())
            .push(LIKE_ESCAPE)
            .push(" OR location ILIKE ")
            .push_bind(pattern)
            .push(LIKE_ESCAPE)
            .push(")");
    }
}

impl EventService {
    #[instrument(skip(db))]
    pub async fn list_events(
        db: &PgPool,
        caller: Option<&Caller>,
        filters: ContentFilterParams,
    ) -> Result<PaginatedEventsResponse, AppError> {
        let is_admin = caller.is_some_and(Caller::is_admin);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM events");
        push_event_filters(&mut count, is_admin, &filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM events");
        push_event_filters(&mut query, is_admin, &filters);
        query
            .push(" ORDER BY event_date DESC NULLS LAST, created_at DESC LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());
        let events = query.build_query_as::<Event>().fetch_all(db).await?;

        Ok(PaginatedEventsResponse {
            data: events,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_event(
        db: &PgPool,
        caller: Option<&Caller>,
        id: EventId,
    ) -> Result<Event, AppError> {
        let is_admin = caller.is_some_and(Caller::is_admin);

        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 AND (published OR $2)")
            .bind(id)
            .bind(is_admin)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Event not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn create_event(
        db: &PgPool,
        caller: &Caller,
        dto: CreateEventDto,
    ) -> Result<Event, AppError> {
        caller.require_role(UserRole::Admin)?;

        let event = sqlx::query_as::<_, Event>(
            r#"INSERT INTO events (title, content, video_id, event_date, location, published)
               VALUES ($1, $2, $3, $4, $5, COALESCE($6, TRUE))
               RETURNING *"#,
        )
        .bind(dto.title.trim())
        .bind(&dto.content)
        .bind(&dto.video_id)
        .bind(dto.event_date)
        .bind(&dto.location)
        .bind(dto.published)
        .fetch_one(db)
        .await?;

        Ok(event)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_event(
        db: &PgPool,
        caller: &Caller,
        id: EventId,
        dto: UpdateEventDto,
    ) -> Result<Event, AppError> {
        caller.require_role(UserRole::Admin)?;

        sqlx::query_as::<_, Event>(
            r#"UPDATE events
               SET title = COALESCE($2, title),
                   content = COALESCE($3, content),
                   video_id = COALESCE($4, video_id),
                   event_date = COALESCE($5, event_date),
                   location = COALESCE($6, location),
                   published = COALESCE($7, published),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(dto.title.as_deref().map(str::trim))
        .bind(&dto.content)
        .bind(&dto.video_id)
        .bind(dto.event_date)
        .bind(&dto.location)
        .bind(dto.published)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Event not found")))
    }

    #[instrument(skip(db))]
    pub async fn delete_event(db: &PgPool, caller: &Caller, id: EventId) -> Result<(), AppError> {
        caller.require_role(UserRole::Admin)?;

        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Event not found")));
        }

        Ok(())
    }
}
