use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use lectern_access::Caller;
use lectern_core::{AppError, PaginationMeta};
use lectern_models::{
    Announcement, AnnouncementAudience, AnnouncementFilterParams, AnnouncementId,
    CreateAnnouncementDto, PaginatedAnnouncementsResponse, UpdateAnnouncementDto, UserRole,
};

pub struct AnnouncementService;

/// Admins see everything; everyone else sees live announcements addressed to
/// all or to their role.
fn push_audience(qb: &mut QueryBuilder<'_, Postgres>, caller: Option<&Caller>) {
    if caller.is_some_and(Caller::is_admin) {
        qb.push("TRUE");
        return;
    }

    qb.push("an.published AND (an.expires_at IS NULL OR an.expires_at > NOW()) AND (an.target_audience = 'all'");
    if let Some(audience) = caller
        .and_then(|c| c.role)
        .and_then(AnnouncementAudience::for_role)
    {
        qb.push(" OR an.target_audience = ").push_bind(audience);
    }
    qb.push(")");
}

fn push_announcement_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    caller: Option<&Caller>,
    filters: &AnnouncementFilterParams,
) {
    qb.push(" WHERE ");
    push_audience(qb, caller);
    if let Some(priority) = filters.priority {
        qb.push(" AND an.priority = ").push_bind(priority);
    }
}

impl AnnouncementService {
    #[instrument(skip(db))]
    pub async fn list_announcements(
        db: &PgPool,
        caller: Option<&Caller>,
        filters: AnnouncementFilterParams,
    ) -> Result<PaginatedAnnouncementsResponse, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM announcements an");
        push_announcement_filters(&mut count, caller, &filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT an.* FROM announcements an");
        push_announcement_filters(&mut query, caller, &filters);
        query
            .push(" ORDER BY an.created_at DESC LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());
        let announcements = query.build_query_as::<Announcement>().fetch_all(db).await?;

        Ok(PaginatedAnnouncementsResponse {
            data: announcements,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_announcement(
        db: &PgPool,
        caller: Option<&Caller>,
        id: AnnouncementId,
    ) -> Result<Announcement, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT an.* FROM announcements an WHERE an.id = ");
        qb.push_bind(id).push(" AND ");
        push_audience(&mut qb, caller);

        qb.build_query_as::<Announcement>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Announcement not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn create_announcement(
        db: &PgPool,
        caller: &Caller,
        dto: CreateAnnouncementDto,
    ) -> Result<Announcement, AppError> {
        caller.require_role(UserRole::Admin)?;

        let announcement = sqlx::query_as::<_, Announcement>(
            r#"INSERT INTO announcements (admin_id, title, content, target_audience, priority, published, expires_at)
               VALUES ($1, $2, $3, $4, $5, COALESCE($6, TRUE), $7)
               RETURNING *"#,
        )
        .bind(caller.id)
        .bind(dto.title.trim())
        .bind(&dto.content)
        .bind(dto.target_audience)
        .bind(dto.priority)
        .bind(dto.published)
        .bind(dto.expires_at)
        .fetch_one(db)
        .await?;

        tracing::info!(announcement_id = %announcement.id, "Announcement created");
        Ok(announcement)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_announcement(
        db: &PgPool,
        caller: &Caller,
        id: AnnouncementId,
        dto: UpdateAnnouncementDto,
    ) -> Result<Announcement, AppError> {
        caller.require_role(UserRole::Admin)?;

        sqlx::query_as::<_, Announcement>(
            r#"UPDATE announcements
               SET title = COALESCE($2, title),
                   content = COALESCE($3, content),
                   target_audience = COALESCE($4, target_audience),
                   priority = COALESCE($5, priority),
                   published = COALESCE($6, published),
                   expires_at = COALESCE($7, expires_at),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(dto.title.as_deref().map(str::trim))
        .bind(&dto.content)
        .bind(dto.target_audience)
        .bind(dto.priority)
        .bind(dto.published)
        .bind(dto.expires_at)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Announcement not found")))
    }

    #[instrument(skip(db))]
    pub async fn delete_announcement(
        db: &PgPool,
        caller: &Caller,
        id: AnnouncementId,
    ) -> Result<(), AppError> {
        caller.require_role(UserRole::Admin)?;

        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Announcement not found")));
        }

        Ok(())
    }
}
