use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use lectern_access::{Caller, Entity, authorize_mutation, visibility};
use lectern_core::{AppError, PaginationMeta};
use lectern_models::{
    CreateNotificationDto, Notification, NotificationFilterParams, NotificationId,
    PaginatedNotificationsResponse, UserRole,
};

pub struct NotificationService;

fn push_notification_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    caller: &Caller,
    filters: &NotificationFilterParams,
) {
    qb.push(" WHERE ");
    visibility(caller, Entity::Notification).push_sql(qb);

    if let Some(is_read) = filters.is_read {
        qb.push(" AND n.is_read = ").push_bind(is_read);
    }
    if let Some(kind) = filters.notification_type {
        qb.push(" AND n.notification_type = ").push_bind(kind);
    }
}

impl NotificationService {
    #[instrument(skip(db))]
    pub async fn find_visible(
        db: &PgPool,
        caller: &Caller,
        id: NotificationId,
    ) -> Result<Notification, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT n.* FROM notifications n WHERE n.id = ");
        qb.push_bind(id).push(" AND ");
        visibility(caller, Entity::Notification).push_sql(&mut qb);

        qb.build_query_as::<Notification>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Notification not found")))
    }

    /// Lists the caller's own notifications together with their unread total.
    #[instrument(skip(db))]
    pub async fn list_notifications(
        db: &PgPool,
        caller: &Caller,
        filters: NotificationFilterParams,
    ) -> Result<PaginatedNotificationsResponse, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM notifications n");
        push_notification_filters(&mut count, caller, &filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT n.* FROM notifications n");
        push_notification_filters(&mut query, caller, &filters);
        query
            .push(" ORDER BY n.created_at DESC, n.id LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());
        let notifications = query.build_query_as::<Notification>().fetch_all(db).await?;

        let unread_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read",
        )
        .bind(caller.id)
        .fetch_one(db)
        .await?;

        Ok(PaginatedNotificationsResponse {
            data: notifications,
            meta: PaginationMeta::new(total, &filters.pagination),
            unread_count,
        })
    }

    #[instrument(skip(db, dto), fields(recipient = %dto.user_id))]
    pub async fn create_notification(
        db: &PgPool,
        caller: &Caller,
        dto: CreateNotificationDto,
    ) -> Result<Notification, AppError> {
        caller.require_any_role(&[UserRole::Admin, UserRole::Tutor])?;

        let recipient_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(dto.user_id)
                .fetch_one(db)
                .await?;
        if !recipient_exists {
            return Err(AppError::not_found(anyhow::anyhow!("Recipient not found")));
        }

        let notification = sqlx::query_as::<_, Notification>(
            r#"INSERT INTO notifications
                   (user_id, sender_id, notification_type, title, content, priority, course_id, assignment_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(dto.user_id)
        .bind(caller.id)
        .bind(dto.notification_type)
        .bind(dto.title.trim())
        .bind(&dto.content)
        .bind(dto.priority)
        .bind(dto.course_id)
        .bind(dto.assignment_id)
        .fetch_one(db)
        .await?;

        Ok(notification)
    }

    /// `is_read` and `read_at` always change together; re-reading keeps the first timestamp.
    #[instrument(skip(db))]
    pub async fn mark_read(
        db: &PgPool,
        caller: &Caller,
        id: NotificationId,
    ) -> Result<Notification, AppError> {
        let existing = Self::find_visible(db, caller, id).await?;
        authorize_mutation(caller, &existing)?;

        let notification = sqlx::query_as::<_, Notification>(
            r#"UPDATE notifications
               SET is_read = TRUE, read_at = COALESCE(read_at, NOW())
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(notification)
    }

    /// Returns how many notifications changed.
    #[instrument(skip(db))]
    pub async fn mark_all_read(db: &PgPool, caller: &Caller) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = NOW() WHERE user_id = $1 AND NOT is_read",
        )
        .bind(caller.id)
        .execute(db)
        .await?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(db))]
    pub async fn delete_notification(
        db: &PgPool,
        caller: &Caller,
        id: NotificationId,
    ) -> Result<(), AppError> {
        let existing = Self::find_visible(db, caller, id).await?;
        authorize_mutation(caller, &existing)?;

        sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }
}
