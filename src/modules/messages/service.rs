use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use lectern_access::{Caller, Entity, authorize_mutation, visibility};
use lectern_core::{AppError, PaginationMeta};
use lectern_models::{
    Message, MessageFilterParams, MessageFolder, MessageId, PaginatedMessagesResponse,
    SendMessageDto,
};
use lectern_observability::track_message_sent;

pub struct MessageService;

fn push_message_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    caller: &Caller,
    filters: &MessageFilterParams,
) {
    qb.push(" WHERE ");
    visibility(caller, Entity::Message).push_sql(qb);

    match filters.folder.unwrap_or_default() {
        MessageFolder::All => {}
        MessageFolder::Inbox => {
            qb.push(" AND m.receiver_id = ").push_bind(caller.id);
        }
        MessageFolder::Sent => {
            qb.push(" AND m.sender_id = ").push_bind(caller.id);
        }
    }
    if let Some(is_read) = filters.is_read {
        qb.push(" AND m.is_read = ").push_bind(is_read);
    }
}

impl MessageService {
    #[instrument(skip(db))]
    pub async fn find_visible(
        db: &PgPool,
        caller: &Caller,
        id: MessageId,
    ) -> Result<Message, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT m.* FROM messages m WHERE m.id = ");
        qb.push_bind(id).push(" AND ");
        visibility(caller, Entity::Message).push_sql(&mut qb);

        qb.build_query_as::<Message>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Message not found")))
    }

    #[instrument(skip(db, dto), fields(receiver = %dto.receiver_id))]
    pub async fn send_message(
        db: &PgPool,
        caller: &Caller,
        dto: SendMessageDto,
    ) -> Result<Message, AppError> {
        if dto.receiver_id == caller.id {
            return Err(AppError::validation("You cannot send a message to yourself"));
        }

        let receiver_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(dto.receiver_id)
                .fetch_one(db)
                .await?;
        if !receiver_exists {
            return Err(AppError::not_found(anyhow::anyhow!("Recipient not found")));
        }

        if let Some(parent_id) = dto.parent_message_id {
            Self::find_visible(db, caller, parent_id).await?;
        }

        let message = sqlx::query_as::<_, Message>(
            r#"INSERT INTO messages
                   (sender_id, receiver_id, subject, content, message_type, parent_message_id, course_id, assignment_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(caller.id)
        .bind(dto.receiver_id)
        .bind(dto.subject.trim())
        .bind(&dto.content)
        .bind(dto.message_type)
        .bind(dto.parent_message_id)
        .bind(dto.course_id)
        .bind(dto.assignment_id)
        .fetch_one(db)
        .await?;

        track_message_sent();
        Ok(message)
    }

    #[instrument(skip(db))]
    pub async fn list_messages(
        db: &PgPool,
        caller: &Caller,
        filters: MessageFilterParams,
    ) -> Result<PaginatedMessagesResponse, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM messages m");
        push_message_filters(&mut count, caller, &filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT m.* FROM messages m");
        push_message_filters(&mut query, caller, &filters);
        query
            .push(" ORDER BY m.sent_at DESC, m.id LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());
        let messages = query.build_query_as::<Message>().fetch_all(db).await?;

        Ok(PaginatedMessagesResponse {
            data: messages,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    /// Only the receiver can mark a message as read.
    #[instrument(skip(db))]
    pub async fn mark_read(db: &PgPool, caller: &Caller, id: MessageId) -> Result<Message, AppError> {
        let existing = Self::find_visible(db, caller, id).await?;
        if existing.receiver_id != caller.id {
            return Err(AppError::forbidden(
                "Only the receiver can mark a message as read",
            ));
        }

        let message = sqlx::query_as::<_, Message>(
            r#"UPDATE messages
               SET is_read = TRUE, read_at = COALESCE(read_at, NOW())
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(message)
    }

    #[instrument(skip(db))]
    pub async fn delete_message(db: &PgPool, caller: &Caller, id: MessageId) -> Result<(), AppError> {
        let existing = Self::find_visible(db, caller, id).await?;
        authorize_mutation(caller, &existing)?;

        sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }
}
