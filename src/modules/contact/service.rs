use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use lectern_core::{AppError, PaginationMeta};
use lectern_models::{
    ContactMessage, ContactMessageFilterParams, ContactMessageId, CreateContactMessageDto,
    PaginatedContactMessagesResponse, UpdateContactMessageDto,
};

pub struct ContactService;

fn push_contact_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &ContactMessageFilterParams) {
    qb.push(" WHERE TRUE");
    if let Some(is_read) = filters.is_read {
        qb.push(" AND is_read = ").push_bind(is_read);
    }
    if let Some(replied) = filters.replied {
        qb.push(" AND replied = ").push_bind(replied);
    }
}

impl ContactService {
    #[instrument(skip(db, dto))]
    pub async fn create_message(
        db: &PgPool,
        dto: CreateContactMessageDto,
    ) -> Result<ContactMessage, AppError> {
        let message = sqlx::query_as::<_, ContactMessage>(
            r#"INSERT INTO contact_messages (name, email, subject, message)
               VALUES ($1, $2, $3, $4)
               RETURNING *"#,
        )
        .bind(dto.name.trim())
        .bind(dto.email.trim().to_lowercase())
        .bind(dto.subject.trim())
        .bind(&dto.message)
        .fetch_one(db)
        .await?;

        tracing::info!(contact_id = %message.id, "Contact message received");
        Ok(message)
    }

    #[instrument(skip(db))]
    pub async fn list_messages(
        db: &PgPool,
        filters: ContactMessageFilterParams,
    ) -> Result<PaginatedContactMessagesResponse, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM contact_messages");
        push_contact_filters(&mut count, &filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM contact_messages");
        push_contact_filters(&mut query, &filters);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());
        let messages = query.build_query_as::<ContactMessage>().fetch_all(db).await?;

        Ok(PaginatedContactMessagesResponse {
            data: messages,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn update_message(
        db: &PgPool,
        id: ContactMessageId,
        dto: UpdateContactMessageDto,
    ) -> Result<ContactMessage, AppError> {
        sqlx::query_as::<_, ContactMessage>(
            r#"UPDATE contact_messages
               SET is_read = COALESCE($2, is_read),
                   replied = COALESCE($3, replied)
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(dto.is_read)
        .bind(dto.replied)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Contact message not found")))
    }

    #[instrument(skip(db))]
    pub async fn delete_message(db: &PgPool, id: ContactMessageId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Contact message not found")));
        }

        Ok(())
    }
}
