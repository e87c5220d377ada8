use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use lectern_access::Caller;
use lectern_core::{AppError, LIKE_ESCAPE, PaginationMeta, contains_pattern};
use lectern_models::{
    ContentFilterParams, CreateNewsDto, News, NewsId, PaginatedNewsResponse, UpdateNewsDto,
    UserRole,
};

pub struct NewsService;

/// Non-admins only ever see published articles.
fn push_news_filters(
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
            .push_bind(pattern)
            .push(LIKE_ESCAPE)
            .push(")");
    }
}

impl NewsService {
    #[instrument(skip(db))]
    pub async fn list_news(
        db: &PgPool,
        caller: Option<&Caller>,
        filters: ContentFilterParams,
    ) -> Result<PaginatedNewsResponse, AppError> {
        let is_admin = caller.is_some_and(Caller::is_admin);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM news");
        push_news_filters(&mut count, is_admin, &filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM news");
        push_news_filters(&mut query, is_admin, &filters);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());
        let news = query.build_query_as::<News>().fetch_all(db).await?;

        Ok(PaginatedNewsResponse {
            data: news,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_news(
        db: &PgPool,
        caller: Option<&Caller>,
        id: NewsId,
    ) -> Result<News, AppError> {
        let is_admin = caller.is_some_and(Caller::is_admin);

        sqlx::query_as::<_, News>("SELECT * FROM news WHERE id = $1 AND (published OR $2)")
            .bind(id)
            .bind(is_admin)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("News article not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn create_news(
        db: &PgPool,
        caller: &Caller,
        dto: CreateNewsDto,
    ) -> Result<News, AppError> {
        caller.require_role(UserRole::Admin)?;

        let news = sqlx::query_as::<_, News>(
            r#"INSERT INTO news (title, content, image_url, author_id, published)
               VALUES ($1, $2, $3, $4, COALESCE($5, TRUE))
               RETURNING *"#,
        )
        .bind(dto.title.trim())
        .bind(&dto.content)
        .bind(&dto.image_url)
        .bind(caller.id)
        .bind(dto.published)
        .fetch_one(db)
        .await?;

        Ok(news)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_news(
        db: &PgPool,
        caller: &Caller,
        id: NewsId,
        dto: UpdateNewsDto,
    ) -> Result<News, AppError> {
        caller.require_role(UserRole::Admin)?;

        sqlx::query_as::<_, News>(
            r#"UPDATE news
               SET title = COALESCE($2, title),
                   content = COALESCE($3, content),
                   image_url = COALESCE($4, image_url),
                   published = COALESCE($5, published),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(dto.title.as_deref().map(str::trim))
        .bind(&dto.content)
        .bind(&dto.image_url)
        .bind(dto.published)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("News article not found")))
    }

    #[instrument(skip(db))]
    pub async fn delete_news(db: &PgPool, caller: &Caller, id: NewsId) -> Result<(), AppError> {
        caller.require_role(UserRole::Admin)?;

        let result = sqlx::query("DELETE FROM news WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("News article not found")));
        }

        Ok(())
    }
}
