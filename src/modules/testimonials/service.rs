use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use lectern_access::Caller;
use lectern_core::{AppError, PaginationMeta};
use lectern_models::{
    CreateTestimonialDto, PaginatedTestimonialsResponse, Testimonial, TestimonialFilterParams,
    TestimonialId, UpdateTestimonialDto, UserRole,
};

pub struct TestimonialService;

fn push_testimonial_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    is_admin: bool,
    filters: &TestimonialFilterParams,
) {
    if !is_admin {
        qb.push(" WHERE approved");
        return;
    }

    qb.push(" WHERE TRUE");
    if let Some(approved) = filters.approved {
        qb.push(" AND approved = ").push_bind(approved);
    }
}

impl TestimonialService {
    #[instrument(skip(db))]
    pub async fn list_testimonials(
        db: &PgPool,
        caller: Option<&Caller>,
        filters: TestimonialFilterParams,
    ) -> Result<PaginatedTestimonialsResponse, AppError> {
        let is_admin = caller.is_some_and(Caller::is_admin);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM testimonials");
        push_testimonial_filters(&mut count, is_admin, &filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM testimonials");
        push_testimonial_filters(&mut query, is_admin, &filters);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());
        let testimonials = query.build_query_as::<Testimonial>().fetch_all(db).await?;

        Ok(PaginatedTestimonialsResponse {
            data: testimonials,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    /// Anyone may submit; submissions wait for admin approval.
    #[instrument(skip(db, dto))]
    pub async fn submit_testimonial(
        db: &PgPool,
        caller: Option<&Caller>,
        dto: CreateTestimonialDto,
    ) -> Result<Testimonial, AppError> {
        let testimonial = sqlx::query_as::<_, Testimonial>(
            r#"INSERT INTO testimonials (content, author, author_title, image_url, email, submitted_by, approved)
               VALUES ($1, $2, $3, $4, $5, $6, FALSE)
               RETURNING *"#,
        )
        .bind(&dto.content)
        .bind(dto.author.trim())
        .bind(dto.author_title.trim())
        .bind(&dto.image_url)
        .bind(&dto.email)
        .bind(caller.map(|c| c.id))
        .fetch_one(db)
        .await?;

        tracing::info!(testimonial_id = %testimonial.id, "Testimonial submitted for review");
        Ok(testimonial)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_testimonial(
        db: &PgPool,
        caller: &Caller,
        id: TestimonialId,
        dto: UpdateTestimonialDto,
    ) -> Result<Testimonial, AppError> {
        caller.require_role(UserRole::Admin)?;

        sqlx::query_as::<_, Testimonial>(
            r#"UPDATE testimonials
               SET content = COALESCE($2, content),
                   author = COALESCE($3, author),
                   author_title = COALESCE($4, author_title),
                   image_url = COALESCE($5, image_url),
                   approved = COALESCE($6, approved),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&dto.content)
        .bind(dto.author.as_deref().map(str::trim))
        .bind(dto.author_title.as_deref().map(str::trim))
        .bind(&dto.image_url)
        .bind(dto.approved)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Testimonial not found")))
    }

    #[instrument(skip(db))]
    pub async fn delete_testimonial(
        db: &PgPool,
        caller: &Caller,
        id: TestimonialId,
    ) -> Result<(), AppError> {
        caller.require_role(UserRole::Admin)?;

        let result = sqlx::query("DELETE FROM testimonials WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Testimonial not found")));
        }

        Ok(())
    }
}
