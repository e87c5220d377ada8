use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use lectern_access::{Caller, Entity, visibility};
use lectern_core::{AppError, LIKE_ESCAPE, contains_pattern};
use lectern_models::{
    Course, Event, HomeContent, News, SearchResults, SiteStatistics, Testimonial,
    UpdateSiteStatisticsDto, UserRole,
};

const HOME_NEWS: i64 = 3;
const HOME_EVENTS: i64 = 3;
const HOME_TESTIMONIALS: i64 = 6;
const SEARCH_LIMIT: i64 = 10;

const STATISTICS_COLUMNS: &str = "active_students, courses, success_rate, tutors, updated_at";

pub struct SiteService;

impl SiteService {
    /// The statistics singleton, or all zeros before an admin has set it.
    #[instrument(skip(db))]
    pub async fn get_statistics(db: &PgPool) -> Result<SiteStatistics, AppError> {
        let stats = sqlx::query_as::<_, SiteStatistics>(&format!(
            "SELECT {STATISTICS_COLUMNS} FROM site_statistics WHERE id = 1"
        ))
        .fetch_optional(db)
        .await?;

        Ok(stats.unwrap_or_default())
    }

    #[instrument(skip(db, dto))]
    pub async fn update_statistics(
        db: &PgPool,
        caller: &Caller,
        dto: UpdateSiteStatisticsDto,
    ) -> Result<SiteStatistics, AppError> {
        caller.require_role(UserRole::Admin)?;

        let stats = sqlx::query_as::<_, SiteStatistics>(&format!(
            r#"INSERT INTO site_statistics (id, active_students, courses, success_rate, tutors)
               VALUES (1, COALESCE($1, 0), COALESCE($2, 0), COALESCE($3, 0), COALESCE($4, 0))
               ON CONFLICT (id) DO UPDATE
               SET active_students = COALESCE($1, site_statistics.active_students),
                   courses = COALESCE($2, site_statistics.courses),
                   success_rate = COALESCE($3, site_statistics.success_rate),
                   tutors = COALESCE($4, site_statistics.tutors),
                   updated_at = NOW()
               RETURNING {STATISTICS_COLUMNS}"#
        ))
        .bind(dto.active_students)
        .bind(dto.courses)
        .bind(dto.success_rate)
        .bind(dto.tutors)
        .fetch_one(db)
        .await?;

        tracing::info!("Site statistics updated");
        Ok(stats)
    }

    #[instrument(skip(db))]
    pub async fn home(db: &PgPool) -> Result<HomeContent, AppError> {
        let latest_news = sqlx::query_as::<_, News>(
            "SELECT * FROM news WHERE published ORDER BY created_at DESC LIMIT $1",
        )
        .bind(HOME_NEWS)
        .fetch_all(db)
        .await?;

        let upcoming_events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE published AND event_date >= NOW() ORDER BY event_date LIMIT $1",
        )
        .bind(HOME_EVENTS)
        .fetch_all(db)
        .await?;

        let testimonials = sqlx::query_as::<_, Testimonial>(
            "SELECT * FROM testimonials WHERE approved ORDER BY created_at DESC LIMIT $1",
        )
        .bind(HOME_TESTIMONIALS)
        .fetch_all(db)
        .await?;

        Ok(HomeContent {
            latest_news,
            upcoming_events,
            testimonials,
            statistics: Self::get_statistics(db).await?,
        })
    }

    /// Case-insensitive substring search over courses, news and events.
    ///
    /// Courses pass through the caller's visibility; anonymous visitors see
    /// active courses only.
    #[instrument(skip(db))]
    pub async fn search(
        db: &PgPool,
        caller: Option<&Caller>,
        q: Option<String>,
    ) -> Result<SearchResults, AppError> {
        let query = q.ok_or_else(|| AppError::validation("Search query is required"))?;
        let pattern = contains_pattern(&query);

        let mut courses = QueryBuilder::<Postgres>::new("SELECT c.* FROM courses c WHERE ");
        match caller {
            Some(caller) => visibility(caller, Entity::Course).push_sql(&mut courses),
            None => {
                courses.push("c.is_active");
            }
        }
        courses
            .push(" AND (c.title ILIKE ")
            .push_bind(pattern.clone())
            .push(LIKE_ESCAPE)
            .push(" OR c.code ILIKE ")
            .push_bind(pattern.clone())
            .push(LIKE_ESCAPE)
            .push(" OR c.description ILIKE ")
            .push_bind(pattern.clone())
            .push(LIKE_ESCAPE)
            .push(") ORDER BY c.code LIMIT ")
            .push_bind(SEARCH_LIMIT);
        let courses = courses.build_query_as::<Course>().fetch_all(db).await?;

        let news = sqlx::query_as::<_, News>(
            r#"SELECT * FROM news
               WHERE published AND (title ILIKE $1 ESCAPE '\' OR content ILIKE $1 ESCAPE '\')
               ORDER BY created_at DESC LIMIT $2"#,
        )
        .bind(&pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(db)
        .await?;

        let events = sqlx::query_as::<_, Event>(
            r#"SELECT * FROM events
               WHERE published AND (title ILIKE $1 ESCAPE '\' OR content ILIKE $1 ESCAPE '\')
               ORDER BY event_date DESC NULLS LAST LIMIT $2"#,
        )
        .bind(&pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(db)
        .await?;

        Ok(SearchResults {
            query,
            courses,
            news,
            events,
        })
    }
}
