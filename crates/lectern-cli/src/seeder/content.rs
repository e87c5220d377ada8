//! Public site content: news, events, testimonials and the statistics row.

use chrono::{Duration, Utc};
use fake::Fake;
use fake::faker::job::en::Title as JobTitle;
use fake::faker::lorem::en::{Paragraph, Sentence};
use fake::faker::name::en::Name;
use lectern_models::UserId;
use sqlx::{Postgres, QueryBuilder, Transaction};

use super::models::{SEED_EMAIL_DOMAIN, SEED_EVENT_LOCATION};

pub async fn insert_news(
    tx: &mut Transaction<'_, Postgres>,
    author: Option<UserId>,
    count: usize,
) -> anyhow::Result<u64> {
    if count == 0 {
        return Ok(0);
    }
    let items: Vec<(String, String)> = (0..count)
        .map(|_| (Sentence(3..7).fake(), Paragraph(3..6).fake()))
        .collect();

    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO news (title, content, author_id, published) ");
    qb.push_values(items.iter().enumerate(), |mut row, (idx, (title, content))| {
        row.push_bind(title)
            .push_bind(content)
            .push_bind(author)
            // One draft so the admin listing differs from the public one
            .push_bind(idx + 1 != count);
    });
    Ok(qb.build().execute(&mut **tx).await?.rows_affected())
}

pub async fn insert_events(
    tx: &mut Transaction<'_, Postgres>,
    count: usize,
) -> anyhow::Result<u64> {
    if count == 0 {
        return Ok(0);
    }
    let now = Utc::now();
    let items: Vec<(String, String, chrono::DateTime<Utc>)> = (0..count)
        .map(|idx| {
            (
                Sentence(2..5).fake(),
                Paragraph(2..4).fake(),
                now + Duration::days(idx as i64 * 10 - 10),
            )
        })
        .collect();

    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO events (title, content, event_date, location) ");
    qb.push_values(&items, |mut row, (title, content, date)| {
        row.push_bind(title)
            .push_bind(content)
            .push_bind(*date)
            .push_bind(SEED_EVENT_LOCATION);
    });
    Ok(qb.build().execute(&mut **tx).await?.rows_affected())
}

pub async fn insert_testimonials(
    tx: &mut Transaction<'_, Postgres>,
    count: usize,
) -> anyhow::Result<u64> {
    if count == 0 {
        return Ok(0);
    }
    let items: Vec<(String, String, String, String)> = (0..count)
        .map(|idx| {
            (
                Paragraph(1..3).fake(),
                Name().fake(),
                JobTitle().fake(),
                format!("testimonial{idx}@{SEED_EMAIL_DOMAIN}"),
            )
        })
        .collect();

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO testimonials (content, author, author_title, email, approved) ",
    );
    qb.push_values(items.iter().enumerate(), |mut row, (idx, (content, author, title, email))| {
        row.push_bind(content)
            .push_bind(author)
            .push_bind(title)
            .push_bind(email)
            .push_bind(idx % 4 != 3);
    });
    Ok(qb.build().execute(&mut **tx).await?.rows_affected())
}

/// Refreshes the statistics singleton from live counts.
pub async fn refresh_statistics(tx: &mut Transaction<'_, Postgres>) -> anyhow::Result<()> {
    sqlx::query(
        r#"INSERT INTO site_statistics (id, active_students, courses, success_rate, tutors, updated_at)
        SELECT 1,
               (SELECT COUNT(*) FROM users WHERE role = 'student')::int,
               (SELECT COUNT(*) FROM courses WHERE is_active)::int,
               COALESCE((
                   SELECT ROUND(100.0 * COUNT(*) FILTER (WHERE status = 'completed')
                                / NULLIF(COUNT(*) FILTER (WHERE status <> 'enrolled'), 0))
                   FROM enrollments
               ), 0)::int,
               (SELECT COUNT(*) FROM users WHERE role = 'tutor')::int,
               NOW()
        ON CONFLICT (id) DO UPDATE SET
            active_students = EXCLUDED.active_students,
            courses = EXCLUDED.courses,
            success_rate = EXCLUDED.success_rate,
            tutors = EXCLUDED.tutors,
            updated_at = EXCLUDED.updated_at"#,
    )
    .execute(&mut **tx)
    .await?;
    Ok(())
}
