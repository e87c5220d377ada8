//! Development data seeding.
//!
//! Everything is inserted in one transaction and tagged (email domain,
//! course code prefix, event location) so [`clear_seed`] can remove it
//! without touching real records.

mod academics;
mod content;
mod models;
mod users;

pub use models::{SEED_COURSE_PREFIX, SEED_EMAIL_DOMAIN, SEED_PASSWORD, SeedConfig};

use bcrypt::hash;
use lectern_models::{CourseId, UserRole};
use sqlx::PgPool;
use std::time::Instant;

pub async fn seed_all(db: &PgPool, config: SeedConfig) -> anyhow::Result<()> {
    let start = Instant::now();
    println!("🌱 Seeding {} users and {} courses...", config.total_users(), config.courses);

    // bcrypt is slow; every seeded account shares one low-cost hash
    let password_hash = hash(SEED_PASSWORD, 4)?;

    let mut tx = db.begin().await?;

    let mut ids_by_role = Vec::with_capacity(UserRole::ALL.len());
    for (role, count) in [
        (UserRole::Admin, config.admins),
        (UserRole::Tutor, config.tutors),
        (UserRole::Student, config.students),
        (UserRole::Alumni, config.alumni),
    ] {
        let seeds = users::generate_users(role, count, &password_hash);
        let ids = users::insert_users(&mut tx, &seeds).await?;
        users::insert_profiles(&mut tx, role, &ids).await?;
        println!("   ✓ {} {} accounts", ids.len(), role);
        ids_by_role.push((role, ids));
    }
    let ids_for = |role: UserRole| {
        ids_by_role
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, ids)| ids.clone())
            .unwrap_or_default()
    };
    let tutors = ids_for(UserRole::Tutor);
    let students = ids_for(UserRole::Student);
    let author = ids_for(UserRole::Admin).first().copied();

    let course_seeds = academics::generate_courses(config.courses);
    let courses = academics::insert_courses(&mut tx, &course_seeds, &tutors).await?;
    println!("   ✓ {} courses", courses.len());

    let course_ids: Vec<CourseId> = courses.iter().map(|(id, _)| *id).collect();
    let enrollments =
        academics::plan_enrollments(&students, &course_ids, config.enrollments_per_student);
    let enrolled = academics::insert_enrollments(&mut tx, &enrollments).await?;
    println!("   ✓ {enrolled} enrollments");

    let assignments =
        academics::insert_assignments(&mut tx, &courses, config.assignments_per_course).await?;
    let submitted = academics::insert_submissions(&mut tx, &enrollments, &assignments).await?;
    println!("   ✓ {} assignments, {submitted} submissions", assignments.len());

    let (sessions, attendance) = academics::insert_sessions_with_attendance(
        &mut tx,
        &courses,
        config.sessions_per_course,
        &enrollments,
    )
    .await?;
    println!("   ✓ {sessions} class sessions, {attendance} attendance records");

    let news = content::insert_news(&mut tx, author, config.content_items).await?;
    let events = content::insert_events(&mut tx, config.content_items).await?;
    let testimonials = content::insert_testimonials(&mut tx, config.content_items).await?;
    content::refresh_statistics(&mut tx).await?;
    println!("   ✓ {news} news, {events} events, {testimonials} testimonials");

    tx.commit().await?;

    println!("\n✅ Seeding complete in {:?}", start.elapsed());
    println!("   Every seeded account uses the password '{SEED_PASSWORD}'");
    Ok(())
}

/// Removes seeded rows and returns how many users were deleted.
pub async fn clear_seed(db: &PgPool) -> anyhow::Result<u64> {
    let email_pattern = format!("%@{SEED_EMAIL_DOMAIN}");
    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM news WHERE author_id IN (SELECT id FROM users WHERE email LIKE $1)")
        .bind(&email_pattern)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM events WHERE location = $1")
        .bind(models::SEED_EVENT_LOCATION)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM testimonials WHERE email LIKE $1")
        .bind(&email_pattern)
        .execute(&mut *tx)
        .await?;
    // Cascades to enrollments, coursework, sessions and attendance
    sqlx::query("DELETE FROM courses WHERE code LIKE $1")
        .bind(format!("{SEED_COURSE_PREFIX}%"))
        .execute(&mut *tx)
        .await?;
    let users = sqlx::query("DELETE FROM users WHERE email LIKE $1")
        .bind(&email_pattern)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;
    Ok(users)
}
