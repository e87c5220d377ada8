//! Dashboards are recomputed from the academic tables on every request.

use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use lectern_access::{Caller, Entity, visibility};
use lectern_core::{AppError, mean, percentage, round2};
use lectern_models::{
    AdminDashboard, ClassSchedule, PublicStats, StudentDashboard, StudentOverview, SystemHealth,
    TutorDashboard, TutorOverview, UserId, UserRole,
};

const UPCOMING_CLASS_LIMIT: i64 = 5;

pub struct DashboardService;

#[derive(Debug, FromRow)]
struct AttendanceTally {
    attended: i64,
    total: i64,
}

#[derive(Debug, FromRow)]
struct StudentOverviewRow {
    user_id: UserId,
    username: String,
    full_name: String,
    email: String,
    student_number: Option<String>,
    courses_enrolled: i64,
    completed_courses: i64,
    recent_submissions: i64,
}

impl From<StudentOverviewRow> for StudentOverview {
    fn from(row: StudentOverviewRow) -> Self {
        Self {
            progress_rate: round2(percentage(row.completed_courses, row.courses_enrolled)),
            user_id: row.user_id,
            username: row.username,
            full_name: row.full_name,
            email: row.email,
            student_number: row.student_number,
            courses_enrolled: row.courses_enrolled,
            completed_courses: row.completed_courses,
            recent_submissions: row.recent_submissions,
        }
    }
}

async fn count(db: &PgPool, sql: &str, user: Option<UserId>) -> Result<i64, AppError> {
    let query = sqlx::query_scalar::<Postgres, i64>(sql);
    let query = match user {
        Some(user) => query.bind(user),
        None => query,
    };
    Ok(query.fetch_one(db).await?)
}

impl DashboardService {
    #[instrument(skip(db))]
    pub async fn student_dashboard(
        db: &PgPool,
        caller: &Caller,
    ) -> Result<StudentDashboard, AppError> {
        caller.require_role(UserRole::Student)?;
        let me = Some(caller.id);

        let enrolled_courses = count(
            db,
            "SELECT COUNT(*) FROM enrollments WHERE student_id = $1",
            me,
        )
        .await?;
        let completed_courses = count(
            db,
            "SELECT COUNT(*) FROM enrollments WHERE student_id = $1 AND status = 'completed'",
            me,
        )
        .await?;
        let pending_assignments = count(
            db,
            "SELECT COUNT(*) FROM submissions WHERE student_id = $1 AND grade IS NULL",
            me,
        )
        .await?;

        let progress: Vec<f64> =
            sqlx::query_scalar("SELECT progress FROM enrollments WHERE student_id = $1")
                .bind(caller.id)
                .fetch_all(db)
                .await?;
        let grades: Vec<f64> = sqlx::query_scalar(
            "SELECT grade FROM submissions WHERE student_id = $1 AND grade IS NOT NULL",
        )
        .bind(caller.id)
        .fetch_all(db)
        .await?;

        let tally = sqlx::query_as::<_, AttendanceTally>(
            r#"SELECT COUNT(*) FILTER (WHERE status IN ('present', 'late')) AS attended,
                      COUNT(*) AS total
               FROM attendance WHERE student_id = $1"#,
        )
        .bind(caller.id)
        .fetch_one(db)
        .await?;

        let mut upcoming = QueryBuilder::<Postgres>::new("SELECT cs.* FROM class_schedules cs WHERE ");
        visibility(caller, Entity::ClassSchedule).push_sql(&mut upcoming);
        upcoming
            .push(" AND cs.scheduled_date >= NOW() ORDER BY cs.scheduled_date LIMIT ")
            .push_bind(UPCOMING_CLASS_LIMIT);
        let upcoming_classes = upcoming.build_query_as::<ClassSchedule>().fetch_all(db).await?;

        Ok(StudentDashboard {
            enrolled_courses,
            completed_courses,
            pending_assignments,
            overall_progress: round2(mean(progress)),
            avg_grade: round2(mean(grades)),
            attendance_rate: round2(percentage(tally.attended, tally.total)),
            upcoming_classes,
        })
    }

    #[instrument(skip(db))]
    pub async fn tutor_dashboard(db: &PgPool, caller: &Caller) -> Result<TutorDashboard, AppError> {
        caller.require_role(UserRole::Tutor)?;
        let me = Some(caller.id);

        let courses_taught = count(db, "SELECT COUNT(*) FROM courses WHERE tutor_id = $1", me).await?;
        let total_students = count(
            db,
            r#"SELECT COUNT(DISTINCT e.student_id) FROM enrollments e
               JOIN courses c ON c.id = e.course_id
               WHERE c.tutor_id = $1 AND e.status = 'enrolled'"#,
            me,
        )
        .await?;
        let pending_grading = count(
            db,
            r#"SELECT COUNT(*) FROM submissions s
               JOIN assignments a ON a.id = s.assignment_id
               WHERE a.tutor_id = $1 AND s.grade IS NULL"#,
            me,
        )
        .await?;
        let upcoming_classes = count(
            db,
            "SELECT COUNT(*) FROM class_schedules WHERE tutor_id = $1 AND scheduled_date >= NOW()",
            me,
        )
        .await?;

        let tally = sqlx::query_as::<_, AttendanceTally>(
            r#"SELECT COUNT(*) FILTER (WHERE att.status IN ('present', 'late')) AS attended,
                      COUNT(*) AS total
               FROM attendance att
               JOIN class_schedules cs ON cs.id = att.class_schedule_id
               WHERE cs.tutor_id = $1"#,
        )
        .bind(caller.id)
        .fetch_one(db)
        .await?;

        Ok(TutorDashboard {
            courses_taught,
            total_students,
            pending_grading,
            upcoming_classes,
            attendance_rate: round2(percentage(tally.attended, tally.total)),
        })
    }

    #[instrument(skip(db))]
    pub async fn admin_dashboard(db: &PgPool, caller: &Caller) -> Result<AdminDashboard, AppError> {
        caller.require_role(UserRole::Admin)?;

        let total_users = count(db, "SELECT COUNT(*) FROM users", None).await?;
        let total_students =
            count(db, "SELECT COUNT(*) FROM users WHERE role = 'student'", None).await?;
        let total_tutors = count(db, "SELECT COUNT(*) FROM users WHERE role = 'tutor'", None).await?;
        let total_courses = count(db, "SELECT COUNT(*) FROM courses", None).await?;
        let total_enrollments = count(db, "SELECT COUNT(*) FROM enrollments", None).await?;
        let active_enrollments = count(
            db,
            "SELECT COUNT(*) FROM enrollments WHERE status = 'enrolled'",
            None,
        )
        .await?;
        let completed_enrollments = count(
            db,
            "SELECT COUNT(*) FROM enrollments WHERE status = 'completed'",
            None,
        )
        .await?;

        let system_health = SystemHealth {
            active_users_24h: count(
                db,
                "SELECT COUNT(*) FROM users WHERE last_login_at >= NOW() - INTERVAL '24 hours'",
                None,
            )
            .await?,
            recent_registrations: count(
                db,
                "SELECT COUNT(*) FROM users WHERE created_at >= NOW() - INTERVAL '7 days'",
                None,
            )
            .await?,
            pending_submissions: count(
                db,
                "SELECT COUNT(*) FROM submissions WHERE grade IS NULL",
                None,
            )
            .await?,
        };

        Ok(AdminDashboard {
            total_users,
            total_students,
            total_tutors,
            total_courses,
            active_enrollments,
            completion_rate: round2(percentage(completed_enrollments, total_enrollments)),
            system_health,
        })
    }

    #[instrument(skip(db))]
    pub async fn tutors_overview(
        db: &PgPool,
        caller: &Caller,
    ) -> Result<Vec<TutorOverview>, AppError> {
        caller.require_role(UserRole::Admin)?;

        let tutors = sqlx::query_as::<_, TutorOverview>(
            r#"SELECT u.id AS user_id, u.username,
                      (u.first_name || ' ' || u.last_name) AS full_name, u.email,
                      tp.staff_number, tp.department,
                      (SELECT COUNT(*) FROM courses c WHERE c.tutor_id = u.id) AS courses_taught,
                      (SELECT COUNT(DISTINCT e.student_id) FROM enrollments e
                         JOIN courses c ON c.id = e.course_id
                         WHERE c.tutor_id = u.id AND e.status = 'enrolled') AS students_managed
               FROM users u
               LEFT JOIN tutor_profiles tp ON tp.user_id = u.id
               WHERE u.role = 'tutor'
               ORDER BY u.last_name, u.first_name"#,
        )
        .fetch_all(db)
        .await?;

        Ok(tutors)
    }

    #[instrument(skip(db))]
    pub async fn students_overview(
        db: &PgPool,
        caller: &Caller,
    ) -> Result<Vec<StudentOverview>, AppError> {
        caller.require_role(UserRole::Admin)?;

        let rows = sqlx::query_as::<_, StudentOverviewRow>(
            r#"SELECT u.id AS user_id, u.username,
                      (u.first_name || ' ' || u.last_name) AS full_name, u.email,
                      sp.student_number,
                      (SELECT COUNT(*) FROM enrollments e
                         WHERE e.student_id = u.id) AS courses_enrolled,
                      (SELECT COUNT(*) FROM enrollments e
                         WHERE e.student_id = u.id AND e.status = 'completed') AS completed_courses,
                      (SELECT COUNT(*) FROM submissions s
                         WHERE s.student_id = u.id
                           AND s.submitted_at >= NOW() - INTERVAL '30 days') AS recent_submissions
               FROM users u
               LEFT JOIN student_profiles sp ON sp.user_id = u.id
               WHERE u.role = 'student'
               ORDER BY u.last_name, u.first_name"#,
        )
        .fetch_all(db)
        .await?;

        Ok(rows.into_iter().map(StudentOverview::from).collect())
    }

    /// Live counts for the landing page; the success rate is curated by admins.
    #[instrument(skip(db))]
    pub async fn public_stats(db: &PgPool) -> Result<PublicStats, AppError> {
        let students = count(db, "SELECT COUNT(*) FROM users WHERE role = 'student'", None).await?;
        let courses = count(db, "SELECT COUNT(*) FROM courses WHERE is_active", None).await?;
        let tutors = count(db, "SELECT COUNT(*) FROM users WHERE role = 'tutor'", None).await?;
        let success_rate = sqlx::query_scalar::<_, i32>(
            "SELECT COALESCE((SELECT success_rate FROM site_statistics WHERE id = 1), 0)",
        )
        .fetch_one(db)
        .await?;

        Ok(PublicStats {
            students,
            courses,
            tutors,
            success_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(enrolled: i64, completed: i64) -> StudentOverviewRow {
        StudentOverviewRow {
            user_id: UserId::new(),
            username: "ada".to_string(),
            full_name: "Ada Obi".to_string(),
            email: "ada@example.com".to_string(),
            student_number: Some("STU000001".to_string()),
            courses_enrolled: enrolled,
            completed_courses: completed,
            recent_submissions: 0,
        }
    }

    #[test]
    fn test_progress_rate_without_courses_is_zero() {
        let overview = StudentOverview::from(row(0, 0));
        assert_eq!(overview.progress_rate, 0.0);
    }

    #[test]
    fn test_progress_rate_counts_completed_share() {
        let overview = StudentOverview::from(row(3, 1));
        assert_eq!(overview.progress_rate, 33.33);
        assert_eq!(overview.student_number.as_deref(), Some("STU000001"));
    }
}
