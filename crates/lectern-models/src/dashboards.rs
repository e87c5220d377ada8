//! Role dashboards and admin management views.
//!
//! Every rate is a percentage in `0.0..=100.0` and is `0.0` when its
//! denominator is zero.

use serde::Serialize;
use utoipa::ToSchema;

use crate::ids::UserId;
use crate::schedules::ClassSchedule;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentDashboard {
    /// Every enrollment regardless of status
    pub enrolled_courses: i64,
    pub completed_courses: i64,
    /// Submissions still awaiting a grade
    pub pending_assignments: i64,
    /// Mean progress across the student's enrollments
    pub overall_progress: f64,
    /// Mean grade across graded submissions
    pub avg_grade: f64,
    pub attendance_rate: f64,
    pub upcoming_classes: Vec<ClassSchedule>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TutorDashboard {
    pub courses_taught: i64,
    /// Distinct students currently enrolled in the tutor's courses
    pub total_students: i64,
    /// Submissions on the tutor's assignments awaiting a grade
    pub pending_grading: i64,
    pub upcoming_classes: i64,
    pub attendance_rate: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SystemHealth {
    /// Users who logged in during the last 24 hours
    pub active_users_24h: i64,
    /// Accounts created during the last 7 days
    pub recent_registrations: i64,
    pub pending_submissions: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminDashboard {
    pub total_users: i64,
    pub total_students: i64,
    pub total_tutors: i64,
    pub total_courses: i64,
    pub active_enrollments: i64,
    /// Completed enrollments over all enrollments
    pub completion_rate: f64,
    pub system_health: SystemHealth,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct TutorOverview {
    pub user_id: UserId,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub staff_number: Option<String>,
    pub department: Option<String>,
    pub courses_taught: i64,
    pub students_managed: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentOverview {
    pub user_id: UserId,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub student_number: Option<String>,
    pub courses_enrolled: i64,
    pub completed_courses: i64,
    /// Completed share of all enrollments
    pub progress_rate: f64,
    /// Submissions in the last 30 days
    pub recent_submissions: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicStats {
    pub students: i64,
    pub courses: i64,
    pub tutors: i64,
    pub success_rate: i32,
}
