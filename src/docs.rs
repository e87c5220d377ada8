use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use lectern_core::{ErrorCode, PaginationMeta, PaginationParams};
use lectern_models::{
    AdminDashboard, Announcement, AnnouncementAudience, AnnouncementPriority, Assignment,
    AssignmentType, Attendance, AttendanceStatus, ClassSchedule, ClassType, ContactMessage,
    Course, CourseWithStats, CreateAnnouncementDto, CreateAssignmentDto, CreateClassScheduleDto,
    CreateContactMessageDto, CreateCourseDto, CreateEnrollmentDto, CreateEventDto, CreateNewsDto,
    CreateNotificationDto, CreateSubmissionDto, CreateTestimonialDto, Enrollment,
    EnrollmentDetail, EnrollmentStatus, Event, GradeSubmissionDto, HomeContent, LoginRequest,
    LoginResponse, Message, MessageFolder, MessageResponse, MessageType, News, Notification,
    NotificationPriority, NotificationType, Profile, PublicStats, RecordAttendanceDto,
    RefreshTokenRequest, RefreshTokenResponse, RegisterRequest, SearchResults, SendMessageDto,
    SiteStatistics, StudentDashboard, StudentOverview, Submission, SubmissionStatus,
    SystemHealth, Testimonial, TutorDashboard, TutorOverview, UpdateAnnouncementDto,
    UpdateAssignmentDto, UpdateAttendanceDto, UpdateClassScheduleDto, UpdateContactMessageDto,
    UpdateCourseDto, UpdateEnrollmentDto, UpdateEventDto, UpdateMeDto, UpdateNewsDto,
    UpdateProfileDto, UpdateSiteStatisticsDto, UpdateSubmissionDto, UpdateTestimonialDto, User,
    UserRole, UserWithProfile,
};

use crate::modules::auth::controller::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register_user,
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::refresh_token,
        crate::modules::auth::controller::get_me,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::delete_user,
        crate::modules::users::controller::update_me,
        crate::modules::users::controller::update_my_profile,
        crate::modules::courses::controller::create_course,
        crate::modules::courses::controller::get_courses,
        crate::modules::courses::controller::get_course,
        crate::modules::courses::controller::update_course,
        crate::modules::courses::controller::delete_course,
        crate::modules::enrollments::controller::create_enrollment,
        crate::modules::enrollments::controller::get_enrollments,
        crate::modules::enrollments::controller::get_enrollment,
        crate::modules::enrollments::controller::update_enrollment,
        crate::modules::enrollments::controller::delete_enrollment,
        crate::modules::assignments::controller::create_assignment,
        crate::modules::assignments::controller::get_assignments,
        crate::modules::assignments::controller::get_assignment,
        crate::modules::assignments::controller::update_assignment,
        crate::modules::assignments::controller::delete_assignment,
        crate::modules::submissions::controller::create_submission,
        crate::modules::submissions::controller::get_submissions,
        crate::modules::submissions::controller::get_submission,
        crate::modules::submissions::controller::update_submission,
        crate::modules::submissions::controller::grade_submission,
        crate::modules::submissions::controller::delete_submission,
        crate::modules::class_schedules::controller::create_schedule,
        crate::modules::class_schedules::controller::get_schedules,
        crate::modules::class_schedules::controller::get_schedule,
        crate::modules::class_schedules::controller::update_schedule,
        crate::modules::class_schedules::controller::delete_schedule,
        crate::modules::attendance::controller::record_attendance,
        crate::modules::attendance::controller::get_attendance_records,
        crate::modules::attendance::controller::get_attendance,
        crate::modules::attendance::controller::update_attendance,
        crate::modules::attendance::controller::delete_attendance,
        crate::modules::dashboards::controller::student_dashboard,
        crate::modules::dashboards::controller::tutor_dashboard,
        crate::modules::dashboards::controller::admin_dashboard,
        crate::modules::dashboards::controller::tutors_overview,
        crate::modules::dashboards::controller::students_overview,
        crate::modules::dashboards::controller::public_stats,
        crate::modules::announcements::controller::get_announcements,
        crate::modules::announcements::controller::get_announcement,
        crate::modules::announcements::controller::create_announcement,
        crate::modules::announcements::controller::update_announcement,
        crate::modules::announcements::controller::delete_announcement,
        crate::modules::notifications::controller::get_notifications,
        crate::modules::notifications::controller::get_notification,
        crate::modules::notifications::controller::create_notification,
        crate::modules::notifications::controller::mark_notification_read,
        crate::modules::notifications::controller::mark_all_notifications_read,
        crate::modules::notifications::controller::delete_notification,
        crate::modules::messages::controller::send_message,
        crate::modules::messages::controller::get_messages,
        crate::modules::messages::controller::get_message,
        crate::modules::messages::controller::mark_message_read,
        crate::modules::messages::controller::delete_message,
        crate::modules::news::controller::get_news_list,
        crate::modules::news::controller::get_news,
        crate::modules::news::controller::create_news,
        crate::modules::news::controller::update_news,
        crate::modules::news::controller::delete_news,
        crate::modules::events::controller::get_events,
        crate::modules::events::controller::get_event,
        crate::modules::events::controller::create_event,
        crate::modules::events::controller::update_event,
        crate::modules::events::controller::delete_event,
        crate::modules::testimonials::controller::get_testimonials,
        crate::modules::testimonials::controller::submit_testimonial,
        crate::modules::testimonials::controller::update_testimonial,
        crate::modules::testimonials::controller::delete_testimonial,
        crate::modules::contact::controller::create_contact_message,
        crate::modules::contact::controller::get_contact_messages,
        crate::modules::contact::controller::update_contact_message,
        crate::modules::contact::controller::delete_contact_message,
        crate::modules::site::controller::get_statistics,
        crate::modules::site::controller::update_statistics,
        crate::modules::site::controller::get_home,
        crate::modules::site::controller::search,
    ),
    components(
        schemas(
            ErrorResponse,
            ErrorCode,
            PaginationMeta,
            PaginationParams,
            MessageResponse,
            User,
            UserRole,
            Profile,
            UserWithProfile,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            RefreshTokenRequest,
            RefreshTokenResponse,
            UpdateMeDto,
            UpdateProfileDto,
            Course,
            CourseWithStats,
            CreateCourseDto,
            UpdateCourseDto,
            Enrollment,
            EnrollmentDetail,
            EnrollmentStatus,
            CreateEnrollmentDto,
            UpdateEnrollmentDto,
            Assignment,
            AssignmentType,
            CreateAssignmentDto,
            UpdateAssignmentDto,
            Submission,
            SubmissionStatus,
            CreateSubmissionDto,
            UpdateSubmissionDto,
            GradeSubmissionDto,
            ClassSchedule,
            ClassType,
            CreateClassScheduleDto,
            UpdateClassScheduleDto,
            Attendance,
            AttendanceStatus,
            RecordAttendanceDto,
            UpdateAttendanceDto,
            StudentDashboard,
            TutorDashboard,
            AdminDashboard,
            SystemHealth,
            TutorOverview,
            StudentOverview,
            PublicStats,
            Announcement,
            AnnouncementAudience,
            AnnouncementPriority,
            CreateAnnouncementDto,
            UpdateAnnouncementDto,
            Notification,
            NotificationType,
            NotificationPriority,
            CreateNotificationDto,
            Message,
            MessageType,
            MessageFolder,
            SendMessageDto,
            News,
            CreateNewsDto,
            UpdateNewsDto,
            Event,
            CreateEventDto,
            UpdateEventDto,
            Testimonial,
            CreateTestimonialDto,
            UpdateTestimonialDto,
            ContactMessage,
            CreateContactMessageDto,
            UpdateContactMessageDto,
            SiteStatistics,
            UpdateSiteStatisticsDto,
            HomeContent,
            SearchResults,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and token refresh"),
        (name = "Users", description = "Accounts and role profiles"),
        (name = "Courses", description = "Course catalogue"),
        (name = "Enrollments", description = "Course enrollments and their lifecycle"),
        (name = "Assignments", description = "Course assignments"),
        (name = "Submissions", description = "Assignment submissions and grading"),
        (name = "Class Schedules", description = "Scheduled class sessions"),
        (name = "Attendance", description = "Per-session attendance records"),
        (name = "Dashboards", description = "Role dashboards and admin overviews"),
        (name = "Announcements", description = "Audience-targeted announcements"),
        (name = "Notifications", description = "Per-user notifications"),
        (name = "Messages", description = "Direct messages between users"),
        (name = "News", description = "Site news"),
        (name = "Events", description = "Site events"),
        (name = "Testimonials", description = "Moderated testimonials"),
        (name = "Contact", description = "Contact form submissions"),
        (name = "Site", description = "Statistics, home content and search"),
    ),
    info(
        title = "Lectern API",
        version = "0.1.0",
        description = "Learning management REST API built with Rust, Axum and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_registers_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn test_openapi_lists_core_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/courses",
            "/api/enrollments/{id}",
            "/api/submissions/{id}/grade",
            "/api/search",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
