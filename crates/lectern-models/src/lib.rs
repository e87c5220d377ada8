//! # Lectern Models
//!
//! Domain entities, request/response DTOs and the enums that drive the
//! Lectern API.
//!
//! # Modules
//!
//! - [`ids`]: typed UUID wrappers, one per entity
//! - [`value_types`]: validated scalars such as [`Email`]
//! - [`users`]: accounts, roles, per-role profiles and auth DTOs
//! - [`courses`], [`enrollments`], [`assignments`], [`submissions`]: academic records
//! - [`schedules`], [`attendance`]: class sessions and presence
//! - [`communication`]: announcements, notifications and direct messages
//! - [`content`]: news, events, testimonials, contact messages, site statistics
//! - [`dashboards`]: aggregated role views

pub mod assignments;
pub mod attendance;
pub mod communication;
pub mod content;
pub mod courses;
pub mod dashboards;
pub mod enrollments;
pub mod ids;
pub mod schedules;
pub mod submissions;
pub mod users;
pub mod value_types;

pub use ids::{
    AnnouncementId, AssignmentId, AttendanceId, ClassScheduleId, ContactMessageId, CourseId,
    EnrollmentId, EventId, MessageId, NewsId, NotificationId, SubmissionId, TestimonialId, UserId,
};
pub use value_types::{Email, ValueTypeError};

pub use users::{
    AdminProfile, AlumniProfile, LoginRequest, LoginResponse, MessageResponse,
    PaginatedUsersResponse, Profile, RefreshTokenRequest, RefreshTokenResponse, RegisterRequest,
    StudentProfile, TutorProfile, UpdateMeDto, UpdateProfileDto, User, UserCredentials,
    UserFilterParams, UserRole, UserWithProfile,
};

pub use courses::{
    Course, CourseFilterParams, CourseWithStats, CreateCourseDto, PaginatedCoursesResponse,
    UpdateCourseDto,
};

pub use enrollments::{
    CreateEnrollmentDto, Enrollment, EnrollmentDetail, EnrollmentFilterParams, EnrollmentStatus,
    PaginatedEnrollmentsResponse, UpdateEnrollmentDto,
};

pub use assignments::{
    Assignment, AssignmentFilterParams, AssignmentType, CreateAssignmentDto,
    PaginatedAssignmentsResponse, UpdateAssignmentDto,
};

pub use submissions::{
    CreateSubmissionDto, GradeSubmissionDto, PaginatedSubmissionsResponse, Submission,
    SubmissionFilterParams, SubmissionStatus, UpdateSubmissionDto,
};

pub use schedules::{
    ClassSchedule, ClassScheduleFilterParams, ClassType, CreateClassScheduleDto,
    PaginatedClassSchedulesResponse, UpdateClassScheduleDto,
};

pub use attendance::{
    Attendance, AttendanceFilterParams, AttendanceStatus, PaginatedAttendanceResponse,
    RecordAttendanceDto, UpdateAttendanceDto,
};

pub use communication::{
    Announcement, AnnouncementAudience, AnnouncementFilterParams, AnnouncementPriority,
    CreateAnnouncementDto, CreateNotificationDto, Message, MessageFilterParams, MessageFolder,
    MessageType, Notification, NotificationFilterParams, NotificationPriority, NotificationType,
    PaginatedAnnouncementsResponse, PaginatedMessagesResponse, PaginatedNotificationsResponse,
    SendMessageDto, UpdateAnnouncementDto,
};

pub use content::{
    ContactMessage, ContactMessageFilterParams, ContentFilterParams, CreateContactMessageDto,
    CreateEventDto, CreateNewsDto, CreateTestimonialDto, Event, HomeContent, News,
    PaginatedContactMessagesResponse, PaginatedEventsResponse, PaginatedNewsResponse,
    PaginatedTestimonialsResponse, SearchParams, SearchResults, SiteStatistics, Testimonial,
    TestimonialFilterParams, UpdateContactMessageDto, UpdateEventDto, UpdateNewsDto,
    UpdateSiteStatisticsDto, UpdateTestimonialDto,
};

pub use dashboards::{
    AdminDashboard, PublicStats, StudentDashboard, StudentOverview, SystemHealth, TutorDashboard,
    TutorOverview,
};
