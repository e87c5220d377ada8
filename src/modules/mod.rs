pub mod announcements;
pub mod assignments;
pub mod attendance;
pub mod auth;
pub mod class_schedules;
pub mod contact;
pub mod courses;
pub mod dashboards;
pub mod enrollments;
pub mod events;
pub mod messages;
pub mod news;
pub mod notifications;
pub mod site;
pub mod submissions;
pub mod testimonials;
pub mod users;
