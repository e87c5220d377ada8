//! Public site content: news, events, testimonials, contact messages and the
//! statistics singleton.

use chrono::{DateTime, Utc};
use lectern_core::serde::{deserialize_optional_bool, deserialize_optional_trimmed};
use lectern_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::courses::Course;
use crate::ids::{ContactMessageId, EventId, NewsId, TestimonialId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct News {
    pub id: NewsId,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub author_id: Option<UserId>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateNewsDto {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[validate(url)]
    pub image_url: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateNewsDto {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub content: String,
    /// Embedded video reference, e.g. a YouTube id
    pub video_id: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEventDto {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[validate(length(max = 100))]
    pub video_id: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEventDto {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    #[validate(length(max = 100))]
    pub video_id: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    pub published: Option<bool>,
}

/// Shared by the news and event listings.
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct ContentFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub search: Option<String>,
    /// Admin only; ignored for everyone else
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub published: Option<bool>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedNewsResponse {
    pub data: Vec<News>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedEventsResponse {
    pub data: Vec<Event>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Testimonial {
    pub id: TestimonialId,
    pub content: String,
    pub author: String,
    pub author_title: String,
    pub image_url: Option<String>,
    pub email: Option<String>,
    pub submitted_by: Option<UserId>,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTestimonialDto {
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
    #[validate(length(min = 1, max = 255))]
    pub author: String,
    #[validate(length(min = 1, max = 255))]
    pub author_title: String,
    #[validate(url)]
    pub image_url: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTestimonialDto {
    #[validate(length(min = 1, max = 5000))]
    pub content: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub author: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub author_title: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    pub approved: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct TestimonialFilterParams {
    /// Admin only; the public listing is always approved-only
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub approved: Option<bool>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedTestimonialsResponse {
    pub data: Vec<Testimonial>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ContactMessage {
    pub id: ContactMessageId,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub is_read: bool,
    pub replied: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateContactMessageDto {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, max = 255, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, max = 5000, message = "Message is required"))]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateContactMessageDto {
    pub is_read: Option<bool>,
    pub replied: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct ContactMessageFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_read: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub replied: Option<bool>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedContactMessagesResponse {
    pub data: Vec<ContactMessage>,
    pub meta: PaginationMeta,
}

/// The single statistics row shown on the public site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SiteStatistics {
    pub active_students: i32,
    pub courses: i32,
    /// Whole percent, 0-100
    pub success_rate: i32,
    pub tutors: i32,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateSiteStatisticsDto {
    #[validate(range(min = 0))]
    pub active_students: Option<i32>,
    #[validate(range(min = 0))]
    pub courses: Option<i32>,
    #[validate(range(min = 0, max = 100, message = "Success rate must be between 0 and 100"))]
    pub success_rate: Option<i32>,
    #[validate(range(min = 0))]
    pub tutors: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HomeContent {
    pub latest_news: Vec<News>,
    pub upcoming_events: Vec<Event>,
    pub testimonials: Vec<Testimonial>,
    pub statistics: SiteStatistics,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct SearchParams {
    /// Case-insensitive substring, required
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub q: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResults {
    pub query: String,
    pub courses: Vec<Course>,
    pub news: Vec<News>,
    pub events: Vec<Event>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_default_is_zero() {
        let stats = SiteStatistics::default();
        assert_eq!(stats.active_students, 0);
        assert_eq!(stats.success_rate, 0);
        assert!(stats.updated_at.is_none());
    }

    #[test]
    fn test_success_rate_bounds() {
        let dto = UpdateSiteStatisticsDto {
            active_students: None,
            courses: None,
            success_rate: Some(101),
            tutors: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_contact_requires_email() {
        let dto = CreateContactMessageDto {
            name: "Grace".to_string(),
            email: "not-an-email".to_string(),
            subject: "Admissions".to_string(),
            message: "When does term start?".to_string(),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_blank_search_is_absent() {
        let params: SearchParams = serde_json::from_str(r#"{"q":"   "}"#).unwrap();
        assert!(params.q.is_none());
    }
}
