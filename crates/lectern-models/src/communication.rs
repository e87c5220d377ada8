//! Announcements, notifications and direct messages.

use chrono::{DateTime, Utc};
use lectern_core::serde::deserialize_optional_bool;
use lectern_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{AnnouncementId, AssignmentId, CourseId, MessageId, NotificationId, UserId};
use crate::users::UserRole;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "announcement_audience", rename_all = "lowercase")]
pub enum AnnouncementAudience {
    #[default]
    All,
    Students,
    Tutors,
    Admins,
}

impl AnnouncementAudience {
    /// Audience addressed specifically to a role, besides `All`.
    ///
    /// Alumni only ever see announcements for everyone.
    pub fn for_role(role: UserRole) -> Option<Self> {
        match role {
            UserRole::Student => Some(Self::Students),
            UserRole::Tutor => Some(Self::Tutors),
            UserRole::Admin => Some(Self::Admins),
            UserRole::Alumni => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "announcement_priority", rename_all = "lowercase")]
pub enum AnnouncementPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub admin_id: Option<UserId>,
    pub title: String,
    pub content: String,
    pub target_audience: AnnouncementAudience,
    pub priority: AnnouncementPriority,
    pub published: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAnnouncementDto {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    pub target_audience: AnnouncementAudience,
    #[serde(default)]
    pub priority: AnnouncementPriority,
    pub published: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAnnouncementDto {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub target_audience: Option<AnnouncementAudience>,
    pub priority: Option<AnnouncementPriority>,
    pub published: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct AnnouncementFilterParams {
    pub priority: Option<AnnouncementPriority>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedAnnouncementsResponse {
    pub data: Vec<Announcement>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
pub enum NotificationType {
    Announcement,
    Assignment,
    Grade,
    ClassUpdate,
    Deadline,
    #[default]
    System,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "notification_priority", rename_all = "lowercase")]
pub enum NotificationPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub sender_id: Option<UserId>,
    pub notification_type: NotificationType,
    pub title: String,
    pub content: String,
    pub priority: NotificationPriority,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub course_id: Option<CourseId>,
    pub assignment_id: Option<AssignmentId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateNotificationDto {
    pub user_id: UserId,
    #[serde(default)]
    pub notification_type: NotificationType,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    pub priority: NotificationPriority,
    pub course_id: Option<CourseId>,
    pub assignment_id: Option<AssignmentId>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct NotificationFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_read: Option<bool>,
    pub notification_type: Option<NotificationType>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedNotificationsResponse {
    pub data: Vec<Notification>,
    pub meta: PaginationMeta,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "message_type", rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    General,
    Assignment,
    Grade,
    Announcement,
    Support,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub subject: String,
    pub content: String,
    pub message_type: MessageType,
    pub parent_message_id: Option<MessageId>,
    pub course_id: Option<CourseId>,
    pub assignment_id: Option<AssignmentId>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SendMessageDto {
    pub receiver_id: UserId,
    #[validate(length(min = 1, max = 255, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
    pub parent_message_id: Option<MessageId>,
    pub course_id: Option<CourseId>,
    pub assignment_id: Option<AssignmentId>,
}

/// Which side of the conversation to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageFolder {
    #[default]
    All,
    Inbox,
    Sent,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct MessageFilterParams {
    pub folder: Option<MessageFolder>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_read: Option<bool>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedMessagesResponse {
    pub data: Vec<Message>,
    pub meta: PaginationMeta,
}
