//! Class schedule models and DTOs.

use chrono::{DateTime, Utc};
use lectern_core::serde::deserialize_optional_bool;
use lectern_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{ClassScheduleId, CourseId, UserId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "class_type", rename_all = "lowercase")]
pub enum ClassType {
    #[default]
    Lecture,
    Tutorial,
    Lab,
    Exam,
    Presentation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClassSchedule {
    pub id: ClassScheduleId,
    pub course_id: CourseId,
    pub tutor_id: UserId,
    pub title: String,
    pub description: String,
    pub scheduled_date: DateTime<Utc>,
    pub duration_minutes: i32,
    pub meeting_link: Option<String>,
    pub attendance_tracking: bool,
    pub class_type: ClassType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClassScheduleDto {
    pub course_id: CourseId,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub scheduled_date: DateTime<Utc>,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: Option<i32>,
    #[validate(url)]
    pub meeting_link: Option<String>,
    pub attendance_tracking: Option<bool>,
    #[serde(default)]
    pub class_type: ClassType,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateClassScheduleDto {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: Option<i32>,
    #[validate(url)]
    pub meeting_link: Option<String>,
    pub attendance_tracking: Option<bool>,
    pub class_type: Option<ClassType>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct ClassScheduleFilterParams {
    pub course_id: Option<CourseId>,
    pub class_type: Option<ClassType>,
    /// Only sessions scheduled from now on
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub upcoming: Option<bool>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedClassSchedulesResponse {
    pub data: Vec<ClassSchedule>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_defaults() {
        let json = format!(
            r#"{{"course_id":"{}","title":"Week 1","scheduled_date":"2030-03-01T09:00:00Z"}}"#,
            CourseId::new()
        );
        let dto: CreateClassScheduleDto = serde_json::from_str(&json).unwrap();
        assert_eq!(dto.class_type, ClassType::Lecture);
        assert_eq!(dto.description, "");
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_duration_bounds() {
        let dto = UpdateClassScheduleDto {
            duration_minutes: Some(0),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }
}
