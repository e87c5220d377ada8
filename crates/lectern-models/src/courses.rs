//! Course models and DTOs.

use chrono::{DateTime, Utc};
use lectern_core::serde::{deserialize_optional_bool, deserialize_optional_trimmed};
use lectern_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{CourseId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Course {
    pub id: CourseId,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub tutor_id: Option<UserId>,
    pub credit_hours: i32,
    pub subject: Option<String>,
    pub is_active: bool,
    pub max_students: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Course row with its live enrollment count.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CourseWithStats {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub course: Course,
    /// Enrollments currently in the `enrolled` state
    pub enrolled_count: i64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCourseDto {
    #[validate(length(min = 1, max = 20, message = "Course code must be 1-20 characters"))]
    #[schema(example = "CS101")]
    pub code: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    /// Only admins may set this; a tutor creating a course always owns it.
    pub tutor_id: Option<UserId>,
    #[validate(range(min = 0, max = 60))]
    pub credit_hours: Option<i32>,
    #[validate(length(max = 255))]
    pub subject: Option<String>,
    pub is_active: Option<bool>,
    #[validate(range(min = 1, max = 10000))]
    pub max_students: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCourseDto {
    #[validate(length(min = 1, max = 20))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    /// Reassigning a course is admin-only.
    pub tutor_id: Option<UserId>,
    #[validate(range(min = 0, max = 60))]
    pub credit_hours: Option<i32>,
    #[validate(length(max = 255))]
    pub subject: Option<String>,
    pub is_active: Option<bool>,
    #[validate(range(min = 1, max = 10000))]
    pub max_students: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct CourseFilterParams {
    /// Case-insensitive match on code or title
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedCoursesResponse {
    pub data: Vec<CourseWithStats>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_dto() -> CreateCourseDto {
        CreateCourseDto {
            code: "CS101".to_string(),
            title: "Intro to Computing".to_string(),
            description: None,
            tutor_id: None,
            credit_hours: Some(3),
            subject: Some("Computer Science".to_string()),
            is_active: None,
            max_students: Some(30),
        }
    }

    #[test]
    fn test_create_course_validation() {
        assert!(create_dto().validate().is_ok());

        let mut dto = create_dto();
        dto.code = String::new();
        assert!(dto.validate().is_err());

        let mut dto = create_dto();
        dto.code = "X".repeat(21);
        assert!(dto.validate().is_err());

        let mut dto = create_dto();
        dto.max_students = Some(0);
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_empty_update_is_valid() {
        assert!(UpdateCourseDto::default().validate().is_ok());
    }

    #[test]
    fn test_filter_parses_query_strings() {
        let params: CourseFilterParams =
            serde_json::from_str(r#"{"is_active":"true","search":" cs ","limit":"5"}"#).unwrap();
        assert_eq!(params.is_active, Some(true));
        assert_eq!(params.search.as_deref(), Some("cs"));
        assert_eq!(params.pagination.limit(), 5);
    }
}
