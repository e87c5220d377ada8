//! Assignment models and DTOs.

use chrono::{DateTime, Utc};
use lectern_core::serde::deserialize_optional_trimmed;
use lectern_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{AssignmentId, CourseId, UserId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "assignment_type", rename_all = "lowercase")]
pub enum AssignmentType {
    Essay,
    Quiz,
    Project,
    Presentation,
    #[default]
    Homework,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Assignment {
    pub id: AssignmentId,
    pub course_id: CourseId,
    pub tutor_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub max_points: f64,
    pub assignment_type: AssignmentType,
    pub attachment_url: Option<String>,
    pub instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assignment {
    pub fn is_past_due(&self, at: DateTime<Utc>) -> bool {
        at > self.due_date
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAssignmentDto {
    pub course_id: CourseId,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    #[validate(range(exclusive_min = 0.0, message = "max_points must be positive"))]
    pub max_points: f64,
    #[serde(default)]
    pub assignment_type: AssignmentType,
    #[validate(url)]
    pub attachment_url: Option<String>,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAssignmentDto {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    #[validate(range(exclusive_min = 0.0))]
    pub max_points: Option<f64>,
    pub assignment_type: Option<AssignmentType>,
    #[validate(url)]
    pub attachment_url: Option<String>,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct AssignmentFilterParams {
    pub course_id: Option<CourseId>,
    pub assignment_type: Option<AssignmentType>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub search: Option<String>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedAssignmentsResponse {
    pub data: Vec<Assignment>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_dto() -> CreateAssignmentDto {
        CreateAssignmentDto {
            course_id: CourseId::new(),
            title: "Essay 1".to_string(),
            description: None,
            due_date: Utc::now() + Duration::days(7),
            max_points: 100.0,
            assignment_type: AssignmentType::Essay,
            attachment_url: None,
            instructions: None,
        }
    }

    #[test]
    fn test_create_validation() {
        assert!(create_dto().validate().is_ok());

        let mut dto = create_dto();
        dto.max_points = 0.0;
        assert!(dto.validate().is_err());

        let mut dto = create_dto();
        dto.title = String::new();
        assert!(dto.validate().is_err());

        let mut dto = create_dto();
        dto.attachment_url = Some("not a url".to_string());
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_assignment_type_defaults_to_homework() {
        let json = format!(
            r#"{{"course_id":"{}","title":"t","due_date":"2030-01-01T00:00:00Z","max_points":10}}"#,
            CourseId::new()
        );
        let dto: CreateAssignmentDto = serde_json::from_str(&json).unwrap();
        assert_eq!(dto.assignment_type, AssignmentType::Homework);
    }
}
