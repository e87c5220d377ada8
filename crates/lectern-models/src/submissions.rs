//! Assignment submissions and grading DTOs.

use chrono::{DateTime, Utc};
use lectern_core::{AppError, PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{AssignmentId, SubmissionId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "submission_status", rename_all = "lowercase")]
pub enum SubmissionStatus {
    Submitted,
    Graded,
    Late,
    Missing,
}

impl SubmissionStatus {
    /// Status a fresh submission receives at `at` for an assignment due at `due`.
    pub fn on_submit(due: DateTime<Utc>, at: DateTime<Utc>) -> Self {
        if at > due { Self::Late } else { Self::Submitted }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Submission {
    pub id: SubmissionId,
    pub assignment_id: AssignmentId,
    pub student_id: UserId,
    pub submitted_content: String,
    pub file_url: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub grade: Option<f64>,
    pub feedback: Option<String>,
    pub graded_at: Option<DateTime<Utc>>,
    pub graded_by: Option<UserId>,
    pub status: SubmissionStatus,
}

impl Submission {
    pub fn is_graded(&self) -> bool {
        self.grade.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSubmissionDto {
    pub assignment_id: AssignmentId,
    #[validate(length(min = 1, message = "Submission content is required"))]
    pub submitted_content: String,
    #[validate(url)]
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSubmissionDto {
    #[validate(length(min = 1))]
    pub submitted_content: Option<String>,
    #[validate(url)]
    pub file_url: Option<String>,
}

/// `grade` is optional at the type level so a missing value surfaces as a
/// domain validation error rather than a body parse failure.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct GradeSubmissionDto {
    pub grade: Option<f64>,
    pub feedback: Option<String>,
}

impl GradeSubmissionDto {
    /// Returns the grade once it is present and within `0..=max_points`.
    pub fn checked_grade(&self, max_points: f64) -> Result<f64, AppError> {
        let grade = self
            .grade
            .ok_or_else(|| AppError::validation("Grade is required"))?;

        if !grade.is_finite() || grade < 0.0 || grade > max_points {
            return Err(AppError::validation(format!(
                "Grade must be between 0 and {max_points}"
            )));
        }

        Ok(grade)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct SubmissionFilterParams {
    pub assignment_id: Option<AssignmentId>,
    pub student_id: Option<UserId>,
    pub status: Option<SubmissionStatus>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedSubmissionsResponse {
    pub data: Vec<Submission>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use lectern_core::ErrorCode;

    #[test]
    fn test_on_submit_marks_late() {
        let due = Utc::now();
        assert_eq!(
            SubmissionStatus::on_submit(due, due - Duration::minutes(1)),
            SubmissionStatus::Submitted
        );
        assert_eq!(SubmissionStatus::on_submit(due, due), SubmissionStatus::Submitted);
        assert_eq!(
            SubmissionStatus::on_submit(due, due + Duration::seconds(1)),
            SubmissionStatus::Late
        );
    }

    #[test]
    fn test_missing_grade_is_validation_error() {
        let err = GradeSubmissionDto::default().checked_grade(100.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.status.as_u16(), 400);
    }

    #[test]
    fn test_grade_bounds() {
        let dto = |g: f64| GradeSubmissionDto {
            grade: Some(g),
            feedback: None,
        };
        assert_eq!(dto(0.0).checked_grade(50.0).unwrap(), 0.0);
        assert_eq!(dto(50.0).checked_grade(50.0).unwrap(), 50.0);
        assert!(dto(50.5).checked_grade(50.0).is_err());
        assert!(dto(-1.0).checked_grade(50.0).is_err());
        assert!(dto(f64::NAN).checked_grade(50.0).is_err());
    }

    #[test]
    fn test_grade_body_without_grade_parses() {
        let dto: GradeSubmissionDto = serde_json::from_str(r#"{"feedback":"good"}"#).unwrap();
        assert!(dto.grade.is_none());
        assert_eq!(dto.feedback.as_deref(), Some("good"));
    }
}
