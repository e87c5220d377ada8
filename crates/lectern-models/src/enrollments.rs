//! Enrollment models, the enrollment status machine and DTOs.

use chrono::{DateTime, Utc};
use lectern_core::{AppError, PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{CourseId, EnrollmentId, UserId};

/// Lifecycle of a student's place in a course.
///
/// ```text
/// enrolled ──► completed
///    │ ├─────► dropped
///    │ └─────► suspended
/// ```
///
/// Every state other than `enrolled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "enrollment_status", rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Enrolled,
    Completed,
    Dropped,
    Suspended,
}

impl EnrollmentStatus {
    pub const ALL: [EnrollmentStatus; 4] = [
        Self::Enrolled,
        Self::Completed,
        Self::Dropped,
        Self::Suspended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enrolled => "enrolled",
            Self::Completed => "completed",
            Self::Dropped => "dropped",
            Self::Suspended => "suspended",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Enrolled)
    }

    /// Re-asserting the current status is a no-op, not a transition.
    pub fn can_transition_to(&self, next: EnrollmentStatus) -> bool {
        *self == next || matches!(self, Self::Enrolled)
    }

    pub fn transition_to(&self, next: EnrollmentStatus) -> Result<EnrollmentStatus, AppError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AppError::invalid_transition(format!(
                "Cannot change enrollment status from {self} to {next}"
            )))
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: UserId,
    pub course_id: CourseId,
    pub status: EnrollmentStatus,
    /// Letter grade, e.g. `A-`
    pub grade: Option<String>,
    /// Percent complete, 0-100
    pub progress: f64,
    pub final_grade: Option<f64>,
    pub enrolled_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Enrollment joined with the course and student it links.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EnrollmentDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub course_code: String,
    pub course_title: String,
    pub student_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEnrollmentDto {
    pub course_id: CourseId,
    /// Defaults to the caller. Only admins may enroll someone else.
    pub student_id: Option<UserId>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEnrollmentDto {
    pub status: Option<EnrollmentStatus>,
    #[validate(length(max = 5))]
    pub grade: Option<String>,
    #[validate(range(min = 0.0, max = 100.0, message = "Progress must be between 0 and 100"))]
    pub progress: Option<f64>,
    #[validate(range(min = 0.0))]
    pub final_grade: Option<f64>,
}

impl UpdateEnrollmentDto {
    /// True when the request touches academic results, which only admins may set.
    pub fn touches_results(&self) -> bool {
        self.grade.is_some() || self.progress.is_some() || self.final_grade.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct EnrollmentFilterParams {
    pub course_id: Option<CourseId>,
    pub student_id: Option<UserId>,
    pub status: Option<EnrollmentStatus>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedEnrollmentsResponse {
    pub data: Vec<EnrollmentDetail>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_core::ErrorCode;

    #[test]
    fn test_enrolled_can_move_anywhere() {
        for next in EnrollmentStatus::ALL {
            assert!(EnrollmentStatus::Enrolled.can_transition_to(next));
        }
    }

    #[test]
    fn test_terminal_states_are_final() {
        for from in [
            EnrollmentStatus::Completed,
            EnrollmentStatus::Dropped,
            EnrollmentStatus::Suspended,
        ] {
            assert!(from.is_terminal());
            for next in EnrollmentStatus::ALL {
                assert_eq!(from.can_transition_to(next), from == next, "{from} -> {next}");
            }
        }
    }

    #[test]
    fn test_invalid_transition_error() {
        let err = EnrollmentStatus::Suspended
            .transition_to(EnrollmentStatus::Enrolled)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
        assert_eq!(err.status.as_u16(), 400);

        assert_eq!(
            EnrollmentStatus::Enrolled
                .transition_to(EnrollmentStatus::Completed)
                .unwrap(),
            EnrollmentStatus::Completed
        );
    }

    #[test]
    fn test_update_progress_bounds() {
        let dto = UpdateEnrollmentDto {
            progress: Some(101.0),
            ..Default::default()
        };
        assert!(dto.validate().is_err());

        let dto = UpdateEnrollmentDto {
            progress: Some(55.5),
            ..Default::default()
        };
        assert!(dto.validate().is_ok());
        assert!(dto.touches_results());

        let dto = UpdateEnrollmentDto {
            status: Some(EnrollmentStatus::Dropped),
            ..Default::default()
        };
        assert!(!dto.touches_results());
    }

    #[test]
    fn test_status_serde() {
        let status: EnrollmentStatus = serde_json::from_str(r#""suspended""#).unwrap();
        assert_eq!(status, EnrollmentStatus::Suspended);
        assert!(serde_json::from_str::<EnrollmentStatus>(r#""expelled""#).is_err());
    }
}
