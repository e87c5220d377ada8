//! Application error type shared by every layer of the API.
//!
//! Errors carry an HTTP status, a stable machine-readable [`ErrorCode`] and an
//! [`anyhow::Error`] with the human-readable context. They render as
//!
//! ```json
//! { "error": "Course not found", "code": "NOT_FOUND" }
//! ```

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

/// Machine-readable error codes returned alongside every error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Role or ownership check failed.
    PermissionDenied,
    /// Record absent, or filtered out by access scoping.
    NotFound,
    /// Missing or malformed input.
    ValidationError,
    /// A (student, course) enrollment already exists.
    DuplicateEnrollment,
    /// A (assignment, student) submission already exists.
    DuplicateSubmission,
    /// Any other uniqueness conflict (email, course code, ...).
    Conflict,
    /// Requested status change is not allowed from the current status.
    InvalidTransition,
    Unauthorized,
    BadRequest,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::NotFound => "NOT_FOUND",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::DuplicateEnrollment => "DUPLICATE_ENROLLMENT",
            Self::DuplicateSubmission => "DUPLICATE_SUBMISSION",
            Self::Conflict => "CONFLICT",
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::BadRequest => "BAD_REQUEST",
            Self::Internal => "INTERNAL",
        }
    }

    fn for_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::BadRequest,
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::FORBIDDEN => Self::PermissionDenied,
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::CONFLICT => Self::Conflict,
            StatusCode::UNPROCESSABLE_ENTITY => Self::ValidationError,
            _ => Self::Internal,
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            code: ErrorCode::for_status(status),
            error: err.into(),
        }
    }

    /// Overrides the code derived from the status.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = code;
        self
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::internal(anyhow::anyhow!(message.into()))
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    /// Request body failed declarative validation (422).
    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    /// A domain rule rejected otherwise well-formed input (400).
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, anyhow::anyhow!(message.into()))
            .with_code(ErrorCode::ValidationError)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow::anyhow!(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow::anyhow!(message.into()))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, anyhow::anyhow!(message.into()))
    }

    pub fn duplicate_enrollment() -> Self {
        Self::conflict("Student is already enrolled in this course")
            .with_code(ErrorCode::DuplicateEnrollment)
    }

    pub fn duplicate_submission() -> Self {
        Self::conflict("A submission for this assignment already exists")
            .with_code(ErrorCode::DuplicateSubmission)
    }

    pub fn invalid_transition(message: impl Into<String>) -> Self {
        Self::bad_request(anyhow::anyhow!(message.into())).with_code(ErrorCode::InvalidTransition)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            tracing::error!(error = ?self.error, code = self.code.as_str(), "Request failed");
            "Internal server error".to_string()
        } else {
            self.error.to_string()
        };

        let body = Json(json!({
            "error": message,
            "code": self.code,
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_follows_status() {
        assert_eq!(
            AppError::forbidden("nope").code,
            ErrorCode::PermissionDenied
        );
        assert_eq!(
            AppError::not_found(anyhow::anyhow!("missing")).code,
            ErrorCode::NotFound
        );
        assert_eq!(
            AppError::unprocessable(anyhow::anyhow!("bad")).code,
            ErrorCode::ValidationError
        );
        assert_eq!(AppError::internal_error("boom").code, ErrorCode::Internal);
    }

    #[test]
    fn test_domain_codes() {
        let err = AppError::duplicate_enrollment();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, ErrorCode::DuplicateEnrollment);

        let err = AppError::validation("Grade is required");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = AppError::invalid_transition("completed is terminal");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, ErrorCode::InvalidTransition);
    }

    #[test]
    fn test_code_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::DuplicateEnrollment).unwrap();
        assert_eq!(json, r#""DUPLICATE_ENROLLMENT""#);
        assert_eq!(ErrorCode::PermissionDenied.as_str(), "PERMISSION_DENIED");
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::forbidden("Only tutors can grade").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = AppError::internal_error("db down").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
