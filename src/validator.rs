use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use lectern_core::AppError;

fn format_errors(errors: &ValidationErrors) -> String {
    let mut messages = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<Vec<_>>();
    messages.sort();
    messages.join(", ")
}

/// JSON body extractor that runs `validator` rules before the handler sees the value.
///
/// Body parse failures answer 400, rule violations 422.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let error_msg = rejection.body_text();

                if error_msg.contains("missing field") {
                    let field = error_msg
                        .split("missing field `")
                        .nth(1)
                        .and_then(|s| s.split('`').next())
                        .unwrap_or("unknown");
                    return AppError::bad_request(anyhow!("{} is required", field));
                }

                if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
                    return AppError::bad_request(anyhow!(
                        "Missing 'Content-Type: application/json' header"
                    ));
                }

                if error_msg.contains("invalid type") || error_msg.contains("unknown variant") {
                    return AppError::bad_request(anyhow!("Invalid field type in request"));
                }

                tracing::debug!(error = %error_msg, "Rejected request body");
                AppError::bad_request(anyhow!("Invalid request body"))
            })?;

        value
            .validate()
            .map_err(|errors| AppError::unprocessable(anyhow!("{}", format_errors(&errors))))?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
        title: String,
        #[validate(range(min = 1, max = 10))]
        count: i32,
    }

    fn request(body: &str, content_type: Option<&str>) -> Request {
        let mut builder = HttpRequest::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn extract(body: &str, content_type: Option<&str>) -> Result<Payload, AppError> {
        ValidatedJson::<Payload>::from_request(request(body, content_type), &())
            .await
            .map(|ValidatedJson(p)| p)
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let payload = extract(r#"{"title":"Algebra","count":2}"#, Some("application/json"))
            .await
            .unwrap();
        assert_eq!(payload.title, "Algebra");
    }

    #[tokio::test]
    async fn test_missing_field_names_the_field() {
        let err = extract(r#"{"count":2}"#, Some("application/json"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "title is required");
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let err = extract(r#"{"title":"Algebra","count":2}"#, None)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.error.to_string().contains("Content-Type"));
    }

    #[tokio::test]
    async fn test_rule_violations_are_422() {
        let err = extract(r#"{"title":"ab","count":50}"#, Some("application/json"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        let message = err.error.to_string();
        assert!(message.contains("Title must be at least 3 characters"));
        assert!(message.contains("count is invalid"));
    }

    #[tokio::test]
    async fn test_wrong_type_is_400() {
        let err = extract(r#"{"title":"Algebra","count":"two"}"#, Some("application/json"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
