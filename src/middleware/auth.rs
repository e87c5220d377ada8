use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};

use lectern_access::Caller;
use lectern_auth::{Claims, verify_token};
use lectern_core::AppError;
use lectern_models::UserId;

use crate::state::AppState;

/// Extractor that validates the bearer JWT and exposes its claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.0
            .sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))
    }

    /// The identity services scope their queries by.
    pub fn caller(&self) -> Result<Caller, AppError> {
        Ok(Caller::from_token_role(self.user_id()?, &self.0.role))
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_header = value
        .to_str()
        .map_err(|_| AppError::unauthorized("Invalid authorization header format"))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(Some)
        .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

/// Public endpoints accept `Option<AuthUser>`: no header means anonymous, a
/// malformed or expired token is still rejected.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => Ok(Some(AuthUser(verify_token(token, &state.jwt_config)?))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, role: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            email: "someone@example.com".to_string(),
            role: role.to_string(),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_caller_from_claims() {
        let id = UserId::new();
        let caller = AuthUser(claims(&id.to_string(), "tutor")).caller().unwrap();
        assert_eq!(caller.id, id);
        assert!(caller.is_tutor());
    }

    #[test]
    fn test_unknown_role_has_no_role() {
        let caller = AuthUser(claims(&UserId::new().to_string(), "janitor"))
            .caller()
            .unwrap();
        assert_eq!(caller.role, None);
    }

    #[test]
    fn test_bad_subject_is_unauthorized() {
        let err = AuthUser(claims("not-a-uuid", "admin")).user_id().unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
    }
}
