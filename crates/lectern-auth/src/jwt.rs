use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use uuid::Uuid;

use lectern_config::JwtConfig;
use lectern_core::AppError;

use crate::claims::{Claims, RefreshTokenClaims};

fn sign<T: Serialize>(claims: &T, jwt_config: &JwtConfig, kind: &str) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create {kind} token: {e}")))
}

fn expiry(now: usize, seconds: i64) -> usize {
    now + seconds.max(0) as usize
}

pub fn create_access_token(
    user_id: Uuid,
    email: &str,
    role: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        exp: expiry(now, jwt_config.access_token_expiry),
        iat: now,
    };

    sign(&claims, jwt_config, "access")
}

pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token"))
}

pub fn create_refresh_token(
    user_id: Uuid,
    email: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;

    let claims = RefreshTokenClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: expiry(now, jwt_config.refresh_token_expiry),
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    sign(&claims, jwt_config, "refresh")
}

pub fn verify_refresh_token(
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<RefreshTokenClaims, AppError> {
    decode::<RefreshTokenClaims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired refresh token"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 604_800,
        }
    }

    #[test]
    fn test_access_token_roundtrip() {
        let config = config();
        let user_id = Uuid::new_v4();

        let token = create_access_token(user_id, "tutor@example.com", "tutor", &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "tutor@example.com");
        assert_eq!(claims.role, "tutor");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let err = verify_token("not.a.token", &config()).unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = create_access_token(Uuid::new_v4(), "a@b.com", "admin", &config()).unwrap();
        let other = JwtConfig {
            secret: "a-completely-different-secret-value-here".to_string(),
            ..config()
        };
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = config();
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "old@example.com".to_string(),
            role: "student".to_string(),
            exp: now - 7200,
            iat: now - 10_800,
        };
        let token = sign(&claims, &config, "access").unwrap();
        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let config = config();
        let user_id = Uuid::new_v4();

        let refresh = create_refresh_token(user_id, "s@example.com", &config).unwrap();
        assert!(verify_token(&refresh, &config).is_err());

        let claims = verify_refresh_token(&refresh, &config).unwrap();
        assert_eq!(claims.sub, user_id.to_string());

        let access = create_access_token(user_id, "s@example.com", "student", &config).unwrap();
        assert!(verify_refresh_token(&access, &config).is_err());
    }

    #[test]
    fn test_refresh_tokens_are_unique() {
        let config = config();
        let user_id = Uuid::new_v4();
        let a = create_refresh_token(user_id, "s@example.com", &config).unwrap();
        let b = create_refresh_token(user_id, "s@example.com", &config).unwrap();
        assert_ne!(a, b);
    }
}
