use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims embedded in access tokens.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    pub email: String,
    /// Role name as stored on the user (`student`, `tutor`, `admin`, `alumni`)
    pub role: String,
    /// Expiration, Unix timestamp
    pub exp: usize,
    /// Issued at, Unix timestamp
    pub iat: usize,
}

/// Claims embedded in refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
    pub iat: usize,
    /// Unique token id so two refreshes in the same second differ
    pub jti: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_roundtrip_json() {
        let json = r#"{"sub":"u-1","email":"a@b.com","role":"student","exp":20,"iat":10}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.role, "student");
        assert_eq!(claims.exp, 20);
    }

    #[test]
    fn test_refresh_claims_are_not_access_claims() {
        let json = r#"{"sub":"u-1","email":"a@b.com","exp":20,"iat":10,"jti":"x"}"#;
        assert!(serde_json::from_str::<Claims>(json).is_err());
        assert!(serde_json::from_str::<RefreshTokenClaims>(json).is_ok());
    }
}
