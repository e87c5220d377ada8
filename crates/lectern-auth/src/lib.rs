//! # Lectern Auth
//!
//! JWT issuing and verification.
//!
//! Access tokens carry the user id, email and role name so handlers can build
//! the caller's access scope without a database round trip. Refresh tokens
//! carry only identity plus a unique `jti`; the two shapes do not decode as
//! each other.
//!
//! ```ignore
//! use lectern_auth::{create_access_token, verify_token};
//!
//! let token = create_access_token(user_id, "ada@example.com", "tutor", &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.role, "tutor");
//! ```

pub mod claims;
pub mod jwt;

pub use claims::{Claims, RefreshTokenClaims};
pub use jwt::{create_access_token, create_refresh_token, verify_refresh_token, verify_token};
