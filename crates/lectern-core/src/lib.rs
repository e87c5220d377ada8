//! # Lectern Core
//!
//! Foundational types shared across the Lectern API crates:
//!
//! - [`errors`]: [`AppError`] and the [`ErrorCode`] wire codes
//! - [`pagination`]: query parameters and response metadata for list endpoints
//! - [`password`]: bcrypt hashing and verification
//! - [`rates`]: zero-safe percentage and mean helpers for dashboards
//! - [`search`]: LIKE pattern escaping for search filters
//! - [`serde`]: query-string deserialization helpers

pub mod errors;
pub mod pagination;
pub mod password;
pub mod rates;
pub mod search;
pub mod serde;

pub use errors::{AppError, ErrorCode};
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
pub use rates::{mean, percentage, round2};
pub use search::{LIKE_ESCAPE, contains_pattern, escape_like};
