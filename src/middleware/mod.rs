//! Request extractors and middleware.
//!
//! - [`auth`]: `AuthUser`, the bearer JWT extractor (also usable as `Option<AuthUser>`)
//! - [`role`]: route layers that gate whole routers by role
//!
//! # Flow
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. `AuthUser` verifies the JWT and yields the claims
//! 3. `AuthUser::caller` turns them into a `lectern_access::Caller`
//! 4. Services scope every query through that caller

pub mod auth;
pub mod role;
