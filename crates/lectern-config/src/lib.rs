//! # Lectern Config
//!
//! Configuration structures loaded from environment variables. Every value has
//! a default so a bare `.env`-less start works for local development.
//!
//! - [`jwt`]: token secret and lifetimes
//! - [`cors`]: allowed origins
//! - [`rate_limit`]: per-IP limits for the auth endpoints
//! - [`server`]: bind address, metrics port and database pool sizing

pub mod cors;
pub mod jwt;
pub mod rate_limit;
pub mod server;

pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;

/// Reads an env var and parses it, falling back to `default` when unset or unparsable.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
