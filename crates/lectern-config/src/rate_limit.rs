//! Per-IP rate limiting for the authentication endpoints.
//!
//! Uses a token bucket through `tower_governor`:
//!
//! - `RATE_LIMIT_ENABLED` (default: true)
//! - `RATE_LIMIT_AUTH_REPLENISH_SECONDS`: seconds to regain one request (default: 2)
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: bucket size (default: 10)
//!
//! Keys come from `X-Forwarded-For` / `X-Real-IP` / `Forwarded` before falling
//! back to the peer address, so the API keeps working behind a proxy.

use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::SmartIpKeyExtractor;

use crate::env_or;

pub type AuthGovernorConfig =
    GovernorConfig<SmartIpKeyExtractor, ::governor::middleware::NoOpMiddleware>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub auth_replenish_seconds: u64,
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auth_replenish_seconds: 2,
            auth_burst_size: 10,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_or("RATE_LIMIT_ENABLED", defaults.enabled),
            auth_replenish_seconds: env_or(
                "RATE_LIMIT_AUTH_REPLENISH_SECONDS",
                defaults.auth_replenish_seconds,
            ),
            auth_burst_size: env_or("RATE_LIMIT_AUTH_BURST_SIZE", defaults.auth_burst_size),
        }
    }

    /// Limits disabled outright, for tests and trusted deployments.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Builds the governor config for auth routes.
    ///
    /// Returns `None` when limiting is disabled or the values are zero, which
    /// governor rejects.
    #[must_use]
    pub fn auth_governor_config(&self) -> Option<AuthGovernorConfig> {
        if !self.enabled {
            return None;
        }
        GovernorConfigBuilder::default()
            .per_second(self.auth_replenish_seconds)
            .burst_size(self.auth_burst_size)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.auth_replenish_seconds, 2);
        assert_eq!(config.auth_burst_size, 10);
    }

    #[test]
    fn test_governor_config_built_when_enabled() {
        assert!(RateLimitConfig::default().auth_governor_config().is_some());
    }

    #[test]
    fn test_disabled_yields_none() {
        assert!(RateLimitConfig::disabled().auth_governor_config().is_none());
    }

    #[test]
    fn test_zero_burst_is_rejected() {
        let config = RateLimitConfig {
            auth_burst_size: 0,
            ..RateLimitConfig::default()
        };
        assert!(config.auth_governor_config().is_none());
    }
}
