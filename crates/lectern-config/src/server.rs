use crate::env_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Port of the standalone Prometheus listener
    pub metrics_port: u16,
    pub db_max_connections: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            metrics_port: 9090,
            db_max_connections: 10,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env_or("HOST", defaults.host),
            port: env_or("PORT", defaults.port),
            metrics_port: env_or("METRICS_PORT", defaults.metrics_port),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", defaults.db_max_connections),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bind_addr() {
        assert_eq!(ServerConfig::default().bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_unparsable_value_falls_back() {
        assert_eq!(env_or("LECTERN_TEST_UNSET_PORT_VALUE", 4242u16), 4242);
    }
}
