use sqlx::PgPool;

use lectern_config::{CorsConfig, JwtConfig, RateLimitConfig, ServerConfig};

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub server_config: ServerConfig,
}

impl AppState {
    /// State for an already connected pool, every other setting read from the environment.
    pub fn with_pool(db: PgPool) -> Self {
        Self {
            db,
            jwt_config: JwtConfig::from_env(),
            cors_config: CorsConfig::from_env(),
            rate_limit_config: RateLimitConfig::from_env(),
            server_config: ServerConfig::from_env(),
        }
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let server_config = ServerConfig::from_env();
    let db = lectern_db::init_db_pool(server_config.db_max_connections).await?;
    lectern_db::run_migrations(&db).await?;

    Ok(AppState {
        db,
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        rate_limit_config: RateLimitConfig::from_env(),
        server_config,
    })
}
