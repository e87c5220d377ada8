use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Console-only logging, used when observability is compiled out or turned
/// off with `OBSERVABILITY_ENABLED=false`.
///
/// `RUST_LOG` wins when set; otherwise `LOG_LEVEL` (default `info`) applies
/// to the Lectern crates and noisy dependencies are held at `warn`.
pub fn init_basic_console_logging() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "lectern={log_level},lectern_access={log_level},tower_http=warn,hyper=warn,tonic=warn,h2=warn,sqlx=warn"
        ))
    });

    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    // try_init: tests and the CLI may have installed a subscriber already
    let _ = tracing_subscriber::registry().with(console_layer).try_init();

    tracing::info!("Observability disabled, console logging only");
}
