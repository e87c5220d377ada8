use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;

use lectern::router::init_router;
use lectern::state::init_app_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    lectern_observability::init_tracing()?;

    let state = init_app_state().await?;
    let server_config = state.server_config.clone();

    #[cfg(feature = "observability")]
    if let Some(handle) = lectern_observability::init_metrics()? {
        let metrics_addr = format!("{}:{}", server_config.host, server_config.metrics_port);
        let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
            .await
            .with_context(|| format!("failed to bind metrics listener on {metrics_addr}"))?;
        tracing::info!("Metrics available at http://{metrics_addr}/metrics");
        tokio::spawn(async move {
            if let Err(e) =
                axum::serve(metrics_listener, lectern_observability::metrics_app(handle)).await
            {
                tracing::error!(error = %e, "Metrics listener stopped");
            }
        });
    }

    let app = init_router(state);

    let addr = server_config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("Server running on http://{addr}");
    tracing::info!("Swagger UI available at http://{addr}/swagger-ui");
    tracing::info!("Scalar UI available at http://{addr}/scalar");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    lectern_observability::shutdown_tracer().await;
    Ok(())
}
