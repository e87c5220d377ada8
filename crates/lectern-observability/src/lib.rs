//! Lectern Observability
//!
//! - Tracing with console, rolling JSON file and OpenTelemetry OTLP layers
//! - Prometheus metrics: HTTP traffic plus enrollment, grading and login counters
//! - Request logging middleware that tags every request with an `x-request-id`
//!
//! Everything beyond console logging sits behind the `observability` feature.
//! At runtime `OBSERVABILITY_ENABLED=false` falls back to console logging and
//! turns the middlewares and counters into pass-throughs.
//!
//! ```no_run
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     lectern_observability::init_tracing()?;
//!     // ... serve ...
//!     lectern_observability::shutdown_tracer().await;
//!     Ok(())
//! }
//! ```

pub mod basic_logging;
pub mod request_id;

#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

pub use basic_logging::init_basic_console_logging;
pub use request_id::{REQUEST_ID_HEADER, request_id_for};

#[cfg(feature = "observability")]
pub use metrics_exporter_prometheus::PrometheusHandle;

#[cfg(feature = "observability")]
pub use logging::{init_tracing, is_observability_enabled, logging_middleware, shutdown_tracer};
#[cfg(feature = "observability")]
pub use metrics::{
    init_metrics, metrics_app, metrics_middleware, track_attendance_recorded,
    track_enrollment_created, track_enrollment_transition, track_login_failure,
    track_login_success, track_message_sent, track_submission_created, track_submission_graded,
    track_token_issued, track_user_registered,
};

#[cfg(not(feature = "observability"))]
pub mod stubs {
    use axum::{extract::Request, middleware::Next, response::Response};

    pub fn is_observability_enabled() -> bool {
        false
    }

    pub async fn logging_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub async fn metrics_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub fn init_tracing() -> anyhow::Result<()> {
        crate::init_basic_console_logging();
        Ok(())
    }

    pub async fn shutdown_tracer() {}

    pub fn init_metrics() -> anyhow::Result<Option<()>> {
        Ok(None)
    }

    pub fn track_user_registered(_role: &str) {}
    pub fn track_login_success(_role: &str) {}
    pub fn track_login_failure(_reason: &str) {}
    pub fn track_token_issued(_kind: &str) {}
    pub fn track_enrollment_created() {}
    pub fn track_enrollment_transition(_from: &str, _to: &str) {}
    pub fn track_submission_created(_status: &str) {}
    pub fn track_submission_graded() {}
    pub fn track_attendance_recorded(_status: &str) {}
    pub fn track_message_sent() {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
