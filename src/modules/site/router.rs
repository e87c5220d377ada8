use axum::{Router, routing::get};

use crate::modules::dashboards::controller::public_stats;
use crate::state::AppState;

use super::controller::{get_home, get_statistics, search, update_statistics};

/// Public landing-page routes, mounted directly under `/api`.
pub fn init_site_router() -> Router<AppState> {
    Router::new()
        .route("/statistics", get(get_statistics).put(update_statistics))
        .route("/stats", get(public_stats))
        .route("/home", get(get_home))
        .route("/search", get(search))
}
