use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{create_news, delete_news, get_news, get_news_list, update_news};

pub fn init_news_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_news_list).post(create_news))
        .route("/{id}", get(get_news).put(update_news).delete(delete_news))
}
