use axum::{routing::get, Router};

use crate::AppState;

pub mod og;

pub fn build_router() -> Router<AppState> {
    Router::new()
        .route("/robots.txt", get(get_robots))
        .route("/og.png", get(og::get_og))
}

async fn get_robots() -> &'static str {
    "User-agent: *\nAllow: /\n"
}
