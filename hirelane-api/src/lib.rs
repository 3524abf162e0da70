use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub mod error;
pub mod gateway;
pub mod quotes;
pub mod state;
pub mod webhooks;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(webhooks::routes())
        .merge(quotes::routes())
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
