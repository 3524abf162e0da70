use std::net::SocketAddr;
use std::sync::Arc;

use hirelane_api::{app, gateway::StaticChargeLookup, AppState};
use hirelane_core::notify::TracingSender;
use hirelane_store::MemoryStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hirelane_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = hirelane_store::Config::load().expect("Failed to load config");
    tracing::info!("Starting Hirelane API on port {}", config.server.port);

    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        notifier: Arc::new(TracingSender),
        charges: Arc::new(StaticChargeLookup::new()),
        pricing: config.pricing_settings(),
        refund_policy: config.refund_policy(),
        admin_email: config.notifications.admin_email.clone(),
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    axum::serve(listener, app).await.expect("server error");
}
