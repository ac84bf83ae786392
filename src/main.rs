use std::{net::SocketAddr, sync::Arc};

use rusteats::{
    config::{self, StorageBackend},
    routes,
    services::{memory_store::MemoryStore, mongo_store::MongoStore, store::Store, stripe::StripeClient},
    AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = config::load();

    let store: Arc<dyn Store> = match settings.storage_backend {
        StorageBackend::Mongo => Arc::new(
            MongoStore::connect(&settings.mongodb_uri, &settings.mongodb_db)
                .await
                .expect("Failed to connect to MongoDB"),
        ),
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage, nothing will be persisted");
            Arc::new(MemoryStore::new())
        }
    };

    if settings.stripe_webhook_secret.trim().is_empty() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET is empty, every webhook will be rejected");
    }

    let payments = Arc::new(StripeClient::new(
        settings.stripe_api_key.clone(),
        settings.stripe_api_base.clone(),
    ));

    let state = AppState {
        settings: settings.clone(),
        store,
        payments,
    };

    let app = routes::app(state);

    let ip = settings
        .host
        .parse::<std::net::IpAddr>()
        .expect("HOST must be an IP address");
    let addr = SocketAddr::from((ip, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
