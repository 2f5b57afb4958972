use std::sync::Arc;

use axum::http::HeaderValue;
use mercari_items::config::{Config, StorageBackend};
use mercari_items::db::{ItemStore, JsonFileItemStore, SqliteItemStore};
use mercari_items::server::router::{ItemsState, cors_layer, items_router};
use mercari_items::service::ImageStore;
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        backend = ?cfg.storage.backend,
        database_url = %cfg.storage.database_url,
        items_json = %cfg.storage.items_json.display(),
        image_dir = %cfg.storage.image_dir.display(),
        front_url = %cfg.basic.front_url,
        loglevel = %cfg.basic.loglevel
    );

    let store: Arc<dyn ItemStore> = match cfg.storage.backend {
        StorageBackend::Sqlite => {
            Arc::new(SqliteItemStore::connect(&cfg.storage.database_url).await?)
        }
        StorageBackend::Json => Arc::new(JsonFileItemStore::new(cfg.storage.items_json.clone())),
    };
    let images = ImageStore::new(cfg.storage.image_dir.clone());

    let state = ItemsState::new(store, images);
    let origin = HeaderValue::from_str(&cfg.front_origin())?;
    let app = items_router(state).layer(cors_layer(origin));

    let listener = TcpListener::bind(cfg.basic.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.basic.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, starting shutdown"),
        _ = terminate => info!("received SIGTERM, starting shutdown"),
    }
}
