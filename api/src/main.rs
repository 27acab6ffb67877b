use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod ai;
mod app;
mod config;
mod error;
mod extract;
mod middleware;
mod routes;
mod seed;
mod state;
mod storage;
mod user;

use crate::ai::AiService;
use crate::config::{AppConfig, ConfigError, StorageBackend};
use crate::seed::SeedError;
use crate::state::AppState;
use crate::storage::{MemoryStorage, PgStorage, Storage, StorageError};

#[derive(Debug, thiserror::Error)]
enum BootError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
    #[error("seeding: {0}")]
    Seed(#[from] SeedError),
    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sovereign_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    std::panic::set_hook(Box::new(|info| {
        tracing::error!(panic = %info, "panic");
    }));

    if let Err(err) = run().await {
        tracing::error!(error = %err, "Sovereign API failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BootError> {
    let config = AppConfig::from_env()?;

    let storage: Arc<dyn Storage> = match (config.storage, &config.database) {
        (StorageBackend::Postgres, Some(database)) => {
            let pg = PgStorage::connect(database).await?;
            pg.migrate().await?;
            tracing::info!(max_connections = database.max_connections, "connected to Postgres");
            Arc::new(pg)
        }
        _ => {
            tracing::warn!("using in-memory storage; data is lost on restart");
            Arc::new(MemoryStorage::new())
        }
    };

    seed::ensure_demo_user(storage.as_ref(), &config.demo_user_id).await?;
    if config.seed_demo {
        seed::seed_demo_data(storage.as_ref(), &config.demo_user_id).await?;
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let ai = AiService::mock(config.timezone);
    let app = app::build_router(AppState::new(storage, ai, config));

    tracing::info!("Sovereign API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
