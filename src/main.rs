//! Entry point: load config, wire dependencies, and run the server.

use gamesquad::config::Config;
use gamesquad::db;
use gamesquad::repositories::{MemoryRecordStore, RecordStore, SqlRecordStore};
use gamesquad::services::retention::spawn_retention;
use gamesquad::{cors_layer, create_app, AppState};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store: Arc<dyn RecordStore> = if config.database_url == "memory" {
        tracing::warn!("DATABASE_URL=memory: records will not survive a restart");
        Arc::new(MemoryRecordStore::new())
    } else {
        let pool = db::create_pool(&config.database_url).await?;
        Arc::new(SqlRecordStore::new(pool))
    };

    let state = AppState::new(store.clone()).with_heartbeat(config.heartbeat);
    let _retention = spawn_retention(
        store,
        state.coordinator().clone(),
        config.record_retention_days,
        config.retention_interval,
    );

    let app = create_app(state)
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(cors_layer(&config.cors_origin)?)
        .layer(TraceLayer::new_for_http());

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
