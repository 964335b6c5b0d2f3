mod config;
mod errors;
mod models;
mod profile;
mod routes;
mod session;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, SessionStoreConfig};
use crate::routes::build_router;
use crate::session::{InMemorySessionStore, RedisSessionStore, SessionStore};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Job Board API v{}", env!("CARGO_PKG_VERSION"));

    let sessions = build_session_store(&config).await?;

    let state = AppState {
        config: config.clone(),
        sessions,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the web client's domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the session store named by `SESSION_BACKEND`.
async fn build_session_store(config: &Config) -> Result<Arc<dyn SessionStore>> {
    match &config.session_store {
        SessionStoreConfig::Memory => {
            info!("Session store: in-memory (sessions are lost on restart)");
            Ok(Arc::new(InMemorySessionStore::new()))
        }
        SessionStoreConfig::Redis { url, ttl_secs } => {
            let store = RedisSessionStore::connect(url, *ttl_secs)
                .await
                .context("Failed to connect to Redis")?;
            Ok(Arc::new(store))
        }
    }
}
