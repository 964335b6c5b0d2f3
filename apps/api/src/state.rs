use std::sync::Arc;

use crate::config::Config;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable session store. Default: in-memory. Swap via SESSION_BACKEND env.
    pub sessions: Arc<dyn SessionStore>,
}

#[cfg(test)]
impl AppState {
    pub fn for_tests() -> Self {
        use crate::config::SessionStoreConfig;
        use crate::session::InMemorySessionStore;

        Self {
            config: Config {
                port: 0,
                rust_log: "debug".to_string(),
                session_store: SessionStoreConfig::Memory,
            },
            sessions: Arc::new(InMemorySessionStore::new()),
        }
    }
}
