//! Session persistence — pluggable, trait-based store.
//!
//! `InMemorySessionStore` keeps sessions in process (tests, single-node dev).
//! `RedisSessionStore` keeps them in Redis with a TTL.
//!
//! `AppState` holds an `Arc<dyn SessionStore>`, chosen at startup via config.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::Session;

/// A change applied to a session inside `SessionStore::update`.
/// May run more than once when a backend retries after a write conflict.
pub type SessionMutation<'a> = &'a (dyn Fn(&mut Session) -> Result<(), AppError> + Send + Sync);

/// Redis gives up after this many lost compare-and-set races.
const MAX_UPDATE_ATTEMPTS: usize = 16;

/// Implement this to add a storage backend without touching handlers.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<Option<Session>, AppError>;

    /// Inserts or replaces the session.
    async fn save(&self, session: &Session) -> Result<(), AppError>;

    /// Atomically loads, mutates and stores a session, refreshing
    /// `updated_at`. Concurrent updates of one session never overwrite each
    /// other. Nothing is written when `mutate` fails.
    async fn update(&self, id: Uuid, mutate: SessionMutation<'_>) -> Result<Session, AppError>;

    /// Returns `false` when no session with that id existed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory backend
// ────────────────────────────────────────────────────────────────────────────

/// Process-local store. Sessions never expire.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<Session>, AppError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn save(&self, session: &Session) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn update(&self, id: Uuid, mutate: SessionMutation<'_>) -> Result<Session, AppError> {
        // The write guard is held for the whole read-modify-write.
        let mut sessions = self.sessions.write().await;
        let stored = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;

        let mut next = stored.clone();
        mutate(&mut next)?;
        next.touch();
        *stored = next.clone();
        Ok(next)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.sessions.write().await.remove(&id).is_some())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Redis backend
// ────────────────────────────────────────────────────────────────────────────

/// Writes `ARGV[2]` only if the key still holds `ARGV[1]`.
const COMPARE_AND_SET: &str = r#"
if redis.call('GET', KEYS[1]) ~= ARGV[1] then
    return 0
end
redis.call('SET', KEYS[1], ARGV[2], 'EX', ARGV[3])
return 1
"#;

/// Stores each session as JSON under `session:{id}`; every save refreshes the TTL.
pub struct RedisSessionStore {
    conn: MultiplexedConnection,
    ttl_secs: u64,
    compare_and_set: redis::Script,
}

impl RedisSessionStore {
    pub async fn connect(redis_url: &str, ttl_secs: u64) -> Result<Self, AppError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Redis session store connected (ttl {ttl_secs}s)");
        Ok(Self {
            conn,
            ttl_secs,
            compare_and_set: redis::Script::new(COMPARE_AND_SET),
        })
    }

    async fn get_raw(&self, id: Uuid) -> Result<Option<String>, AppError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = redis::cmd("GET")
            .arg(session_key(id))
            .query_async(&mut conn)
            .await?;
        Ok(payload)
    }
}

fn session_key(id: Uuid) -> String {
    format!("session:{id}")
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<Session>, AppError> {
        match self.get_raw(id).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => {
                debug!("Session {id} not found in Redis");
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<(), AppError> {
        let payload = serde_json::to_string(session)?;
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(session_key(session.id))
            .arg(payload)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    /// Optimistic: re-reads and re-applies `mutate` whenever another writer
    /// changed the payload between our GET and the compare-and-set.
    async fn update(&self, id: Uuid, mutate: SessionMutation<'_>) -> Result<Session, AppError> {
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let original = self.get_raw(id).await?.ok_or_else(|| not_found(id))?;
            let mut session: Session = serde_json::from_str(&original)?;
            mutate(&mut session)?;
            session.touch();
            let payload = serde_json::to_string(&session)?;

            let mut conn = self.conn.clone();
            let written: i64 = self
                .compare_and_set
                .key(session_key(id))
                .arg(&original)
                .arg(&payload)
                .arg(self.ttl_secs)
                .invoke_async(&mut conn)
                .await?;
            if written == 1 {
                return Ok(session);
            }
            debug!("Session {id} changed concurrently (attempt {attempt}), retrying");
        }

        warn!("Session {id} update abandoned after {MAX_UPDATE_ATTEMPTS} attempts");
        Err(AppError::Conflict(format!(
            "Session {id} is being modified concurrently; retry the request"
        )))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut conn = self.conn.clone();
        let removed: i64 = redis::cmd("DEL")
            .arg(session_key(id))
            .query_async(&mut conn)
            .await?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::session::cart::CartItem;

    fn plan(plan_id: String) -> CartItem {
        CartItem {
            name: format!("{plan_id} plan"),
            plan_id,
            unit_price_cents: 100,
            quantity: 1,
        }
    }

    #[tokio::test]
    async fn test_memory_round_trip() {
        let store = InMemorySessionStore::new();
        let session = Session::new();
        store.save(&session).await.unwrap();

        let loaded = store.load(session.id).await.unwrap();
        assert_eq!(loaded, Some(session));
    }

    #[tokio::test]
    async fn test_memory_save_replaces() {
        let store = InMemorySessionStore::new();
        let mut session = Session::new();
        store.save(&session).await.unwrap();

        session.logout();
        store.save(&session).await.unwrap();

        let loaded = store.load(session.id).await.unwrap().unwrap();
        assert_eq!(loaded.updated_at, session.updated_at);
    }

    #[tokio::test]
    async fn test_memory_delete() {
        let store = InMemorySessionStore::new();
        let session = Session::new();
        store.save(&session).await.unwrap();

        assert!(store.delete(session.id).await.unwrap());
        assert!(!store.delete(session.id).await.unwrap());
        assert!(store.load(session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_update_returns_stored_session() {
        let store = InMemorySessionStore::new();
        let session = Session::new();
        store.save(&session).await.unwrap();

        let updated = store
            .update(session.id, &|s| s.cart.add(plan("basic".to_string())))
            .await
            .unwrap();

        assert_eq!(updated.cart.item_count(), 1);
        assert!(updated.updated_at >= session.updated_at);
        assert_eq!(store.load(session.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_memory_update_failure_leaves_session_untouched() {
        let store = InMemorySessionStore::new();
        let session = Session::new();
        store.save(&session).await.unwrap();

        let result = store
            .update(session.id, &|s| {
                s.cart.add(plan("basic".to_string()))?;
                Err(AppError::Validation("rejected".to_string()))
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.load(session.id).await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn test_memory_update_unknown_session() {
        let store = InMemorySessionStore::new();
        let result = store.update(Uuid::new_v4(), &|_| Ok(())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_memory_concurrent_updates_all_land() {
        let store = Arc::new(InMemorySessionStore::new());
        let session = Session::new();
        store.save(&session).await.unwrap();

        let tasks: Vec<_> = (0..200)
            .map(|n| {
                let store = Arc::clone(&store);
                let id = session.id;
                tokio::spawn(async move {
                    let item = plan(format!("plan-{n}"));
                    store.update(id, &|s| s.cart.add(item.clone())).await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let loaded = store.load(session.id).await.unwrap().unwrap();
        assert_eq!(loaded.cart.items.len(), 200);
    }

    #[test]
    fn test_session_key_format() {
        let id = Uuid::nil();
        assert_eq!(
            session_key(id),
            "session:00000000-0000-0000-0000-000000000000"
        );
    }
}
