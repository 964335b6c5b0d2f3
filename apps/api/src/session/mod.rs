// Per-client session state (auth + cart) behind a pluggable store.
// Replaces state that the web client used to keep in browser storage.

pub mod cart;
pub mod handlers;
pub mod store;

pub use store::{InMemorySessionStore, RedisSessionStore, SessionStore};
