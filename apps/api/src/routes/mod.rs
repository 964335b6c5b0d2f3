pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::profile::handlers as profile;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profile completion
        .route(
            "/api/v1/profile/completion",
            post(profile::handle_profile_completion),
        )
        .route(
            "/api/v1/profile/tier/:percentage",
            get(profile::handle_tier),
        )
        .route(
            "/api/v1/applications/eligibility",
            post(profile::handle_eligibility),
        )
        // Sessions
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(session::handle_get_session).delete(session::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/auth",
            put(session::handle_login).delete(session::handle_logout),
        )
        .route(
            "/api/v1/sessions/:id/cart",
            delete(session::handle_clear_cart),
        )
        .route(
            "/api/v1/sessions/:id/cart/items",
            post(session::handle_add_cart_item),
        )
        .route(
            "/api/v1/sessions/:id/cart/items/:plan_id",
            delete(session::handle_remove_cart_item),
        )
        .with_state(state)
}
