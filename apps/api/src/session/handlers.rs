use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::{AuthState, Session, SessionUser};
use crate::session::cart::{Cart, CartItem};
use crate::state::AppState;

/// Client view of a session. The auth token is never echoed back.
#[derive(Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub user: Option<SessionUser>,
    pub cart: Cart,
    pub cart_total_cents: i64,
    pub cart_item_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            user: session.auth.map(|a| a.user),
            cart_total_cents: session.cart.total_cents(),
            cart_item_count: session.cart.item_count(),
            cart: session.cart,
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let session = Session::new();
    state.sessions.save(&session).await?;
    info!("Session {} created", session.id);
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .sessions
        .load(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
    Ok(Json(session.into()))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.delete(id).await? {
        return Err(AppError::NotFound(format!("Session {id} not found")));
    }
    info!("Session {id} deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/:id/auth
pub async fn handle_login(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(auth): Json<AuthState>,
) -> Result<Json<SessionResponse>, AppError> {
    if auth.token.trim().is_empty() {
        return Err(AppError::Validation("token must not be empty".to_string()));
    }
    let session = state
        .sessions
        .update(id, &|s| {
            s.login(auth.clone());
            Ok(())
        })
        .await?;
    info!(role = ?auth.user.role, "Session {id} signed in as {}", auth.user.id);
    Ok(Json(session.into()))
}

/// DELETE /api/v1/sessions/:id/auth
pub async fn handle_logout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .sessions
        .update(id, &|s| {
            s.logout();
            Ok(())
        })
        .await?;
    info!("Session {id} signed out");
    Ok(Json(session.into()))
}

/// POST /api/v1/sessions/:id/cart/items
pub async fn handle_add_cart_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(item): Json<CartItem>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .sessions
        .update(id, &|s| s.cart.add(item.clone()))
        .await?;
    Ok(Json(session.into()))
}

/// DELETE /api/v1/sessions/:id/cart/items/:plan_id
pub async fn handle_remove_cart_item(
    State(state): State<AppState>,
    Path((id, plan_id)): Path<(Uuid, String)>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .sessions
        .update(id, &|s| {
            if s.cart.remove(&plan_id) {
                Ok(())
            } else {
                Err(AppError::NotFound(format!("Plan {plan_id} is not in the cart")))
            }
        })
        .await?;
    Ok(Json(session.into()))
}

/// DELETE /api/v1/sessions/:id/cart
pub async fn handle_clear_cart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .sessions
        .update(id, &|s| {
            s.cart.clear();
            Ok(())
        })
        .await?;
    Ok(Json(session.into()))
}
