//! Contact inbox route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use tracing::instrument;

use bhavani_core::ContactMessageId;

use super::not_found;
use crate::db::ContactMessageRepository;
use crate::error::Result;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAdmin;
use crate::models::{ContactMessage, ContactMessageQuery, ContactMessageUpdate, Page};
use crate::state::AppState;

/// Contact inbox routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/contact-messages", get(list_messages))
        .route(
            "/api/contact-messages/{id}",
            patch(update_message).delete(delete_message),
        )
}

/// List messages, newest first.
#[instrument(skip(state, admin), fields(user_id = %admin.id))]
async fn list_messages(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiQuery(query): ApiQuery<ContactMessageQuery>,
) -> Result<Json<Page<ContactMessage>>> {
    let (limit, offset) = query.page()?;
    let page = ContactMessageRepository::new(state.pool())
        .list(query.unread_only, limit, offset)
        .await?;
    Ok(Json(page))
}

/// Mark a message read or unread.
#[instrument(skip(state, admin, body), fields(user_id = %admin.id))]
async fn update_message(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<ContactMessageId>,
    ApiJson(body): ApiJson<ContactMessageUpdate>,
) -> Result<Json<ContactMessage>> {
    let is_read = body.validate()?;
    let message = ContactMessageRepository::new(state.pool())
        .set_read(id, is_read)
        .await
        .map_err(not_found("Message"))?;
    Ok(Json(message))
}

#[instrument(skip(state, admin), fields(user_id = %admin.id))]
async fn delete_message(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<ContactMessageId>,
) -> Result<StatusCode> {
    ContactMessageRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(not_found("Message"))?;
    Ok(StatusCode::NO_CONTENT)
}
