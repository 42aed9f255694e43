//! Contact form handler.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use tracing::instrument;

use crate::db::ContactRepository;
use crate::error::Result;
use crate::extract::ApiJson;
use crate::models::{ContactForm, ContactReceipt};
use crate::state::AppState;

/// Contact routes. Rate limiting is applied by the caller.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/contact", post(submit_contact_message))
}

/// Store a contact form submission.
#[instrument(skip_all)]
async fn submit_contact_message(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<ContactForm>,
) -> Result<(StatusCode, Json<ContactReceipt>)> {
    let message = form.validate()?;
    let receipt = ContactRepository::new(state.pool()).insert(&message).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
