//! Profile route handlers.

use axum::{Json, Router, extract::State, routing::get};
use tracing::instrument;

use crate::db::ProfileRepository;
use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::{Profile, ProfileUpdate};
use crate::state::AppState;

/// Profile routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/profile", get(get_profile).put(update_profile))
}

/// The caller's profile, created empty on first access.
#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn get_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Profile>> {
    let profile = ProfileRepository::new(state.pool())
        .get_or_create(user.id, user.email.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(profile))
}

/// Update name, phone and address fields.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<ProfileUpdate>,
) -> Result<Json<Profile>> {
    let update = body.validate()?;

    let repo = ProfileRepository::new(state.pool());
    repo.get_or_create(user.id, user.email.as_deref().unwrap_or_default())
        .await?;
    let profile = repo.update(user.id, &update).await?;

    Ok(Json(profile))
}
