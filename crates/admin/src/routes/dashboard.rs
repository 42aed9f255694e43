//! Dashboard route handler.

use axum::{Json, Router, extract::State, routing::get};
use tracing::instrument;

use crate::db::DashboardRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::Dashboard;
use crate::state::AppState;

/// Dashboard routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/dashboard", get(dashboard))
}

#[instrument(skip(state, admin), fields(user_id = %admin.id))]
async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Dashboard>> {
    let threshold = state.config().low_stock_threshold;
    let summary = DashboardRepository::new(state.pool())
        .summary(threshold)
        .await?;
    Ok(Json(summary))
}
