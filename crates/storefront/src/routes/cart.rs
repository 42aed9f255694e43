//! Cart route handlers. Every route requires a bearer token.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use tracing::instrument;

use bhavani_core::{CartItemId, UserId};

use crate::db::{CartRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAuth;
use crate::models::Cart;
use crate::models::cart::{AddToCart, CartError, UpdateCartLine};
use crate::state::AppState;

/// Cart routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route(
            "/api/cart/{id}",
            patch(update_cart_item).delete(remove_cart_item),
        )
}

/// Load the caller's cart with totals.
pub(crate) async fn load_cart(state: &AppState, user_id: UserId) -> Result<Cart> {
    let lines = CartRepository::new(state.pool()).list(user_id).await?;
    Ok(Cart::from_lines(lines))
}

/// Show the cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn get_cart(State(state): State<AppState>, RequireAuth(user): RequireAuth) -> Result<Json<Cart>> {
    Ok(Json(load_cart(&state, user.id).await?))
}

/// Add a product size to the cart, merging with an existing line.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
async fn add_to_cart(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<AddToCart>,
) -> Result<Json<Cart>> {
    let (product_id, size, quantity) = body.validate()?;

    CartRepository::new(state.pool())
        .add(user.id, product_id, size, quantity)
        .await?;

    Ok(Json(load_cart(&state, user.id).await?))
}

/// Set a line's quantity; zero removes it.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
async fn update_cart_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<CartItemId>,
    ApiJson(body): ApiJson<UpdateCartLine>,
) -> Result<Json<Cart>> {
    let quantity = body.validate()?;

    CartRepository::new(state.pool())
        .set_quantity(user.id, id, quantity)
        .await?;

    Ok(Json(load_cart(&state, user.id).await?))
}

/// Remove a line.
#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn remove_cart_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<CartItemId>,
) -> Result<StatusCode> {
    CartRepository::new(state.pool())
        .remove(user.id, id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::Cart(CartError::LineNotFound),
            other => AppError::Database(other),
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// Empty the cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn clear_cart(State(state): State<AppState>, RequireAuth(user): RequireAuth) -> Result<StatusCode> {
    CartRepository::new(state.pool()).clear(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
