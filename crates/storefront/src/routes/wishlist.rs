//! Wishlist route handlers. Every route requires a bearer token.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};
use serde_json::{Value, json};
use tracing::instrument;

use bhavani_core::ProductId;

use super::cart::load_cart;
use super::not_found;
use crate::db::{RepositoryError, WishlistRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAuth;
use crate::models::cart::{CartError, MoveToCart};
use crate::models::wishlist::{AddToWishlist, WishlistToggle};
use crate::models::{Cart, ValidationError, WishlistEntry};
use crate::state::AppState;

/// Wishlist routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/wishlist", get(list_wishlist).post(add_to_wishlist))
        .route("/api/wishlist/{product_id}", delete(remove_from_wishlist))
        .route("/api/wishlist/{product_id}/toggle", post(toggle_wishlist))
        .route("/api/wishlist/{product_id}/move-to-cart", post(move_to_cart))
}

/// List wishlisted products.
#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn list_wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<WishlistEntry>>> {
    let entries = WishlistRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(entries))
}

/// Wishlist a product.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
async fn add_to_wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<AddToWishlist>,
) -> Result<(StatusCode, Json<Value>)> {
    let product_id = body
        .product_id
        .ok_or_else(|| ValidationError::required("product_id"))?;

    let id = WishlistRepository::new(state.pool())
        .add(user.id, product_id)
        .await
        .map_err(not_found("Product"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "product_id": product_id })),
    ))
}

/// Remove a product from the wishlist.
#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn remove_from_wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(product_id): ApiPath<ProductId>,
) -> Result<StatusCode> {
    WishlistRepository::new(state.pool())
        .remove(user.id, product_id)
        .await
        .map_err(not_found("Wishlist item"))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Add or remove a product depending on whether it is wishlisted.
#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn toggle_wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(product_id): ApiPath<ProductId>,
) -> Result<Json<WishlistToggle>> {
    let wishlisted = WishlistRepository::new(state.pool())
        .toggle(user.id, product_id)
        .await
        .map_err(not_found("Product"))?;

    Ok(Json(WishlistToggle {
        product_id,
        wishlisted,
    }))
}

/// Move a wishlisted product into the cart.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
async fn move_to_cart(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(product_id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<MoveToCart>,
) -> Result<Json<Cart>> {
    let (size, quantity) = body.validate()?;

    WishlistRepository::new(state.pool())
        .move_to_cart(user.id, product_id, size, quantity)
        .await
        .map_err(|e| match e {
            CartError::Repository(RepositoryError::NotFound) => {
                AppError::NotFound("Wishlist item not found".to_string())
            }
            other => AppError::Cart(other),
        })?;

    Ok(Json(load_cart(&state, user.id).await?))
}
