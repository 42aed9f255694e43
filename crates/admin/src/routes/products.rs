//! Product management route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use tracing::instrument;

use bhavani_core::{ProductId, ProductStatus};

use super::not_found;
use crate::db::{AdminProductRepository, ProductError, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAdmin;
use crate::models::product::normalize_stock;
use crate::models::{
    AdminProduct, Page, ProductInput, ProductListQuery, ProductPatch, StockAdjustment, StockInput,
};
use crate::state::AppState;

/// Product routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/api/products/{id}/publish", post(publish_product))
        .route("/api/products/{id}/unpublish", post(unpublish_product))
        .route("/api/products/{id}/stock", put(replace_stock))
        .route("/api/products/{id}/stock/adjust", post(adjust_stock))
}

fn product_error(err: ProductError) -> AppError {
    match err {
        ProductError::Repository(RepositoryError::NotFound) => {
            AppError::NotFound("Product not found".to_string())
        }
        other => other.into(),
    }
}

/// List products of every status.
#[instrument(skip(state, admin, query), fields(user_id = %admin.id))]
async fn list_products(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiQuery(query): ApiQuery<ProductListQuery>,
) -> Result<Json<Page<AdminProduct>>> {
    let filter = query.validate()?;
    let page = AdminProductRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(page))
}

/// Create a product with its stock.
#[instrument(skip(state, admin, body), fields(user_id = %admin.id))]
async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(body): ApiJson<ProductInput>,
) -> Result<(StatusCode, Json<AdminProduct>)> {
    let product = body.validate()?;
    let created = AdminProductRepository::new(state.pool())
        .create(&product)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get a product with stock by size.
#[instrument(skip(state, admin), fields(user_id = %admin.id))]
async fn get_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<AdminProduct>> {
    let product = AdminProductRepository::new(state.pool())
        .get(id)
        .await
        .map_err(not_found("Product"))?;
    Ok(Json(product))
}

/// Apply a partial update.
#[instrument(skip(state, admin, body), fields(user_id = %admin.id))]
async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<ProductPatch>,
) -> Result<Json<AdminProduct>> {
    let patch = body.validate()?;
    let product = AdminProductRepository::new(state.pool())
        .update(id, patch)
        .await
        .map_err(product_error)?;
    Ok(Json(product))
}

/// Delete a product. Images in our bucket are removed afterwards; a storage
/// failure is logged and does not fail the request.
#[instrument(skip(state, admin), fields(user_id = %admin.id))]
async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<StatusCode> {
    let images = AdminProductRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(not_found("Product"))?;

    let storage = state.storage();
    let paths: Vec<String> = images
        .iter()
        .filter_map(|url| storage.path_from_public_url(url))
        .collect();
    if let Err(e) = storage.remove(&paths).await {
        tracing::warn!(product_id = %id, error = %e, "Failed to remove product images");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Make a product visible in the catalog.
#[instrument(skip(state, admin), fields(user_id = %admin.id))]
async fn publish_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<AdminProduct>> {
    let product = AdminProductRepository::new(state.pool())
        .set_status(id, ProductStatus::Published)
        .await
        .map_err(product_error)?;
    Ok(Json(product))
}

/// Return a product to draft.
#[instrument(skip(state, admin), fields(user_id = %admin.id))]
async fn unpublish_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<AdminProduct>> {
    let product = AdminProductRepository::new(state.pool())
        .set_status(id, ProductStatus::Draft)
        .await
        .map_err(product_error)?;
    Ok(Json(product))
}

/// Replace every stock row. The body is an array of `{size, quantity}`.
#[instrument(skip(state, admin, body), fields(user_id = %admin.id))]
async fn replace_stock(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<Vec<StockInput>>,
) -> Result<Json<AdminProduct>> {
    let stock = normalize_stock(body)?;
    let product = AdminProductRepository::new(state.pool())
        .replace_stock(id, &stock)
        .await
        .map_err(not_found("Product"))?;
    Ok(Json(product))
}

/// Add to or take from one size's stock.
#[instrument(skip(state, admin, body), fields(user_id = %admin.id))]
async fn adjust_stock(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<StockAdjustment>,
) -> Result<Json<AdminProduct>> {
    let (size, delta) = body.validate()?;
    let product = AdminProductRepository::new(state.pool())
        .adjust_stock(id, size, delta)
        .await
        .map_err(not_found("Product"))?;
    Ok(Json(product))
}
