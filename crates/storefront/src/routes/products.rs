//! Catalog route handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use tracing::instrument;

use bhavani_core::ProductId;

use super::not_found;
use crate::db::ProductRepository;
use crate::error::Result;
use crate::extract::{ApiPath, ApiQuery};
use crate::models::{CatalogQuery, CategoryCount, Page, ProductDetail, ProductSummary};
use crate::state::AppState;

/// Catalog routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
        .route("/api/products/slug/{slug}", get(get_product_by_slug))
        .route("/api/categories", get(list_categories))
}

/// List published products.
#[instrument(skip(state))]
async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CatalogQuery>,
) -> Result<Json<Page<ProductSummary>>> {
    let filter = query.validate()?;
    let page = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(page))
}

/// Product detail.
#[instrument(skip(state))]
async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<ProductDetail>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await
        .map_err(not_found("Product"))?;
    Ok(Json(product))
}

/// Product detail by slug.
#[instrument(skip(state))]
async fn get_product_by_slug(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<ProductDetail>> {
    let product = ProductRepository::new(state.pool())
        .get_by_slug(&slug)
        .await
        .map_err(not_found("Product"))?;
    Ok(Json(product))
}

/// Categories of published products.
#[instrument(skip(state))]
async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<CategoryCount>>> {
    let categories = ProductRepository::new(state.pool()).categories().await?;
    Ok(Json(categories))
}
