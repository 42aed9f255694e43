//! HTTP route handlers for the admin API.
//!
//! Every route requires an admin bearer token (see
//! [`RequireAdmin`](crate::middleware::RequireAdmin)).
//!
//! # Route Structure
//!
//! ```text
//! GET    /api/dashboard                    - Counts, unread messages, low stock
//!
//! # Products
//! GET    /api/products                     - List (all statuses)
//! POST   /api/products                     - Create (draft by default)
//! GET    /api/products/{id}                - Get with stock by size
//! PUT    /api/products/{id}                - Partial update, optional stock replace
//! DELETE /api/products/{id}                - Delete, then clean up images
//! POST   /api/products/{id}/publish        - Publish
//! POST   /api/products/{id}/unpublish      - Back to draft
//! PUT    /api/products/{id}/stock          - Replace stock by size
//! POST   /api/products/{id}/stock/adjust   - Relative stock change
//!
//! # Uploads
//! POST   /api/uploads                      - Multipart image upload (field `file`)
//!
//! # Contact inbox
//! GET    /api/contact-messages             - List
//! PATCH  /api/contact-messages/{id}        - Mark read/unread
//! DELETE /api/contact-messages/{id}        - Delete
//! ```

pub mod contact_messages;
pub mod dashboard;
pub mod products;
pub mod uploads;

use axum::Router;

use crate::db::RepositoryError;
use crate::error::AppError;
use crate::state::AppState;

/// Build the API router. `max_upload_bytes` bounds the upload route's body.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(dashboard::router())
        .merge(products::router())
        .merge(uploads::router(max_upload_bytes))
        .merge(contact_messages::router())
}

/// Map `RepositoryError::NotFound` to a 404 naming the missing thing.
fn not_found(what: &'static str) -> impl Fn(RepositoryError) -> AppError {
    move |err| match err {
        RepositoryError::NotFound => AppError::NotFound(format!("{what} not found")),
        other => AppError::Database(other),
    }
}
