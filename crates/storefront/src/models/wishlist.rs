//! Wishlist entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bhavani_core::{Price, ProductId, WishlistItemId};

/// A wishlisted product.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistEntry {
    pub id: WishlistItemId,
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Price,
    pub image: Option<String>,
    /// False once the product has been moved back to draft.
    pub available: bool,
    pub added_at: DateTime<Utc>,
}

/// Body of `POST /api/wishlist`.
#[derive(Debug, Deserialize)]
pub struct AddToWishlist {
    pub product_id: Option<ProductId>,
}

/// Result of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WishlistToggle {
    pub product_id: ProductId,
    pub wishlisted: bool,
}
