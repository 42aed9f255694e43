//! Dashboard summary.

use serde::Serialize;

use bhavani_core::{ProductId, Size};

/// Catalog size by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ProductCounts {
    pub total: i64,
    pub published: i64,
    pub draft: i64,
}

/// A size whose stock is at or below the low-stock threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LowStockItem {
    pub product_id: ProductId,
    pub name: String,
    pub size: Size,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub products: ProductCounts,
    pub unread_messages: i64,
    pub low_stock_threshold: i32,
    pub low_stock: Vec<LowStockItem>,
}
