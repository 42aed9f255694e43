//! Aggregates for the admin dashboard.

use sqlx::PgPool;
use tracing::instrument;

use bhavani_core::ProductId;

use super::{RepositoryError, size_from_db};
use crate::models::{Dashboard, LowStockItem, ProductCounts};

const LOW_STOCK_LIMIT: i64 = 50;

#[derive(sqlx::FromRow)]
struct LowStockRow {
    product_id: ProductId,
    name: String,
    size: String,
    quantity: i32,
}

/// Repository for dashboard summaries.
pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    /// Create a new dashboard repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Build the dashboard. Low-stock rows are sizes with a quantity at or
    /// below `low_stock_threshold`, lowest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if a query fails or a stored size is invalid.
    #[instrument(skip(self))]
    pub async fn summary(&self, low_stock_threshold: i32) -> Result<Dashboard, RepositoryError> {
        let products = sqlx::query_as::<_, ProductCounts>(
            r"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE NOT is_draft) AS published,
                COUNT(*) FILTER (WHERE is_draft) AS draft
            FROM products
            ",
        )
        .fetch_one(self.pool)
        .await?;

        let (unread_messages,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM contact_messages WHERE NOT is_read")
                .fetch_one(self.pool)
                .await?;

        let rows = sqlx::query_as::<_, LowStockRow>(
            r"
            SELECT s.product_id, p.name, s.size, s.quantity
            FROM product_stock s
            JOIN products p ON p.id = s.product_id
            WHERE s.quantity <= $1
            ORDER BY s.quantity, p.name, s.size
            LIMIT $2
            ",
        )
        .bind(low_stock_threshold)
        .bind(LOW_STOCK_LIMIT)
        .fetch_all(self.pool)
        .await?;

        let low_stock = rows
            .into_iter()
            .map(|row| {
                Ok(LowStockItem {
                    product_id: row.product_id,
                    name: row.name,
                    size: size_from_db(&row.size)?,
                    quantity: row.quantity,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok(Dashboard {
            products,
            unread_messages,
            low_stock_threshold,
            low_stock,
        })
    }
}
