//! Read-only catalog queries. Draft products are never returned.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use bhavani_core::ProductId;

use super::{RepositoryError, price_from_db, size_from_db};
use crate::models::{CatalogFilter, CategoryCount, Page, ProductDetail, ProductSummary, StockLevel};

const PRODUCT_COLUMNS: &str = r"
    p.id, p.name, p.slug, p.description, p.price, p.category, p.images,
    p.created_at, p.updated_at,
    COALESCE((SELECT SUM(s.quantity) FROM product_stock s WHERE s.product_id = p.id), 0)::BIGINT
        AS total_stock
";

/// Filter shared by the page query and the count query; `$1..$5` are the
/// filter parameters in `bind_filter!` order.
const CATALOG_WHERE: &str = r"
    WHERE NOT p.is_draft
      AND ($1::TEXT IS NULL OR lower(p.category) = lower($1))
      AND ($2::TEXT IS NULL OR p.name ILIKE $2 OR p.description ILIKE $2)
      AND ($3::NUMERIC IS NULL OR p.price >= $3)
      AND ($4::NUMERIC IS NULL OR p.price <= $4)
      AND (NOT $5 OR EXISTS (
            SELECT 1 FROM product_stock s WHERE s.product_id = p.id AND s.quantity > 0))
";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    slug: String,
    description: String,
    price: Decimal,
    category: String,
    images: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    total_stock: i64,
}

impl ProductRow {
    fn into_summary(self) -> Result<(ProductSummary, DateTime<Utc>), RepositoryError> {
        let summary = ProductSummary {
            id: self.id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            price: price_from_db(self.price)?,
            category: self.category,
            images: self.images,
            total_stock: self.total_stock,
            created_at: self.created_at,
        };
        Ok((summary, self.updated_at))
    }
}

#[derive(sqlx::FromRow)]
struct StockRow {
    size: String,
    quantity: i32,
}

macro_rules! bind_filter {
    ($query:expr, $filter:expr) => {
        $query
            .bind($filter.category.as_deref())
            .bind($filter.search_pattern.as_deref())
            .bind($filter.min_price)
            .bind($filter.max_price)
            .bind($filter.in_stock_only)
    };
}

/// Repository for catalog reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List published products matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Page<ProductSummary>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p {CATALOG_WHERE} ORDER BY {} LIMIT $6 OFFSET $7",
            filter.sort.order_by()
        );
        let rows = bind_filter!(sqlx::query_as::<_, ProductRow>(&sql), filter)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM products p {CATALOG_WHERE}");
        let (total,): (i64,) = bind_filter!(sqlx::query_as(&count_sql), filter)
            .fetch_one(self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(|row| row.into_summary().map(|(summary, _)| summary))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            total,
            limit: filter.limit,
            offset: filter.offset,
        })
    }

    /// Get a published product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is missing or a draft.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: ProductId) -> Result<ProductDetail, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1 AND NOT p.is_draft");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        self.with_stock(row).await
    }

    /// Get a published product by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is missing or a draft.
    #[instrument(skip(self))]
    pub async fn get_by_slug(&self, slug: &str) -> Result<ProductDetail, RepositoryError> {
        let sql =
            format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.slug = $1 AND NOT p.is_draft");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        self.with_stock(row).await
    }

    /// Categories of published products with their product counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<CategoryCount>, RepositoryError> {
        let categories = sqlx::query_as::<_, CategoryCount>(
            r"
            SELECT category, COUNT(*) AS product_count
            FROM products
            WHERE NOT is_draft
            GROUP BY category
            ORDER BY category
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    async fn with_stock(&self, row: ProductRow) -> Result<ProductDetail, RepositoryError> {
        let stock_rows = sqlx::query_as::<_, StockRow>(
            "SELECT size, quantity FROM product_stock WHERE product_id = $1",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?;

        let mut stock = stock_rows
            .into_iter()
            .map(|s| {
                Ok(StockLevel {
                    size: size_from_db(&s.size)?,
                    quantity: s.quantity,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;
        stock.sort_by_key(|level| level.size);

        let (product, updated_at) = row.into_summary()?;
        Ok(ProductDetail {
            product,
            stock,
            updated_at,
        })
    }
}
