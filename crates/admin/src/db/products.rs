//! Product and stock writes for the admin console.
//!
//! Every multi-row change runs in one transaction: create inserts the
//! product and its stock together, and a stock replacement deletes and
//! re-inserts all of a product's size rows before committing.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use thiserror::Error;
use tracing::instrument;

use bhavani_core::{ProductId, ProductStatus, Size};

use super::{RepositoryError, price_from_db, size_from_db};
use crate::models::product::check_publishable;
use crate::models::{
    AdminProduct, NewProduct, Page, ProductListFilter, StockEntry, ValidatedPatch, ValidationError,
};

const SLUG_CONFLICT: &str = "a product with this name already exists";

const PRODUCT_COLUMNS: &str =
    "id, name, slug, description, price, category, images, is_draft, created_at, updated_at";

const LIST_WHERE: &str = r"
    WHERE ($1::BOOLEAN IS NULL OR is_draft = $1)
      AND ($2::TEXT IS NULL OR name ILIKE $2 OR slug ILIKE $2)
      AND ($3::TEXT IS NULL OR lower(category) = lower($3))
";

/// Errors from product writes that enforce publishing rules.
#[derive(Debug, Error)]
pub enum ProductError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for ProductError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    slug: String,
    description: String,
    price: Decimal,
    category: String,
    images: Vec<String>,
    is_draft: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self, stock: Vec<StockEntry>) -> Result<AdminProduct, RepositoryError> {
        Ok(AdminProduct {
            id: self.id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            price: price_from_db(self.price)?,
            category: self.category,
            images: self.images,
            status: ProductStatus::from_is_draft(self.is_draft),
            total_stock: stock.iter().map(|s| i64::from(s.quantity)).sum(),
            stock,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StockRow {
    product_id: ProductId,
    size: String,
    quantity: i32,
}

/// Group stock rows by product, each product's sizes in size order.
fn group_stock(rows: Vec<StockRow>) -> Result<HashMap<ProductId, Vec<StockEntry>>, RepositoryError> {
    let mut grouped: HashMap<ProductId, Vec<StockEntry>> = HashMap::new();
    for row in rows {
        grouped.entry(row.product_id).or_default().push(StockEntry {
            size: size_from_db(&row.size)?,
            quantity: row.quantity,
        });
    }
    for stock in grouped.values_mut() {
        stock.sort_by_key(|entry| entry.size);
    }
    Ok(grouped)
}

/// Repository for admin product management.
pub struct AdminProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products of any status, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if a query fails or stored data is invalid.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &ProductListFilter,
    ) -> Result<Page<AdminProduct>, RepositoryError> {
        let is_draft = filter.status.map(ProductStatus::is_draft);

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products {LIST_WHERE} \
             ORDER BY updated_at DESC, id DESC LIMIT $4 OFFSET $5"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(is_draft)
            .bind(filter.search_pattern.as_deref())
            .bind(filter.category.as_deref())
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM products {LIST_WHERE}");
        let (total,): (i64,) = sqlx::query_as(&count_sql)
            .bind(is_draft)
            .bind(filter.search_pattern.as_deref())
            .bind(filter.category.as_deref())
            .fetch_one(self.pool)
            .await?;

        let ids: Vec<i32> = rows.iter().map(|row| row.id.as_i32()).collect();
        let stock_rows = sqlx::query_as::<_, StockRow>(
            "SELECT product_id, size, quantity FROM product_stock WHERE product_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;
        let mut stock = group_stock(stock_rows)?;

        let items = rows
            .into_iter()
            .map(|row| {
                let sizes = stock.remove(&row.id).unwrap_or_default();
                row.into_product(sizes)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            total,
            limit: filter.limit,
            offset: filter.offset,
        })
    }

    /// Get a product with its stock by size.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: ProductId) -> Result<AdminProduct, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut conn, id).await
    }

    /// Insert a product and its stock rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    #[instrument(skip(self, product), fields(slug = %product.slug))]
    pub async fn create(&self, product: &NewProduct) -> Result<AdminProduct, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (id,): (ProductId,) = sqlx::query_as(
            r"
            INSERT INTO products (name, slug, description, price, category, images, is_draft)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(&product.name)
        .bind(product.slug.as_str())
        .bind(&product.description)
        .bind(product.price.amount())
        .bind(&product.category)
        .bind(&product.images)
        .bind(product.status.is_draft())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, SLUG_CONFLICT))?;

        insert_stock(&mut tx, id, &product.stock).await?;
        let created = fetch_product(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(product_id = %id, "Product created");
        Ok(created)
    }

    /// Whether a product with this slug exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn slug_exists(&self, slug: &str) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM products WHERE slug = $1)")
                .bind(slug)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Apply a partial update. When the patch carries stock, the product's
    /// stock rows are replaced in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Validation` if the product would end up
    /// published without a price or image, and `RepositoryError::NotFound`
    /// or `Conflict` for a missing product or a taken slug.
    #[instrument(skip(self, patch), fields(product_id = %id))]
    pub async fn update(
        &self,
        id: ProductId,
        patch: ValidatedPatch,
    ) -> Result<AdminProduct, ProductError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 FOR UPDATE");
        let current = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let (name, slug) = match patch.name {
            Some((name, slug)) => (name, slug.as_str().to_owned()),
            None => (current.name, current.slug),
        };
        let price = match patch.price {
            Some(price) => price,
            None => price_from_db(current.price)?,
        };
        let images = patch.images.unwrap_or(current.images);
        let status = patch
            .status
            .unwrap_or_else(|| ProductStatus::from_is_draft(current.is_draft));
        if status == ProductStatus::Published {
            check_publishable(price, &images)?;
        }

        sqlx::query(
            r"
            UPDATE products
            SET name = $2, slug = $3, description = $4, price = $5, category = $6,
                images = $7, is_draft = $8, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&name)
        .bind(&slug)
        .bind(patch.description.unwrap_or(current.description))
        .bind(price.amount())
        .bind(patch.category.unwrap_or(current.category))
        .bind(&images)
        .bind(status.is_draft())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, SLUG_CONFLICT))?;

        if let Some(stock) = &patch.stock {
            delete_stock(&mut tx, id).await?;
            insert_stock(&mut tx, id, stock).await?;
        }

        let updated = fetch_product(&mut tx, id).await?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a product, returning its image URLs for storage cleanup.
    /// Stock, cart and wishlist rows go with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: ProductId) -> Result<Vec<String>, RepositoryError> {
        let (images,): (Vec<String>,) =
            sqlx::query_as("DELETE FROM products WHERE id = $1 RETURNING images")
                .bind(id)
                .fetch_optional(self.pool)
                .await?
                .ok_or(RepositoryError::NotFound)?;

        tracing::info!(product_id = %id, "Product deleted");
        Ok(images)
    }

    /// Publish or unpublish a product.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Validation` when publishing a product with no
    /// price or no images, and `RepositoryError::NotFound` if it is missing.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn set_status(
        &self,
        id: ProductId,
        status: ProductStatus,
    ) -> Result<AdminProduct, ProductError> {
        let mut tx = self.pool.begin().await?;

        let (price, images): (Decimal, Vec<String>) =
            sqlx::query_as("SELECT price, images FROM products WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(RepositoryError::NotFound)?;

        if status == ProductStatus::Published {
            check_publishable(price_from_db(price)?, &images)?;
        }

        sqlx::query("UPDATE products SET is_draft = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status.is_draft())
            .execute(&mut *tx)
            .await?;

        let product = fetch_product(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(product_id = %id, %status, "Product status changed");
        Ok(product)
    }

    /// Replace all stock rows of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self, stock), fields(product_id = %id))]
    pub async fn replace_stock(
        &self,
        id: ProductId,
        stock: &[StockEntry],
    ) -> Result<AdminProduct, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        lock_product(&mut tx, id).await?;
        delete_stock(&mut tx, id).await?;
        insert_stock(&mut tx, id, stock).await?;

        let product = fetch_product(&mut tx, id).await?;
        tx.commit().await?;
        Ok(product)
    }

    /// Add `delta` to one size's stock, creating the row if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the result would be negative
    /// and `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id, size = %size))]
    pub async fn adjust_stock(
        &self,
        id: ProductId,
        size: Size,
        delta: i32,
    ) -> Result<AdminProduct, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        lock_product(&mut tx, id).await?;
        sqlx::query(
            r"
            INSERT INTO product_stock (product_id, size, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (product_id, size)
            DO UPDATE SET quantity = product_stock.quantity + EXCLUDED.quantity
            ",
        )
        .bind(id)
        .bind(size.as_str())
        .bind(delta)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_check_violation() {
                    return RepositoryError::Conflict(format!(
                        "stock for size {size} cannot go below zero"
                    ));
                }
                // numeric_value_out_of_range
                if db_err.code().as_deref() == Some("22003") {
                    return RepositoryError::Conflict(format!(
                        "stock for size {size} is out of range"
                    ));
                }
            }
            RepositoryError::Database(e)
        })?;

        let product = fetch_product(&mut tx, id).await?;
        tx.commit().await?;
        Ok(product)
    }
}

async fn fetch_product(
    conn: &mut PgConnection,
    id: ProductId,
) -> Result<AdminProduct, RepositoryError> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    let stock_rows = sqlx::query_as::<_, StockRow>(
        "SELECT product_id, size, quantity FROM product_stock WHERE product_id = $1",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;
    let stock = group_stock(stock_rows)?.remove(&id).unwrap_or_default();

    row.into_product(stock)
}

/// Lock the product row and bump its `updated_at`.
async fn lock_product(conn: &mut PgConnection, id: ProductId) -> Result<(), RepositoryError> {
    sqlx::query("SELECT 1 FROM products WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RepositoryError::NotFound)?;
    touch(conn, id).await
}

async fn touch(conn: &mut PgConnection, id: ProductId) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE products SET updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn delete_stock(conn: &mut PgConnection, id: ProductId) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM product_stock WHERE product_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn insert_stock(
    conn: &mut PgConnection,
    id: ProductId,
    stock: &[StockEntry],
) -> Result<(), RepositoryError> {
    if stock.is_empty() {
        return Ok(());
    }
    let sizes: Vec<String> = stock.iter().map(|s| s.size.as_str().to_owned()).collect();
    let quantities: Vec<i32> = stock.iter().map(|s| s.quantity).collect();

    sqlx::query(
        r"
        INSERT INTO product_stock (product_id, size, quantity)
        SELECT $1, size, quantity FROM UNNEST($2::TEXT[], $3::INT[]) AS s(size, quantity)
        ",
    )
    .bind(id)
    .bind(&sizes)
    .bind(&quantities)
    .execute(&mut *conn)
    .await
    .map_err(|e| RepositoryError::from_constraint(e, "each size may appear only once"))?;
    Ok(())
}
