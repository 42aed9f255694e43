//! Cart persistence.
//!
//! A customer has at most one line per (product, size); adding the same
//! product and size again increases that line.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument};

use bhavani_core::{CartItemId, ProductId, Size, UserId};

use super::{RepositoryError, price_from_db, size_from_db};
use crate::models::cart::{CartError, CartLine, check_quantity, resolve_line_quantity};

#[derive(sqlx::FromRow)]
struct CartLineRow {
    id: CartItemId,
    product_id: ProductId,
    name: String,
    slug: String,
    image: Option<String>,
    size: String,
    quantity: i32,
    price: Decimal,
    is_draft: bool,
    stock: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let unit_price = price_from_db(row.price)?;
        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            name: row.name,
            slug: row.slug,
            image: row.image,
            size: size_from_db(&row.size)?,
            quantity: row.quantity,
            unit_price,
            line_total: unit_price.times(row.quantity),
            stock: row.stock,
            available: !row.is_draft && row.stock >= row.quantity,
            added_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LockedLine {
    size: String,
    is_draft: bool,
    stock: Option<i32>,
}

/// Repository for cart operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All lines in a customer's cart, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT c.id, c.product_id, p.name, p.slug, p.images[1] AS image,
                   c.size, c.quantity, p.price, p.is_draft,
                   COALESCE(s.quantity, 0) AS stock, c.created_at
            FROM cart_items c
            JOIN products p ON p.id = c.product_id
            LEFT JOIN product_stock s ON s.product_id = c.product_id AND s.size = c.size
            WHERE c.user_id = $1
            ORDER BY c.created_at, c.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CartLine::try_from).collect()
    }

    /// Add units of a product size, merging into an existing line.
    ///
    /// # Errors
    ///
    /// See [`add_line`].
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id, size = %size))]
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        size: Size,
        quantity: i32,
    ) -> Result<CartItemId, CartError> {
        let mut tx = self.pool.begin().await?;
        let id = add_line(&mut tx, user_id, product_id, size, quantity).await?;
        tx.commit().await?;
        Ok(id)
    }

    /// Set a line's quantity. Zero removes the line and returns `None`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if the line is not the customer's,
    /// `ProductUnavailable` if the product was unpublished, or a quantity or
    /// stock error.
    #[instrument(skip(self), fields(user_id = %user_id, item_id = %item_id))]
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<Option<CartItemId>, CartError> {
        if quantity == 0 {
            self.remove(user_id, item_id).await.map_err(|e| match e {
                RepositoryError::NotFound => CartError::LineNotFound,
                other => CartError::Repository(other),
            })?;
            return Ok(None);
        }
        let quantity = check_quantity(quantity)?;

        let mut tx = self.pool.begin().await?;

        let line = sqlx::query_as::<_, LockedLine>(
            r"
            SELECT c.size, p.is_draft, s.quantity AS stock
            FROM cart_items c
            JOIN products p ON p.id = c.product_id
            LEFT JOIN product_stock s ON s.product_id = c.product_id AND s.size = c.size
            WHERE c.id = $1 AND c.user_id = $2
            FOR UPDATE OF c
            ",
        )
        .bind(item_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CartError::LineNotFound)?;

        if line.is_draft {
            return Err(CartError::ProductUnavailable);
        }
        let Some(available) = line.stock else {
            return Err(CartError::SizeUnavailable(size_from_db(&line.size)?));
        };
        if quantity > available {
            return Err(CartError::InsufficientStock { available });
        }

        sqlx::query("UPDATE cart_items SET quantity = $2, updated_at = NOW() WHERE id = $1")
            .bind(item_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(quantity, "Cart line updated");
        Ok(Some(item_id))
    }

    /// Remove one line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not the customer's.
    #[instrument(skip(self), fields(user_id = %user_id, item_id = %item_id))]
    pub async fn remove(&self, user_id: UserId, item_id: CartItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
            .bind(item_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove every line in the customer's cart, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn clear(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        debug!(removed = result.rows_affected(), "Cart cleared");
        Ok(result.rows_affected())
    }
}

/// Add `quantity` units of a product size to a cart inside the caller's
/// transaction.
///
/// The stock row is locked for update before the existing line is read, so
/// adds for the same product size run one at a time and each sees the line
/// the previous one committed.
///
/// # Errors
///
/// - `CartError::ProductUnavailable` if the product is missing or a draft
/// - `CartError::SizeUnavailable` if the size is not stocked
/// - `CartError::QuantityOutOfRange` / `InsufficientStock` from
///   [`resolve_line_quantity`]
pub(crate) async fn add_line(
    conn: &mut PgConnection,
    user_id: UserId,
    product_id: ProductId,
    size: Size,
    quantity: i32,
) -> Result<CartItemId, CartError> {
    let published: Option<(bool,)> =
        sqlx::query_as("SELECT NOT is_draft FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?;
    if !matches!(published, Some((true,))) {
        return Err(CartError::ProductUnavailable);
    }

    let (available,): (i32,) = sqlx::query_as(
        "SELECT quantity FROM product_stock WHERE product_id = $1 AND size = $2 FOR UPDATE",
    )
    .bind(product_id)
    .bind(size.as_str())
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(CartError::SizeUnavailable(size))?;

    let existing: Option<(i32,)> = sqlx::query_as(
        "SELECT quantity FROM cart_items WHERE user_id = $1 AND product_id = $2 AND size = $3",
    )
    .bind(user_id)
    .bind(product_id)
    .bind(size.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    let new_quantity =
        resolve_line_quantity(available, existing.map_or(0, |(q,)| q), quantity)?;

    let (id,): (CartItemId,) = sqlx::query_as(
        r"
        INSERT INTO cart_items (user_id, product_id, size, quantity)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, product_id, size)
        DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = NOW()
        RETURNING id
        ",
    )
    .bind(user_id)
    .bind(product_id)
    .bind(size.as_str())
    .bind(new_quantity)
    .fetch_one(&mut *conn)
    .await?;

    debug!(cart_item_id = %id, quantity = new_quantity, "Cart line upserted");
    Ok(id)
}
