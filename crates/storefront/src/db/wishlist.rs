//! Wishlist persistence.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument};

use bhavani_core::{CartItemId, ProductId, Size, UserId, WishlistItemId};

use super::cart::add_line;
use super::{RepositoryError, price_from_db};
use crate::models::CartError;
use crate::models::wishlist::WishlistEntry;

#[derive(sqlx::FromRow)]
struct WishlistRow {
    id: WishlistItemId,
    product_id: ProductId,
    name: String,
    slug: String,
    price: Decimal,
    image: Option<String>,
    is_draft: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<WishlistRow> for WishlistEntry {
    type Error = RepositoryError;

    fn try_from(row: WishlistRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            name: row.name,
            slug: row.slug,
            price: price_from_db(row.price)?,
            image: row.image,
            available: !row.is_draft,
            added_at: row.created_at,
        })
    }
}

/// Repository for wishlist operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The customer's wishlist, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list(&self, user_id: UserId) -> Result<Vec<WishlistEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistRow>(
            r"
            SELECT w.id, w.product_id, p.name, p.slug, p.price, p.images[1] AS image,
                   p.is_draft, w.created_at
            FROM wishlists w
            JOIN products p ON p.id = w.product_id
            WHERE w.user_id = $1
            ORDER BY w.created_at DESC, w.id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(WishlistEntry::try_from).collect()
    }

    /// Wishlist a published product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is missing or a
    /// draft, `RepositoryError::Conflict` if it is already wishlisted.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistItemId, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        insert_entry(&mut conn, user_id, product_id).await
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if it was not wishlisted.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        if delete_entry(&mut conn, user_id, product_id).await? {
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    /// Remove the product if wishlisted, add it otherwise. Returns whether
    /// the product is wishlisted afterwards.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when adding a missing or draft product.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn toggle(&self, user_id: UserId, product_id: ProductId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let wishlisted = if delete_entry(&mut tx, user_id, product_id).await? {
            false
        } else {
            insert_entry(&mut tx, user_id, product_id).await?;
            true
        };

        tx.commit().await?;
        debug!(wishlisted, "Wishlist toggled");
        Ok(wishlisted)
    }

    /// Add a wishlisted product to the cart and drop it from the wishlist,
    /// atomically.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository(NotFound)` if the product is not
    /// wishlisted, or any error adding to the cart can produce.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id, size = %size))]
    pub async fn move_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
        size: Size,
        quantity: i32,
    ) -> Result<CartItemId, CartError> {
        let mut tx = self.pool.begin().await?;

        let entry: Option<(WishlistItemId,)> = sqlx::query_as(
            "SELECT id FROM wishlists WHERE user_id = $1 AND product_id = $2 FOR UPDATE",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;
        if entry.is_none() {
            return Err(CartError::Repository(RepositoryError::NotFound));
        }

        let cart_item_id = add_line(&mut tx, user_id, product_id, size, quantity).await?;
        delete_entry(&mut tx, user_id, product_id).await?;

        tx.commit().await?;
        debug!(cart_item_id = %cart_item_id, "Moved wishlist item to cart");
        Ok(cart_item_id)
    }
}

async fn insert_entry(
    conn: &mut PgConnection,
    user_id: UserId,
    product_id: ProductId,
) -> Result<WishlistItemId, RepositoryError> {
    let row: Option<(WishlistItemId,)> = sqlx::query_as(
        r"
        INSERT INTO wishlists (user_id, product_id)
        SELECT $1, id FROM products WHERE id = $2 AND NOT is_draft
        RETURNING id
        ",
    )
    .bind(user_id)
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| RepositoryError::from_constraint(e, "product is already in your wishlist"))?;

    row.map(|(id,)| id).ok_or(RepositoryError::NotFound)
}

async fn delete_entry(
    conn: &mut PgConnection,
    user_id: UserId,
    product_id: ProductId,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query("DELETE FROM wishlists WHERE user_id = $1 AND product_id = $2")
        .bind(user_id)
        .bind(product_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
