//! Cart lines, totals and the quantity rules shared by cart and wishlist.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bhavani_core::{CartItemId, Price, ProductId, Size};

use super::{ValidationError, non_blank};
use crate::db::RepositoryError;

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: i32 = 99;

/// Errors from cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Product does not exist or is not published.
    #[error("product not found")]
    ProductUnavailable,

    /// Product is not stocked in the requested size.
    #[error("size {0} is not available for this product")]
    SizeUnavailable(Size),

    /// Requested quantity outside `1..=MAX_LINE_QUANTITY`.
    #[error("quantity must be between 1 and {max}")]
    QuantityOutOfRange { max: i32 },

    /// Not enough units on hand.
    #[error("only {available} left in stock")]
    InsufficientStock { available: i32 },

    /// Cart line does not exist or belongs to someone else.
    #[error("cart item not found")]
    LineNotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CartError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Check a requested line quantity is within `1..=MAX_LINE_QUANTITY`.
///
/// # Errors
///
/// Returns `CartError::QuantityOutOfRange` otherwise.
pub fn check_quantity(quantity: i32) -> Result<i32, CartError> {
    if quantity < 1 || quantity > MAX_LINE_QUANTITY {
        return Err(CartError::QuantityOutOfRange {
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(quantity)
}

/// Quantity a line ends up with after adding `requested` units to an
/// existing line holding `existing` units, given `available` in stock.
///
/// # Errors
///
/// `QuantityOutOfRange` if `requested` or the sum is out of range,
/// `InsufficientStock` if the sum exceeds what is on hand.
pub fn resolve_line_quantity(
    available: i32,
    existing: i32,
    requested: i32,
) -> Result<i32, CartError> {
    let requested = check_quantity(requested)?;
    let total = existing.saturating_add(requested);
    if total > available {
        return Err(CartError::InsufficientStock { available });
    }
    check_quantity(total)
}

/// Body of `POST /api/cart` and `POST /api/wishlist/{id}/move-to-cart`.
#[derive(Debug, Deserialize)]
pub struct AddToCart {
    pub product_id: Option<ProductId>,
    pub size: Option<String>,
    pub quantity: Option<i32>,
}

/// Body of `POST /api/wishlist/{product_id}/move-to-cart`.
#[derive(Debug, Deserialize)]
pub struct MoveToCart {
    pub size: Option<String>,
    pub quantity: Option<i32>,
}

/// Body of `PATCH /api/cart/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateCartLine {
    pub quantity: Option<i32>,
}

impl AddToCart {
    /// Check required fields. The quantity defaults to one; its range is
    /// checked when the line is resolved against stock.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a missing product or an unknown size.
    pub fn validate(self) -> Result<(ProductId, Size, i32), ValidationError> {
        let product_id = self
            .product_id
            .ok_or_else(|| ValidationError::required("product_id"))?;
        let size = parse_size(self.size)?;
        Ok((product_id, size, self.quantity.unwrap_or(1)))
    }
}

impl MoveToCart {
    /// Check required fields; see [`AddToCart::validate`].
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a missing or unknown size.
    pub fn validate(self) -> Result<(Size, i32), ValidationError> {
        Ok((parse_size(self.size)?, self.quantity.unwrap_or(1)))
    }
}

impl UpdateCartLine {
    /// # Errors
    ///
    /// Returns `ValidationError` if the quantity is missing.
    pub fn validate(self) -> Result<i32, ValidationError> {
        self.quantity
            .ok_or_else(|| ValidationError::required("quantity"))
    }
}

fn parse_size(size: Option<String>) -> Result<Size, ValidationError> {
    non_blank(size)
        .ok_or_else(|| ValidationError::required("size"))?
        .parse()
        .map_err(|e| ValidationError::invalid("size", e))
}

/// One line of a customer's cart.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub size: Size,
    pub quantity: i32,
    pub unit_price: Price,
    pub line_total: Decimal,
    /// Units on hand for this size.
    pub stock: i32,
    /// False when the product was unpublished or stock dropped below the
    /// line quantity. Unavailable lines do not count toward the subtotal.
    pub available: bool,
    pub added_at: DateTime<Utc>,
}

/// A customer's cart with totals.
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub items: Vec<CartLine>,
    /// Units across available lines.
    pub item_count: i64,
    pub subtotal: Decimal,
}

impl Cart {
    /// Compute totals over the available lines.
    #[must_use]
    pub fn from_lines(items: Vec<CartLine>) -> Self {
        let (item_count, subtotal) = items
            .iter()
            .filter(|line| line.available)
            .fold((0_i64, Decimal::ZERO), |(count, total), line| {
                (count + i64::from(line.quantity), total + line.line_total)
            });

        Self {
            items,
            item_count,
            subtotal,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: i32, price: i64, quantity: i32, available: bool) -> CartLine {
        let unit_price = Price::inr(Decimal::from(price)).unwrap();
        CartLine {
            id: CartItemId::new(id),
            product_id: ProductId::new(id),
            name: format!("Kurta {id}"),
            slug: format!("kurta-{id}"),
            image: None,
            size: Size::M,
            quantity,
            unit_price,
            line_total: unit_price.times(quantity),
            stock: 10,
            available,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_line_within_stock() {
        assert_eq!(resolve_line_quantity(5, 0, 2).unwrap(), 2);
    }

    #[test]
    fn test_existing_line_is_increased() {
        assert_eq!(resolve_line_quantity(10, 3, 2).unwrap(), 5);
    }

    #[test]
    fn test_exceeding_stock() {
        let err = resolve_line_quantity(4, 3, 2).unwrap_err();
        assert!(matches!(err, CartError::InsufficientStock { available: 4 }));
    }

    #[test]
    fn test_out_of_stock_size() {
        let err = resolve_line_quantity(0, 0, 1).unwrap_err();
        assert!(matches!(err, CartError::InsufficientStock { available: 0 }));
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(matches!(
            resolve_line_quantity(500, 0, 0),
            Err(CartError::QuantityOutOfRange { .. })
        ));
        assert!(matches!(
            resolve_line_quantity(500, 0, -3),
            Err(CartError::QuantityOutOfRange { .. })
        ));
        assert!(matches!(
            resolve_line_quantity(500, 98, 2),
            Err(CartError::QuantityOutOfRange { .. })
        ));
        assert_eq!(resolve_line_quantity(500, 98, 1).unwrap(), MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_cart_totals_skip_unavailable_lines() {
        let cart = Cart::from_lines(vec![
            line(1, 1_299, 2, true),
            line(2, 850, 1, true),
            line(3, 4_000, 1, false),
        ]);
        assert_eq!(cart.items.len(), 3);
        assert_eq!(cart.item_count, 3);
        assert_eq!(cart.subtotal, Decimal::from(3_448));
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::from_lines(Vec::new());
        assert_eq!(cart.item_count, 0);
        assert_eq!(cart.subtotal, Decimal::ZERO);
    }

    #[test]
    fn test_add_to_cart_defaults_quantity() {
        let body: AddToCart =
            serde_json::from_str(r#"{"product_id": 7, "size": "free size"}"#).unwrap();
        let (product_id, size, quantity) = body.validate().unwrap();
        assert_eq!(product_id, ProductId::new(7));
        assert_eq!(size, Size::Free);
        assert_eq!(quantity, 1);
    }

    #[test]
    fn test_add_to_cart_requires_fields() {
        let body: AddToCart = serde_json::from_str(r#"{"size": "M"}"#).unwrap();
        assert_eq!(
            body.validate().unwrap_err().to_string(),
            "product_id is required"
        );

        let body: AddToCart = serde_json::from_str(r#"{"product_id": 7}"#).unwrap();
        assert_eq!(body.validate().unwrap_err().to_string(), "size is required");

        let body: AddToCart =
            serde_json::from_str(r#"{"product_id": 7, "size": "XXXL"}"#).unwrap();
        assert!(body.validate().unwrap_err().to_string().starts_with("size:"));
    }

    #[test]
    fn test_update_requires_quantity() {
        let body: UpdateCartLine = serde_json::from_str("{}").unwrap();
        assert!(body.validate().is_err());
        let body: UpdateCartLine = serde_json::from_str(r#"{"quantity": 0}"#).unwrap();
        assert_eq!(body.validate().unwrap(), 0);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CartError::SizeUnavailable(Size::Xl).to_string(),
            "size XL is not available for this product"
        );
        assert_eq!(
            CartError::InsufficientStock { available: 2 }.to_string(),
            "only 2 left in stock"
        );
    }
}
