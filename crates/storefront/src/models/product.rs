//! Catalog product views and listing filters.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bhavani_core::{Price, ProductId, Size, like_pattern};

use super::{ValidationError, non_blank};

/// Default page size for catalog listings.
pub const DEFAULT_PAGE_SIZE: i64 = 24;

/// Largest page a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A published product as shown in listings.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub images: Vec<String>,
    /// Units on hand across all sizes.
    pub total_stock: i64,
    pub created_at: DateTime<Utc>,
}

/// Stock on hand for one size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockLevel {
    pub size: Size,
    pub quantity: i32,
}

/// A published product with its stock broken down by size.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: ProductSummary,
    /// Per-size stock, in size order.
    pub stock: Vec<StockLevel>,
    pub updated_at: DateTime<Utc>,
}

/// A category and how many published products it holds.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryCount {
    pub category: String,
    pub product_count: i64,
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Catalog ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

impl CatalogSort {
    /// `ORDER BY` clause for this sort. Only ever one of these fixed strings.
    #[must_use]
    pub const fn order_by(self) -> &'static str {
        match self {
            Self::Newest => "p.created_at DESC, p.id DESC",
            Self::PriceAsc => "p.price ASC, p.id ASC",
            Self::PriceDesc => "p.price DESC, p.id DESC",
            Self::Name => "lower(p.name) ASC, p.id ASC",
        }
    }
}

impl FromStr for CatalogSort {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "newest" => Ok(Self::Newest),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "name" => Ok(Self::Name),
            other => Err(ValidationError::invalid(
                "sort",
                format_args!("unknown sort '{other}' (expected newest, price_asc, price_desc or name)"),
            )),
        }
    }
}

/// Raw catalog query string.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub in_stock_only: bool,
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A validated catalog filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFilter {
    pub category: Option<String>,
    /// `ILIKE` pattern with wildcards escaped.
    pub search_pattern: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock_only: bool,
    pub sort: CatalogSort,
    pub limit: i64,
    pub offset: i64,
}

impl CatalogQuery {
    /// Validate and normalize the query.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a negative price bound, a minimum above
    /// the maximum, a negative offset or an unknown sort.
    pub fn validate(self) -> Result<CatalogFilter, ValidationError> {
        for (field, bound) in [("min_price", self.min_price), ("max_price", self.max_price)] {
            if bound.is_some_and(|b| b.is_sign_negative() && !b.is_zero()) {
                return Err(ValidationError::invalid(field, "cannot be negative"));
            }
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price)
            && min > max
        {
            return Err(ValidationError::invalid(
                "min_price",
                "cannot be greater than max_price",
            ));
        }

        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err(ValidationError::invalid("offset", "cannot be negative"));
        }

        let sort = self
            .sort
            .as_deref()
            .map_or(Ok(CatalogSort::default()), CatalogSort::from_str)?;

        Ok(CatalogFilter {
            category: non_blank(self.category),
            search_pattern: non_blank(self.search).map(|s| like_pattern(&s)),
            min_price: self.min_price,
            max_price: self.max_price,
            in_stock_only: self.in_stock_only,
            sort,
            limit: self
                .limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            offset,
        })
    }
}
