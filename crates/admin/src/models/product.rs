//! Product input validation and admin product views.
//!
//! The same validation backs the admin API and catalog seeding from the CLI.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bhavani_core::{Price, ProductId, ProductStatus, Size, Slug, like_pattern};

use super::{ValidationError, check_length, non_blank, page_limit, page_offset};

const MAX_NAME_LENGTH: usize = 200;
const MAX_CATEGORY_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 5000;
const MAX_IMAGES: usize = 10;
/// Largest quantity one size may be set to, and largest single adjustment.
pub const MAX_STOCK_QUANTITY: i32 = 100_000;
const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

/// Stock on hand for one size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub size: Size,
    pub quantity: i32,
}

/// A product as the admin console sees it, drafts included.
#[derive(Debug, Clone, Serialize)]
pub struct AdminProduct {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub images: Vec<String>,
    pub status: ProductStatus,
    pub total_stock: i64,
    /// Per-size stock, in size order.
    pub stock: Vec<StockEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// One `{size, quantity}` pair as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockInput {
    pub size: Option<String>,
    pub quantity: Option<i32>,
}

/// Body of `POST /api/products`, and one entry of a seed file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub is_draft: Option<bool>,
    #[serde(default)]
    pub stock: Vec<StockInput>,
}

/// A validated product ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub images: Vec<String>,
    pub status: ProductStatus,
    pub stock: Vec<StockEntry>,
}

impl ProductInput {
    /// Validate a new product. Products are drafts unless `is_draft` is
    /// explicitly false, in which case the publishing rules apply.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    pub fn validate(self) -> Result<NewProduct, ValidationError> {
        let (name, slug) = validate_name(non_blank(self.name))?;
        let category = validate_category(non_blank(self.category))?;
        let price = validate_price(self.price.ok_or_else(|| ValidationError::required("price"))?)?;
        let description = validate_description(self.description)?;
        let images = validate_images(self.images)?;
        let stock = normalize_stock(self.stock)?;

        let status = ProductStatus::from_is_draft(self.is_draft.unwrap_or(true));
        if status == ProductStatus::Published {
            check_publishable(price, &images)?;
        }

        Ok(NewProduct {
            name,
            slug,
            description,
            price,
            category,
            images,
            status,
            stock,
        })
    }
}

/// Body of `PUT /api/products/{id}`. Absent fields are unchanged; `stock`,
/// when present, replaces every stock row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub is_draft: Option<bool>,
    pub stock: Option<Vec<StockInput>>,
}

/// A validated partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedPatch {
    pub name: Option<(String, Slug)>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub status: Option<ProductStatus>,
    pub stock: Option<Vec<StockEntry>>,
}

impl ProductPatch {
    /// Validate the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found. A present but blank name
    /// or category is an error, not a no-op.
    pub fn validate(self) -> Result<ValidatedPatch, ValidationError> {
        Ok(ValidatedPatch {
            name: self
                .name
                .map(|n| validate_name(non_blank(Some(n))))
                .transpose()?,
            description: self
                .description
                .map(|d| validate_description(Some(d)))
                .transpose()?,
            price: self.price.map(validate_price).transpose()?,
            category: self
                .category
                .map(|c| validate_category(non_blank(Some(c))))
                .transpose()?,
            images: self.images.map(validate_images).transpose()?,
            status: self.is_draft.map(ProductStatus::from_is_draft),
            stock: self.stock.map(normalize_stock).transpose()?,
        })
    }
}

/// Body of `POST /api/products/{id}/stock/adjust`.
#[derive(Debug, Clone, Deserialize)]
pub struct StockAdjustment {
    pub size: Option<String>,
    pub delta: Option<i32>,
}

impl StockAdjustment {
    /// # Errors
    ///
    /// Returns `ValidationError` for a missing or unknown size, or a delta
    /// that is missing, zero, or larger than `MAX_STOCK_QUANTITY` either way.
    pub fn validate(self) -> Result<(Size, i32), ValidationError> {
        let size = parse_size(self.size)?;
        let delta = self
            .delta
            .ok_or_else(|| ValidationError::required("delta"))?;
        if delta == 0 {
            return Err(ValidationError::invalid("delta", "must not be zero"));
        }
        if delta.unsigned_abs() > MAX_STOCK_QUANTITY.unsigned_abs() {
            return Err(ValidationError::invalid(
                "delta",
                format_args!("must be between -{MAX_STOCK_QUANTITY} and {MAX_STOCK_QUANTITY}"),
            ));
        }
        Ok((size, delta))
    }
}

/// Check a product may be shown in the public catalog.
///
/// # Errors
///
/// Returns `ValidationError` if the price is zero or there are no images.
pub fn check_publishable(price: Price, images: &[String]) -> Result<(), ValidationError> {
    if price.is_zero() {
        return Err(ValidationError(
            "price must be greater than zero to publish".to_string(),
        ));
    }
    if images.is_empty() {
        return Err(ValidationError(
            "at least one image is required to publish".to_string(),
        ));
    }
    Ok(())
}

/// Validate stock input: known sizes, non-negative quantities, each size
/// at most once. Returned in size order.
///
/// # Errors
///
/// Returns `ValidationError` for the first invalid or repeated entry.
pub fn normalize_stock(input: Vec<StockInput>) -> Result<Vec<StockEntry>, ValidationError> {
    let mut seen = BTreeSet::new();
    let mut stock = Vec::with_capacity(input.len());

    for entry in input {
        let size = parse_size(entry.size)?;
        let quantity = entry.quantity.unwrap_or(0);
        if quantity < 0 {
            return Err(ValidationError::invalid(
                "stock",
                format_args!("quantity for size {size} cannot be negative"),
            ));
        }
        if quantity > MAX_STOCK_QUANTITY {
            return Err(ValidationError::invalid(
                "stock",
                format_args!("quantity for size {size} cannot exceed {MAX_STOCK_QUANTITY}"),
            ));
        }
        if !seen.insert(size) {
            return Err(ValidationError::invalid(
                "stock",
                format_args!("size {size} is listed more than once"),
            ));
        }
        stock.push(StockEntry { size, quantity });
    }

    stock.sort_by_key(|entry| entry.size);
    Ok(stock)
}

fn parse_size(size: Option<String>) -> Result<Size, ValidationError> {
    non_blank(size)
        .ok_or_else(|| ValidationError::required("size"))?
        .parse()
        .map_err(|e| ValidationError::invalid("size", e))
}

fn validate_name(name: Option<String>) -> Result<(String, Slug), ValidationError> {
    let name = name.ok_or_else(|| ValidationError::required("name"))?;
    check_length("name", &name, MAX_NAME_LENGTH)?;
    let slug = Slug::from_name(&name).map_err(|e| ValidationError::invalid("name", e))?;
    Ok((name, slug))
}

fn validate_category(category: Option<String>) -> Result<String, ValidationError> {
    let category = category.ok_or_else(|| ValidationError::required("category"))?;
    check_length("category", &category, MAX_CATEGORY_LENGTH)?;
    Ok(category)
}

fn validate_price(price: Decimal) -> Result<Price, ValidationError> {
    Price::inr(price).map_err(|e| ValidationError::invalid("price", e))
}

fn validate_description(description: Option<String>) -> Result<String, ValidationError> {
    let description = description.map(|d| d.trim().to_owned()).unwrap_or_default();
    check_length("description", &description, MAX_DESCRIPTION_LENGTH)?;
    Ok(description)
}

fn validate_images(images: Vec<String>) -> Result<Vec<String>, ValidationError> {
    if images.len() > MAX_IMAGES {
        return Err(ValidationError::invalid(
            "images",
            format_args!("at most {MAX_IMAGES} images are allowed"),
        ));
    }
    images
        .into_iter()
        .map(|image| {
            let image = image.trim().to_owned();
            let is_url = url::Url::parse(&image)
                .is_ok_and(|u| matches!(u.scheme(), "http" | "https"));
            if is_url {
                Ok(image)
            } else {
                Err(ValidationError::invalid(
                    "images",
                    format_args!("'{image}' is not an http(s) URL"),
                ))
            }
        })
        .collect()
}

/// Raw query string of `GET /api/products`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Validated admin product listing filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductListFilter {
    /// `None` lists both drafts and published products.
    pub status: Option<ProductStatus>,
    pub search_pattern: Option<String>,
    pub category: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl ProductListQuery {
    /// # Errors
    ///
    /// Returns `ValidationError` for an unknown status or a negative offset.
    pub fn validate(self) -> Result<ProductListFilter, ValidationError> {
        let status = match non_blank(self.status).as_deref() {
            None | Some("all") => None,
            Some(other) => Some(other.parse::<ProductStatus>().map_err(|_| {
                ValidationError::invalid("status", "expected all, draft or published")
            })?),
        };

        Ok(ProductListFilter {
            status,
            search_pattern: non_blank(self.search).map(|s| like_pattern(&s)),
            category: non_blank(self.category),
            limit: page_limit(self.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE),
            offset: page_offset(self.offset)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input() -> ProductInput {
        ProductInput {
            name: Some("Kanjivaram Silk Saree".to_string()),
            description: Some("  Pure zari border. ".to_string()),
            price: Some(Decimal::new(1_249_900, 2)),
            category: Some("Sarees".to_string()),
            images: vec!["https://cdn.bhavani.shop/kanjivaram.jpg".to_string()],
            is_draft: None,
            stock: vec![
                StockInput {
                    size: Some("free size".to_string()),
                    quantity: Some(4),
                },
            ],
        }
    }

    #[test]
    fn test_valid_input_defaults_to_draft() {
        let product = input().validate().unwrap();
        assert_eq!(product.slug.as_str(), "kanjivaram-silk-saree");
        assert_eq!(product.description, "Pure zari border.");
        assert_eq!(product.status, ProductStatus::Draft);
        assert_eq!(
            product.stock,
            vec![StockEntry {
                size: Size::Free,
                quantity: 4
            }]
        );
    }

    #[test]
    fn test_required_fields() {
        let err = ProductInput {
            name: Some("  ".to_string()),
            ..input()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "name is required");

        let err = ProductInput {
            category: None,
            ..input()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "category is required");

        let err = ProductInput {
            price: None,
            ..input()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "price is required");
    }

    #[test]
    fn test_invalid_price() {
        let err = ProductInput {
            price: Some(Decimal::new(-100, 0)),
            ..input()
        }
        .validate()
        .unwrap_err();
        assert!(err.to_string().starts_with("price:"));
    }

    #[test]
    fn test_name_without_slug_characters() {
        let err = ProductInput {
            name: Some("***".to_string()),
            ..input()
        }
        .validate()
        .unwrap_err();
        assert!(err.to_string().starts_with("name:"));
    }

    #[test]
    fn test_publishing_on_create_requires_image() {
        let err = ProductInput {
            is_draft: Some(false),
            images: Vec::new(),
            ..input()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "at least one image is required to publish");

        let product = ProductInput {
            is_draft: Some(false),
            ..input()
        }
        .validate()
        .unwrap();
        assert_eq!(product.status, ProductStatus::Published);
    }

    #[test]
    fn test_check_publishable_requires_price() {
        let images = vec!["https://cdn.bhavani.shop/a.jpg".to_string()];
        assert!(check_publishable(Price::ZERO, &images).is_err());
        let price = Price::inr(Decimal::from(999)).unwrap();
        assert!(check_publishable(price, &images).is_ok());
    }

    #[test]
    fn test_images_must_be_urls() {
        let err = ProductInput {
            images: vec!["kanjivaram.jpg".to_string()],
            ..input()
        }
        .validate()
        .unwrap_err();
        assert!(err.to_string().starts_with("images:"));
    }

    #[test]
    fn test_normalize_stock_sorts_by_size() {
        let stock = normalize_stock(vec![
            StockInput {
                size: Some("XL".to_string()),
                quantity: Some(1),
            },
            StockInput {
                size: Some("s".to_string()),
                quantity: None,
            },
        ])
        .unwrap();
        assert_eq!(
            stock,
            vec![
                StockEntry {
                    size: Size::S,
                    quantity: 0
                },
                StockEntry {
                    size: Size::Xl,
                    quantity: 1
                },
            ]
        );
    }

    #[test]
    fn test_normalize_stock_rejects_duplicates_and_negatives() {
        let duplicate = normalize_stock(vec![
            StockInput {
                size: Some("M".to_string()),
                quantity: Some(1),
            },
            StockInput {
                size: Some("m".to_string()),
                quantity: Some(2),
            },
        ]);
        assert_eq!(
            duplicate.unwrap_err().to_string(),
            "stock: size M is listed more than once"
        );

        let negative = normalize_stock(vec![StockInput {
            size: Some("L".to_string()),
            quantity: Some(-1),
        }]);
        assert!(negative.is_err());

        let unknown = normalize_stock(vec![StockInput {
            size: Some("4XL".to_string()),
            quantity: Some(1),
        }]);
        assert!(unknown.unwrap_err().to_string().starts_with("size:"));
    }

    #[test]
    fn test_patch_only_validates_present_fields() {
        let patch = ProductPatch {
            price: Some(Decimal::from(1_500)),
            ..ProductPatch::default()
        }
        .validate()
        .unwrap();
        assert!(patch.name.is_none());
        assert!(patch.stock.is_none());
        assert_eq!(patch.price, Some(Price::inr(Decimal::from(1_500)).unwrap()));
    }

    #[test]
    fn test_patch_rejects_blank_name() {
        let err = ProductPatch {
            name: Some(String::new()),
            ..ProductPatch::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn test_patch_regenerates_slug() {
        let patch = ProductPatch {
            name: Some("Chanderi Cotton Dupatta".to_string()),
            ..ProductPatch::default()
        }
        .validate()
        .unwrap();
        let (_, slug) = patch.name.unwrap();
        assert_eq!(slug.as_str(), "chanderi-cotton-dupatta");
    }

    #[test]
    fn test_stock_adjustment() {
        let adjustment = StockAdjustment {
            size: Some("xxl".to_string()),
            delta: Some(-2),
        };
        assert_eq!(adjustment.validate().unwrap(), (Size::Xxl, -2));

        let zero = StockAdjustment {
            size: Some("M".to_string()),
            delta: Some(0),
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_stock_adjustment_is_bounded() {
        for delta in [i32::MAX, i32::MIN, MAX_STOCK_QUANTITY + 1, -MAX_STOCK_QUANTITY - 1] {
            let adjustment = StockAdjustment {
                size: Some("S".to_string()),
                delta: Some(delta),
            };
            assert!(adjustment.validate().is_err(), "delta {delta} accepted");
        }

        let largest = StockAdjustment {
            size: Some("S".to_string()),
            delta: Some(-MAX_STOCK_QUANTITY),
        };
        assert_eq!(largest.validate().unwrap(), (Size::S, -MAX_STOCK_QUANTITY));
    }

    #[test]
    fn test_stock_quantity_is_bounded() {
        let err = normalize_stock(vec![StockInput {
            size: Some("M".to_string()),
            quantity: Some(MAX_STOCK_QUANTITY + 1),
        }])
        .unwrap_err();
        assert!(err.to_string().contains("cannot exceed"));
    }

    #[test]
    fn test_list_query() {
        let filter = ProductListQuery {
            status: Some("draft".to_string()),
            limit: Some(1_000),
            ..ProductListQuery::default()
        }
        .validate()
        .unwrap();
        assert_eq!(filter.status, Some(ProductStatus::Draft));
        assert_eq!(filter.limit, MAX_PAGE_SIZE);

        let all = ProductListQuery {
            status: Some("all".to_string()),
            ..ProductListQuery::default()
        }
        .validate()
        .unwrap();
        assert_eq!(all.status, None);

        assert!(
            ProductListQuery {
                status: Some("archived".to_string()),
                ..ProductListQuery::default()
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn test_deserialize_accepts_numeric_price_and_missing_lists() {
        let input: ProductInput = serde_json::from_value(serde_json::json!({
            "name": "Ikat Cotton Kurta",
            "price": 1499,
            "category": "Kurtas"
        }))
        .unwrap();
        let product = input.validate().unwrap();
        assert!(product.images.is_empty());
        assert!(product.stock.is_empty());
        assert_eq!(product.price, Price::inr(Decimal::from(1499)).unwrap());
    }
}
