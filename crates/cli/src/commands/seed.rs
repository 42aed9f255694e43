//! Catalog seeding from YAML.
//!
//! Entries are validated with the admin API's product rules before the
//! database is touched, so a bad file inserts nothing. Products whose slug
//! already exists are skipped and reported, which makes re-running the same
//! file safe.
//!
//! # File Format
//!
//! ```yaml
//! products:
//!   - name: Ikat Cotton Kurta
//!     price: 1499
//!     category: Kurtas
//!     description: Handwoven ikat, straight cut.
//!     images:
//!       - https://cdn.example.com/ikat.jpg
//!     stock:
//!       - { size: M, quantity: 5 }
//!       - { size: L, quantity: 2 }
//! ```

use std::path::Path;

use secrecy::ExposeSecret;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use bhavani_admin::db::{AdminProductRepository, RepositoryError};
use bhavani_admin::models::{NewProduct, ProductInput};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid catalog entries:\n{}", .0.join("\n"))]
    Invalid(Vec<String>),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    products: Vec<ProductInput>,
}

/// Outcome of a seeding run, by slug.
#[derive(Debug, Default)]
pub struct SeedReport {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

/// Seed products from a YAML catalog.
///
/// # Errors
///
/// Returns `SeedError::Invalid` listing every bad entry, or a read,
/// parse or database error.
pub async fn products(file_path: &str, publish: bool) -> Result<SeedReport, SeedError> {
    let content = tokio::fs::read_to_string(Path::new(file_path))
        .await
        .map_err(|source| SeedError::Read {
            path: file_path.to_owned(),
            source,
        })?;
    let products = parse_catalog(&content, publish)?;
    tracing::info!(path = %file_path, count = products.len(), "Catalog validated");

    let database_url = super::database_url().ok_or(SeedError::MissingEnvVar("DATABASE_URL"))?;
    let pool = PgPool::connect(database_url.expose_secret()).await?;
    let repo = AdminProductRepository::new(&pool);

    let mut report = SeedReport::default();
    for product in &products {
        let slug = product.slug.to_string();
        if repo.slug_exists(&slug).await? {
            tracing::warn!(%slug, "Product exists, skipping");
            report.skipped.push(slug);
            continue;
        }
        match repo.create(product).await {
            Ok(created) => {
                tracing::info!(%slug, product_id = %created.id, status = %created.status, "Product created");
                report.created.push(slug);
            }
            Err(RepositoryError::Conflict(_)) => {
                tracing::warn!(%slug, "Product created concurrently, skipping");
                report.skipped.push(slug);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(report)
}

/// Parse and validate a catalog. With `publish`, every entry is created as
/// published and must meet the publishing rules.
fn parse_catalog(content: &str, publish: bool) -> Result<Vec<NewProduct>, SeedError> {
    let catalog: CatalogFile = serde_yaml::from_str(content)?;

    let mut products = Vec::with_capacity(catalog.products.len());
    let mut errors = Vec::new();
    for (index, mut input) in catalog.products.into_iter().enumerate() {
        if publish {
            input.is_draft = Some(false);
        }
        let label = input
            .name
            .clone()
            .unwrap_or_else(|| format!("entry {}", index + 1));
        match input.validate() {
            Ok(product) => products.push(product),
            Err(e) => errors.push(format!("  {label}: {e}")),
        }
    }

    let mut seen = std::collections::HashSet::new();
    for product in &products {
        if !seen.insert(product.slug.as_str()) {
            errors.push(format!("  {}: duplicate slug '{}'", product.name, product.slug));
        }
    }

    if errors.is_empty() {
        Ok(products)
    } else {
        Err(SeedError::Invalid(errors))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use bhavani_core::ProductStatus;

    use super::*;

    const CATALOG: &str = r"
products:
  - name: Ikat Cotton Kurta
    price: 1499
    category: Kurtas
    images:
      - https://cdn.bhavani.shop/ikat.jpg
    stock:
      - { size: M, quantity: 5 }
      - { size: L, quantity: 2 }
  - name: Chanderi Dupatta
    price: '899.50'
    category: Dupattas
    images:
      - https://cdn.bhavani.shop/chanderi.jpg
";

    #[test]
    fn test_parse_catalog_creates_drafts() {
        let products = parse_catalog(CATALOG, false).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].slug.as_str(), "ikat-cotton-kurta");
        assert_eq!(products[0].stock.len(), 2);
        assert!(products.iter().all(|p| p.status == ProductStatus::Draft));
    }

    #[test]
    fn test_parse_catalog_publish() {
        let products = parse_catalog(CATALOG, true).unwrap();
        assert!(products.iter().all(|p| p.status == ProductStatus::Published));
    }

    #[test]
    fn test_publish_enforces_images() {
        let yaml = r"
products:
  - name: Plain Kurta
    price: 999
    category: Kurtas
";
        assert!(parse_catalog(yaml, false).is_ok());
        let err = parse_catalog(yaml, true).unwrap_err();
        assert!(err.to_string().contains("Plain Kurta: at least one image"));
    }

    #[test]
    fn test_reports_every_invalid_entry() {
        let yaml = r"
products:
  - name: No Price
    category: Kurtas
  - price: 10
    category: Kurtas
";
        let SeedError::Invalid(errors) = parse_catalog(yaml, false).unwrap_err() else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("No Price: price is required"));
        assert!(errors[1].contains("entry 2: name is required"));
    }

    #[test]
    fn test_rejects_duplicate_slugs_in_file() {
        let yaml = r"
products:
  - { name: Silk Saree, price: 5000, category: Sarees }
  - { name: 'Silk  Saree!', price: 5200, category: Sarees }
";
        let err = parse_catalog(yaml, false).unwrap_err();
        assert!(err.to_string().contains("duplicate slug 'silk-saree'"));
    }
}
