//! Demo Fixtures
//!
//! The storefront's demo product catalog, embedded as YAML so examples and
//! integration tests share one data set.

use thiserror::Error;

use crate::catalog::{InMemoryCatalog, Product};

const CATALOG_YAML: &str = include_str!("catalog.yaml");

/// Errors loading fixture data.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The embedded YAML could not be parsed.
    #[error(transparent)]
    Yaml(#[from] serde_norway::Error),
}

/// Load the demo catalog.
///
/// # Errors
///
/// Returns a [`FixtureError::Yaml`] if the embedded catalog fails to parse.
pub fn demo_catalog() -> Result<InMemoryCatalog, FixtureError> {
    let products: Vec<Product> = serde_norway::from_str(CATALOG_YAML)?;

    Ok(InMemoryCatalog::with_products(products))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::catalog::{ProductCatalog, ProductId};

    use super::*;

    #[test]
    fn demo_catalog_parses() -> TestResult {
        let catalog = demo_catalog()?;

        assert_eq!(catalog.len(), 6);

        Ok(())
    }

    #[test]
    fn headphones_carry_markdown_pricing() -> TestResult {
        let catalog = demo_catalog()?;

        let product = catalog
            .product(ProductId::new(1))
            .ok_or("missing headphones")?;

        assert_eq!(product.name, "Quantum Wireless Headphones");
        assert_eq!(product.price, Decimal::new(29999, 2));
        assert_eq!(product.original_price, Some(Decimal::new(39999, 2)));
        assert_eq!(product.category, "electronics");
        assert!(product.in_stock);

        Ok(())
    }

    #[test]
    fn every_demo_product_is_in_stock() -> TestResult {
        let catalog = demo_catalog()?;

        for id in 1..=6u64 {
            assert!(catalog.in_stock(ProductId::new(id)), "product {id}");
        }

        Ok(())
    }
}
