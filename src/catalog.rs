//! Product Catalog
//!
//! The catalog is an external collaborator from the cart's point of view: the
//! engine only ever asks it for a product snapshot at add-to-cart time. Line
//! prices are copied out of the snapshot and never re-read, so later catalog
//! price changes do not touch existing cart lines.

use std::fmt;

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Stable identifier of a product in the catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    /// Wrap a raw catalog identifier.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Catalog snapshot of a product as returned at query time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog identifier.
    pub id: ProductId,

    /// Display name.
    pub name: String,

    /// Current unit price.
    pub price: Decimal,

    /// Pre-markdown price, when the product is on sale.
    #[serde(default)]
    pub original_price: Option<Decimal>,

    /// Display image URL. Opaque to pricing.
    #[serde(default)]
    pub image: String,

    /// Category tag, e.g. `electronics`. Drives the category discount.
    pub category: String,

    /// Brand tag. Opaque to pricing.
    #[serde(default)]
    pub brand: String,

    /// Whether the product can currently be added to a cart.
    pub in_stock: bool,
}

/// Read-only product lookup consumed by the cart engine.
pub trait ProductCatalog: fmt::Debug {
    /// Return a snapshot of the product, or `None` if the id is unknown.
    fn product(&self, id: ProductId) -> Option<Product>;

    /// Whether the product exists and is in stock.
    fn in_stock(&self, id: ProductId) -> bool {
        self.product(id).is_some_and(|product| product.in_stock)
    }
}

/// Catalog backed by an in-memory map, used by the demo data set and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: FxHashMap<ProductId, Product>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a list of products. Later duplicates win.
    #[must_use]
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let products = products
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        Self { products }
    }

    /// Insert or replace a product.
    pub fn insert(&mut self, product: Product) {
        self.products.insert(product.id, product);
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn product(&self, id: ProductId) -> Option<Product> {
        self.products.get(&id).cloned()
    }
}
