//! Cart and Wishlist Items
//!
//! A cart line is identified by its (product, options) pair: the same product
//! with different variant options is a separate line, and adding a duplicate
//! pair merges quantities instead of creating a new row.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{Product, ProductId};

/// Variant selection for a cart line, e.g. size or colour.
///
/// Backed by an ordered map so two equal selections always compare and
/// serialize identically regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantOptions(BTreeMap<String, String>);

impl VariantOptions {
    /// No variant selection.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Builder-style insert of one option.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Whether no options are selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the selected options in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for VariantOptions {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A distinct line in the cart with its own quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Catalog product backing this line.
    pub product_id: ProductId,

    /// Display name, copied from the catalog at add time.
    pub name: String,

    /// Unit price snapshot taken at add time.
    pub price: Decimal,

    /// Pre-markdown unit price, when the product was on sale at add time.
    #[serde(default)]
    pub original_price: Option<Decimal>,

    /// Display image URL.
    #[serde(default)]
    pub image: String,

    /// Category tag; drives the category discount.
    pub category: String,

    /// Brand tag.
    #[serde(default)]
    pub brand: String,

    /// Number of units on this line. Always at least one; a line that would
    /// drop to zero is removed instead.
    pub quantity: u32,

    /// Variant selection that distinguishes this line.
    #[serde(default)]
    pub options: VariantOptions,

    /// When the line was created.
    pub added_at: DateTime<Utc>,

    /// When the line was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl CartItem {
    /// Create a line from a catalog snapshot.
    #[must_use]
    pub fn from_product(
        product: &Product,
        quantity: u32,
        options: VariantOptions,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            original_price: product.original_price,
            image: product.image.clone(),
            category: product.category.clone(),
            brand: product.brand.clone(),
            quantity,
            options,
            added_at: now,
            updated_at: now,
        }
    }

    /// Whether this line is the one identified by the given pair.
    #[must_use]
    pub fn matches(&self, product_id: ProductId, options: &VariantOptions) -> bool {
        self.product_id == product_id && &self.options == options
    }

    /// Price times quantity for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    /// Markdown savings on this line: `(original - price) * quantity` when the
    /// line was added below its original price, zero otherwise.
    #[must_use]
    pub fn markdown(&self) -> Decimal {
        match self.original_price {
            Some(original) if original > self.price => {
                (original - self.price) * Decimal::from(self.quantity)
            }
            _ => Decimal::ZERO,
        }
    }
}

/// A saved-for-later product. At most one entry per product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    /// Catalog product.
    pub product_id: ProductId,

    /// Cached display name.
    pub name: String,

    /// Cached unit price at the time of saving.
    pub price: Decimal,

    /// Cached display image URL.
    #[serde(default)]
    pub image: String,

    /// When the product was saved.
    pub added_at: DateTime<Utc>,
}
