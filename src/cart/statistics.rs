//! Cart Statistics
//!
//! Aggregate figures about the current cart contents, surfaced on the
//! account page. Derived on demand, never persisted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{items::CartItem, pricing};

/// Aggregate view of the cart contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartStatistics {
    /// Sum of quantities.
    pub total_items: u32,

    /// Number of distinct lines.
    pub unique_items: usize,

    /// Cart subtotal.
    pub total_value: Decimal,

    /// Subtotal divided by total quantity; zero for an empty cart.
    pub average_item_price: Decimal,

    /// Distinct categories, in first-seen order.
    pub categories: Vec<String>,

    /// Distinct brands, in first-seen order.
    pub brands: Vec<String>,

    /// Lines added on the same calendar day as `now`.
    pub added_today: usize,
}

impl CartStatistics {
    /// Compute statistics for the given lines at the given instant.
    #[must_use]
    pub fn compute(items: &[CartItem], now: DateTime<Utc>) -> Self {
        let total_items = pricing::item_count(items);
        let total_value = pricing::subtotal(items);

        let average_item_price = if total_items == 0 {
            Decimal::ZERO
        } else {
            total_value / Decimal::from(total_items)
        };

        let today = now.date_naive();

        Self {
            total_items,
            unique_items: pricing::unique_item_count(items),
            total_value,
            average_item_price,
            categories: distinct(items.iter().map(|item| item.category.as_str())),
            brands: distinct(items.iter().map(|item| item.brand.as_str())),
            added_today: items
                .iter()
                .filter(|item| item.added_at.date_naive() == today)
                .count(),
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = Vec::new();

    for value in values {
        if !seen.iter().any(|existing: &String| existing == value) {
            seen.push(value.to_owned());
        }
    }

    seen
}
