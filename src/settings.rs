//! Cart Settings
//!
//! Process-wide pricing knobs, loaded once from the store and mutable only
//! through an explicit settings update on the engine.

use rust_decimal::Decimal;
use rusty_money::iso::{self, Currency};
use serde::{Deserialize, Serialize};

/// Pricing and behaviour settings for the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartSettings {
    /// Sales tax rate as a fraction, applied to the discounted subtotal.
    pub tax_rate: Decimal,

    /// Subtotal at or above which shipping is free.
    pub shipping_threshold: Decimal,

    /// Whether the maintenance tick re-persists the cart periodically.
    pub auto_save: bool,

    /// Whether the host UI should surface change notifications.
    pub notifications: bool,

    /// ISO 4217 currency tag used for presentation.
    pub currency: String,
}

impl Default for CartSettings {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(8, 2),
            shipping_threshold: Decimal::from(50u32),
            auto_save: true,
            notifications: true,
            currency: "USD".to_owned(),
        }
    }
}

impl CartSettings {
    /// Resolve the configured currency tag, falling back to USD when the tag
    /// is not a known ISO code.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        iso::find(&self.currency).unwrap_or(iso::USD)
    }
}
