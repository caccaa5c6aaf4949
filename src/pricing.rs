//! Pricing
//!
//! Derived cart pricing: subtotal, the built-in tiered and category
//! discounts, tax, shipping, and savings. Everything here is a pure function
//! of the current lines and settings; totals are recomputed on every query
//! and never cached, so they can never go stale after a mutation.
//!
//! All amounts are unrounded [`Decimal`]s. Two-decimal rounding happens only
//! at presentation time via [`to_money`].

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

use crate::{items::CartItem, settings::CartSettings};

/// Category whose lines qualify for the category discount.
pub const DISCOUNT_CATEGORY: &str = "electronics";

/// Total quantity at which the 10% tier applies.
pub const TIER_TEN_COUNT: u32 = 10;

/// Total quantity at which the 5% tier applies.
pub const TIER_FIVE_COUNT: u32 = 5;

/// Items included in the base shipping rate; each item beyond this adds a
/// per-item surcharge.
pub const SHIPPING_INCLUDED_ITEMS: u32 = 5;

/// Sum of quantities across all lines.
#[must_use]
pub fn item_count(items: &[CartItem]) -> u32 {
    items.iter().map(|item| item.quantity).sum()
}

/// Number of distinct lines.
#[must_use]
pub fn unique_item_count(items: &[CartItem]) -> usize {
    items.len()
}

/// Sum of `price * quantity` over all lines.
#[must_use]
pub fn subtotal(items: &[CartItem]) -> Decimal {
    items.iter().map(CartItem::line_total).sum()
}

/// Built-in discount: quantity tier plus category discount, summed.
///
/// The quantity tiers are mutually exclusive (10+ items take 10% of the
/// subtotal, otherwise 5+ items take 5%); the category discount of 15% on the
/// summed electronics lines applies on top whenever at least two distinct
/// electronics lines are present.
#[must_use]
pub fn discount(items: &[CartItem]) -> Decimal {
    let subtotal = subtotal(items);
    let mut discount = Decimal::ZERO;

    let count = item_count(items);
    if count >= TIER_TEN_COUNT {
        discount += Percentage::from(0.10) * subtotal;
    } else if count >= TIER_FIVE_COUNT {
        discount += Percentage::from(0.05) * subtotal;
    }

    let electronics: Vec<&CartItem> = items
        .iter()
        .filter(|item| item.category == DISCOUNT_CATEGORY)
        .collect();

    if electronics.len() >= 2 {
        let electronics_total: Decimal = electronics
            .iter()
            .map(|item| item.line_total())
            .sum();

        discount += Percentage::from(0.15) * electronics_total;
    }

    discount
}

/// Tax on the discounted subtotal. Never negative.
#[must_use]
pub fn tax(items: &[CartItem], settings: &CartSettings) -> Decimal {
    let taxable = (subtotal(items) - discount(items)).max(Decimal::ZERO);

    Percentage::from(settings.tax_rate) * taxable
}

/// Shipping cost: free at or above the threshold, otherwise a base rate of
/// 9.99 plus 2.99 per item beyond the fifth, capped at 29.99.
#[must_use]
pub fn shipping(items: &[CartItem], settings: &CartSettings) -> Decimal {
    if subtotal(items) >= settings.shipping_threshold {
        return Decimal::ZERO;
    }

    let mut cost = Decimal::new(999, 2);

    let count = item_count(items);
    if count > SHIPPING_INCLUDED_ITEMS {
        cost += Decimal::from(count - SHIPPING_INCLUDED_ITEMS) * Decimal::new(299, 2);
    }

    cost.min(Decimal::new(2999, 2))
}

/// Grand total: `subtotal - discount + tax + shipping`.
#[must_use]
pub fn final_total(items: &[CartItem], settings: &CartSettings) -> Decimal {
    subtotal(items) - discount(items) + tax(items, settings) + shipping(items, settings)
}

/// Total customer savings: markdowns on individual lines plus the built-in
/// discount.
#[must_use]
pub fn savings(items: &[CartItem]) -> Decimal {
    let markdowns: Decimal = items.iter().map(CartItem::markdown).sum();

    markdowns + discount(items)
}

/// Ephemeral snapshot of all derived cart figures.
///
/// Never persisted; recompute via [`CartTotals::compute`] whenever current
/// figures are needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Sum of `price * quantity` over all lines.
    pub subtotal: Decimal,

    /// Built-in tiered plus category discount.
    pub discount: Decimal,

    /// Tax on the discounted subtotal.
    pub tax: Decimal,

    /// Shipping cost after the free-shipping threshold.
    pub shipping: Decimal,

    /// `subtotal - discount + tax + shipping`.
    pub total: Decimal,

    /// Markdown savings plus the built-in discount.
    pub savings: Decimal,

    /// Sum of quantities.
    pub item_count: u32,

    /// Number of distinct lines.
    pub unique_item_count: usize,
}

impl CartTotals {
    /// Compute a fresh snapshot from the current lines and settings.
    #[must_use]
    pub fn compute(items: &[CartItem], settings: &CartSettings) -> Self {
        Self {
            subtotal: subtotal(items),
            discount: discount(items),
            tax: tax(items, settings),
            shipping: shipping(items, settings),
            total: final_total(items, settings),
            savings: savings(items),
            item_count: item_count(items),
            unique_item_count: unique_item_count(items),
        }
    }
}

/// Convert an unrounded amount into a displayable [`Money`], applying the
/// two-decimal presentation rounding.
#[must_use]
pub fn to_money(amount: Decimal, currency: &'static Currency) -> Money<'static, Currency> {
    Money::from_decimal(
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        currency,
    )
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rusty_money::iso;

    use crate::{catalog::ProductId, items::VariantOptions};

    use super::*;

    fn line(id: u64, price: Decimal, quantity: u32, category: &str) -> CartItem {
        let now = Utc
            .with_ymd_and_hms(2024, 6, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");

        CartItem {
            product_id: ProductId::new(id),
            name: format!("product {id}"),
            price,
            original_price: None,
            image: String::new(),
            category: category.to_owned(),
            brand: String::new(),
            quantity,
            options: VariantOptions::none(),
            added_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn subtotal_sums_line_totals() {
        let items = [line(1, Decimal::new(29999, 2), 2, "fashion")];

        assert_eq!(subtotal(&items), Decimal::new(59998, 2));
        assert_eq!(item_count(&items), 2);
        assert_eq!(unique_item_count(&items), 1);
    }

    #[test]
    fn no_discount_below_five_items() {
        let items = [line(1, Decimal::from(100u32), 4, "fashion")];

        assert_eq!(discount(&items), Decimal::ZERO);
    }

    #[test]
    fn five_items_take_five_percent() {
        let items = [line(1, Decimal::from(20u32), 5, "fashion")];

        assert_eq!(discount(&items), Decimal::from(5u32));
    }

    #[test]
    fn ten_items_take_ten_percent_not_fifteen() {
        // Tiers are mutually exclusive: 10% only, never 10% + 5%.
        let items = [line(1, Decimal::from(50u32), 10, "fashion")];

        assert_eq!(discount(&items), Decimal::from(50u32));
    }

    #[test]
    fn two_electronics_lines_take_category_discount() {
        let items = [
            line(1, Decimal::from(100u32), 1, DISCOUNT_CATEGORY),
            line(2, Decimal::from(100u32), 1, DISCOUNT_CATEGORY),
        ];

        assert_eq!(discount(&items), Decimal::from(30u32));
    }

    #[test]
    fn one_electronics_line_takes_no_category_discount() {
        let items = [line(1, Decimal::from(100u32), 5, DISCOUNT_CATEGORY)];

        // 5% tier applies, category discount does not (one distinct line).
        assert_eq!(discount(&items), Decimal::from(25u32));
    }

    #[test]
    fn tier_and_category_discounts_stack() {
        let items = [
            line(1, Decimal::from(100u32), 5, DISCOUNT_CATEGORY),
            line(2, Decimal::from(100u32), 5, DISCOUNT_CATEGORY),
        ];

        // 10% of 1000 plus 15% of 1000.
        assert_eq!(discount(&items), Decimal::from(250u32));
    }

    #[test]
    fn tax_applies_after_discount() {
        let settings = CartSettings::default();
        let items = [line(1, Decimal::from(100u32), 5, "fashion")];

        // (500 - 25) * 0.08
        assert_eq!(tax(&items, &settings), Decimal::new(3800, 2));
    }

    #[test]
    fn shipping_base_rate_below_threshold() {
        let settings = CartSettings::default();
        let items = [line(1, Decimal::from(10u32), 4, "fashion")];

        assert_eq!(shipping(&items, &settings), Decimal::new(999, 2));
    }

    #[test]
    fn shipping_free_at_threshold() {
        let settings = CartSettings::default();
        let at = [line(1, Decimal::from(51u32), 1, "fashion")];
        let below = [line(1, Decimal::from(40u32), 1, "fashion")];

        assert_eq!(shipping(&at, &settings), Decimal::ZERO);
        assert_eq!(shipping(&below, &settings), Decimal::new(999, 2));
    }

    #[test]
    fn shipping_surcharge_beyond_five_items() {
        let settings = CartSettings::default();
        let items = [line(1, Decimal::from(5u32), 8, "fashion")];

        // 9.99 + 3 * 2.99
        assert_eq!(shipping(&items, &settings), Decimal::new(1896, 2));
    }

    #[test]
    fn shipping_caps_at_maximum() {
        let settings = CartSettings::default();
        let items = [line(1, Decimal::from(3u32), 12, "fashion")];

        // 9.99 + 7 * 2.99 = 30.92, capped.
        assert_eq!(shipping(&items, &settings), Decimal::new(2999, 2));
    }

    #[test]
    fn final_total_combines_all_parts() {
        let settings = CartSettings::default();
        let items = [line(1, Decimal::from(100u32), 10, "fashion")];

        // 1000 - 100 + (900 * 0.08) + 0 (free shipping)
        assert_eq!(final_total(&items, &settings), Decimal::from(972u32));
    }

    #[test]
    fn savings_adds_markdowns_to_discount() {
        let mut marked_down = line(1, Decimal::from(80u32), 5, "fashion");
        marked_down.original_price = Some(Decimal::from(100u32));
        let items = [marked_down];

        // markdown 20 * 5 + 5% of 400
        assert_eq!(savings(&items), Decimal::from(120u32));
    }

    #[test]
    fn totals_snapshot_matches_individual_queries() {
        let settings = CartSettings::default();
        let items = [
            line(1, Decimal::new(29999, 2), 2, DISCOUNT_CATEGORY),
            line(2, Decimal::new(4999, 2), 1, "fashion"),
        ];

        let totals = CartTotals::compute(&items, &settings);

        assert_eq!(totals.subtotal, subtotal(&items));
        assert_eq!(totals.discount, discount(&items));
        assert_eq!(totals.tax, tax(&items, &settings));
        assert_eq!(totals.shipping, shipping(&items, &settings));
        assert_eq!(totals.total, final_total(&items, &settings));
        assert_eq!(totals.savings, savings(&items));
        assert_eq!(totals.item_count, 3);
        assert_eq!(totals.unique_item_count, 2);
    }

    #[test]
    fn to_money_rounds_for_display_only() {
        let amount = Decimal::new(123456, 4); // 12.3456

        let money = to_money(amount, iso::USD);

        assert_eq!(money, Money::from_minor(1235, iso::USD));
    }
}
