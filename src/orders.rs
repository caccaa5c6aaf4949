//! Orders
//!
//! Checkout: turn the cart plus the session's promos into a placed order.
//! Payment is behind a trait so the simulated gateway's random declines stay
//! out of tests; a successful order is appended to the user's order log,
//! noted in their activity feed, and empties both the cart and the promo
//! session. A decline leaves everything untouched.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::CartEngine,
    items::CartItem,
    persistence::{self, KeyValueStore, keys},
    pricing::CartTotals,
    promotions::{AppliedPromo, CheckoutSummary, PromoSession},
};

/// Failures of order placement.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// The cart holds no lines.
    #[error("cannot place an order for an empty cart")]
    EmptyCart,

    /// The payment gateway declined the charge.
    #[error("payment was declined")]
    PaymentDeclined,
}

/// Authorizes charges for order placement.
pub trait PaymentGateway: fmt::Debug {
    /// Authorize a charge for `total`.
    ///
    /// # Errors
    ///
    /// [`OrderError::PaymentDeclined`] when the charge is refused.
    fn authorize(&mut self, total: Decimal) -> Result<(), OrderError>;
}

/// Demo gateway declining a fixed fraction of charges at random.
#[derive(Debug)]
pub struct RandomGateway {
    decline_rate: f64,
    rng: StdRng,
}

impl RandomGateway {
    /// The storefront's simulated decline rate.
    pub const DEFAULT_DECLINE_RATE: f64 = 0.1;

    /// Gateway seeded from the OS with the default decline rate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            decline_rate: Self::DEFAULT_DECLINE_RATE,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministically seeded gateway, for tests.
    #[must_use]
    pub fn with_seed(decline_rate: f64, seed: u64) -> Self {
        Self {
            decline_rate,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentGateway for RandomGateway {
    fn authorize(&mut self, total: Decimal) -> Result<(), OrderError> {
        if self.rng.random::<f64>() < self.decline_rate {
            tracing::info!(%total, "simulated payment decline");
            return Err(OrderError::PaymentDeclined);
        }

        Ok(())
    }
}

/// Gateway that approves every charge, for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysApprove;

impl PaymentGateway for AlwaysApprove {
    fn authorize(&mut self, _total: Decimal) -> Result<(), OrderError> {
        Ok(())
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order identifier, `NX` plus a millisecond timestamp and noise digits.
    pub id: String,

    /// The purchased lines.
    pub items: Vec<CartItem>,

    /// Derived figures at placement time.
    pub totals: CartTotals,

    /// Promo lines redeemed against the order.
    pub promos: Vec<AppliedPromo>,

    /// Amount actually charged: cart total minus promos, floored at zero.
    pub charged: Decimal,

    /// When the order was placed.
    pub placed_at: DateTime<Utc>,
}

/// One entry in a user's activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    /// When the event happened.
    pub timestamp: DateTime<Utc>,

    /// Event description, e.g. `order_placed`.
    pub action: String,

    /// Order the event refers to, when applicable.
    #[serde(default)]
    pub order_id: Option<String>,
}

fn order_id(placed_at: DateTime<Utc>) -> String {
    let noise = rand::rng().random_range(0..1000);

    format!("NX{}{noise:03}", placed_at.timestamp_millis())
}

/// Place an order for the engine's current cart.
///
/// On success the order is appended to the user's order log, an entry is
/// added to their activity feed, and the cart and promo session are emptied.
/// On failure nothing changes.
///
/// # Errors
///
/// - [`OrderError::EmptyCart`] when the cart has no lines.
/// - [`OrderError::PaymentDeclined`] when the gateway refuses the charge.
pub fn place_order(
    engine: &mut CartEngine,
    session: &mut PromoSession,
    user_id: &str,
    gateway: &mut dyn PaymentGateway,
) -> Result<Order, OrderError> {
    if engine.items().is_empty() {
        return Err(OrderError::EmptyCart);
    }

    let summary = CheckoutSummary::new(engine.totals(), session);

    gateway.authorize(summary.grand_total)?;

    let placed_at = engine.now();
    let order = Order {
        id: order_id(placed_at),
        items: engine.items().to_vec(),
        totals: summary.totals,
        promos: summary.promos,
        charged: summary.grand_total,
        placed_at,
    };

    let orders_key = keys::orders(user_id);
    let mut orders: Vec<Order> = persistence::load_or_default(engine.store(), &orders_key);
    orders.push(order.clone());
    persistence::save(engine.store(), &orders_key, &orders);

    let activity_key = keys::activity(user_id);
    let mut activity: Vec<ActivityEntry> = persistence::load_or_default(engine.store(), &activity_key);
    activity.push(ActivityEntry {
        timestamp: placed_at,
        action: "order_placed".to_owned(),
        order_id: Some(order.id.clone()),
    });
    persistence::save(engine.store(), &activity_key, &activity);

    tracing::info!(order_id = %order.id, charged = %order.charged, "order placed");

    engine.clear();
    session.clear();

    Ok(order)
}

/// Load a user's placed orders, oldest first.
#[must_use]
pub fn orders_for(store: &dyn KeyValueStore, user_id: &str) -> Vec<Order> {
    persistence::load_or_default(store, &keys::orders(user_id))
}

/// Load a user's activity feed, oldest first.
#[must_use]
pub fn activity_for(store: &dyn KeyValueStore, user_id: &str) -> Vec<ActivityEntry> {
    persistence::load_or_default(store, &keys::activity(user_id))
}
