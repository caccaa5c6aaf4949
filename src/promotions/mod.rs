//! Promotions
//!
//! Promo-code validation and application. Promo discounts are additive lines
//! in the checkout summary, tracked per session and kept separate from the
//! built-in tiered/category discount computed by [`crate::pricing`].

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::pricing::CartTotals;

/// Errors returned when a promo code cannot be applied.
#[derive(Debug, Error, PartialEq)]
pub enum PromoError {
    /// The submitted code was blank.
    #[error("no promo code entered")]
    EmptyCode,

    /// The code has already been applied in this session.
    #[error("promo code {0} already applied")]
    AlreadyApplied(String),

    /// The code is not in the registry.
    #[error("invalid promo code {0}")]
    UnknownCode(String),

    /// The cart subtotal is below the code's minimum order.
    #[error("minimum order of ${min_order} required for promo code {code}")]
    MinOrderNotMet {
        /// The code that was rejected.
        code: String,

        /// Its qualifying subtotal.
        min_order: Decimal,
    },
}

/// How a promo code discounts the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromoKind {
    /// `value` is a fraction of the subtotal.
    Percentage,

    /// `value` is a fixed dollar amount.
    Fixed,

    /// Refunds the current shipping cost; `value` is ignored.
    FreeShipping,
}

/// A redeemable promotional code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCode {
    /// Unique uppercase code string.
    pub code: String,

    /// Human-readable description shown in the summary.
    pub description: String,

    /// Discount semantics.
    pub kind: PromoKind,

    /// Fraction (0-1) for percentage codes, dollar amount for fixed codes.
    pub value: Decimal,

    /// Subtotal required to qualify.
    pub min_order: Decimal,
}

impl PromoCode {
    /// Compute the discount this code yields against the given totals.
    ///
    /// Fixed amounts are clamped to the subtotal so a large fixed promo can
    /// never push the summary negative on its own.
    #[must_use]
    pub fn amount(&self, totals: &CartTotals) -> Decimal {
        match self.kind {
            PromoKind::Percentage => self.value * totals.subtotal,
            PromoKind::Fixed => self.value.min(totals.subtotal),
            PromoKind::FreeShipping => totals.shipping,
        }
    }
}

/// A promo code applied to the active session, with its computed amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedPromo {
    /// The redeemed code.
    pub code: String,

    /// Description for the summary line.
    pub description: String,

    /// Discount amount computed at application time.
    pub amount: Decimal,
}

/// Fixed registry of redeemable codes, keyed by uppercase code string.
#[derive(Debug, Clone, Default)]
pub struct PromoRegistry {
    codes: FxHashMap<String, PromoCode>,
}

impl PromoRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The storefront's standard code set.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();

        registry.insert(PromoCode {
            code: "SAVE10".to_owned(),
            description: "10% off".to_owned(),
            kind: PromoKind::Percentage,
            value: Decimal::new(10, 2),
            min_order: Decimal::from(50u32),
        });

        registry.insert(PromoCode {
            code: "SAVE20".to_owned(),
            description: "20% off".to_owned(),
            kind: PromoKind::Percentage,
            value: Decimal::new(20, 2),
            min_order: Decimal::from(100u32),
        });

        registry.insert(PromoCode {
            code: "FREESHIP".to_owned(),
            description: "Free shipping".to_owned(),
            kind: PromoKind::FreeShipping,
            value: Decimal::ZERO,
            min_order: Decimal::ZERO,
        });

        registry.insert(PromoCode {
            code: "WELCOME15".to_owned(),
            description: "$15 off".to_owned(),
            kind: PromoKind::Fixed,
            value: Decimal::from(15u32),
            min_order: Decimal::from(75u32),
        });

        registry
    }

    /// Insert or replace a code. The key is uppercased.
    pub fn insert(&mut self, promo: PromoCode) {
        self.codes.insert(promo.code.to_uppercase(), promo);
    }

    /// Look up a code, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&PromoCode> {
        self.codes.get(&code.trim().to_uppercase())
    }

    /// Validate a code against the current totals and compute its discount.
    ///
    /// # Errors
    ///
    /// - [`PromoError::EmptyCode`] when the trimmed code is blank.
    /// - [`PromoError::UnknownCode`] when the code is not registered.
    /// - [`PromoError::MinOrderNotMet`] when the subtotal is below the
    ///   code's minimum order.
    pub fn validate(&self, code: &str, totals: &CartTotals) -> Result<AppliedPromo, PromoError> {
        let normalized = code.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(PromoError::EmptyCode);
        }

        let promo = self
            .get(&normalized)
            .ok_or_else(|| PromoError::UnknownCode(normalized.clone()))?;

        if totals.subtotal < promo.min_order {
            return Err(PromoError::MinOrderNotMet {
                code: normalized,
                min_order: promo.min_order,
            });
        }

        Ok(AppliedPromo {
            code: promo.code.clone(),
            description: promo.description.clone(),
            amount: promo.amount(totals),
        })
    }
}

/// Ordered list of promos applied during one checkout/cart session.
///
/// Insertion order is preserved; the only deduplication is by code string.
#[derive(Debug, Default)]
pub struct PromoSession {
    applied: SmallVec<[AppliedPromo; 4]>,
}

impl PromoSession {
    /// Start a session with no applied promos.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `code` against `totals` and append it to the session.
    ///
    /// The duplicate check runs first, before registry lookup, so re-entering
    /// an applied code reports the duplicate rather than re-validating.
    ///
    /// # Errors
    ///
    /// [`PromoError::AlreadyApplied`] for a duplicate, otherwise whatever
    /// [`PromoRegistry::validate`] rejects.
    pub fn apply(
        &mut self,
        code: &str,
        registry: &PromoRegistry,
        totals: &CartTotals,
    ) -> Result<AppliedPromo, PromoError> {
        let normalized = code.trim().to_uppercase();

        if self.applied.iter().any(|promo| promo.code == normalized) {
            return Err(PromoError::AlreadyApplied(normalized));
        }

        let promo = registry.validate(&normalized, totals)?;
        self.applied.push(promo.clone());

        Ok(promo)
    }

    /// Applied promos in insertion order.
    #[must_use]
    pub fn applied(&self) -> &[AppliedPromo] {
        &self.applied
    }

    /// Sum of all applied promo amounts.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.applied.iter().map(|promo| promo.amount).sum()
    }

    /// Number of applied promos.
    #[must_use]
    pub fn len(&self) -> usize {
        self.applied.len()
    }

    /// Whether no promos are applied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }

    /// Drop all applied promos, e.g. when the cart is cleared.
    pub fn clear(&mut self) {
        self.applied.clear();
    }
}

/// Checkout summary combining the built-in cart totals with the session's
/// promo lines. Both the built-in discount and every promo line are present
/// simultaneously; the grand total is floored at zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    /// Derived cart figures, including the built-in discount.
    pub totals: CartTotals,

    /// Promo lines in application order.
    pub promos: Vec<AppliedPromo>,

    /// Sum of the promo lines.
    pub promo_total: Decimal,

    /// Cart total minus promos, never below zero.
    pub grand_total: Decimal,
}

impl CheckoutSummary {
    /// Build the summary for the current totals and session.
    #[must_use]
    pub fn new(totals: CartTotals, session: &PromoSession) -> Self {
        let promo_total = session.total();
        let grand_total = (totals.total - promo_total).max(Decimal::ZERO);

        Self {
            totals,
            promos: session.applied().to_vec(),
            promo_total,
            grand_total,
        }
    }
}
