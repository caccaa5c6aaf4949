//! Promo application and checkout against live cart totals.

use std::rc::Rc;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use testresult::TestResult;

use nexus_cart::prelude::*;

fn demo_engine() -> TestResult<CartEngine> {
    let clock = ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
    );

    Ok(CartEngine::new(demo_catalog()?, MemoryStore::new(), clock))
}

#[test]
fn builtin_discount_and_promo_apply_together() -> TestResult {
    let mut engine = demo_engine()?;

    // Ten t-shirts: 499.90 subtotal, ten-item tier kicks in.
    engine.add_item(ProductId::new(4), 10, VariantOptions::none())?;

    let totals = engine.totals();
    assert_eq!(totals.discount, Decimal::new(4999, 2));

    let mut session = PromoSession::new();
    let promo = session.apply("SAVE10", &PromoRegistry::standard(), &totals)?;
    assert_eq!(promo.amount, Decimal::new(4999, 2));

    let summary = CheckoutSummary::new(totals.clone(), &session);

    // The tier discount stays inside the totals; the promo is its own line.
    assert_eq!(summary.totals.discount, Decimal::new(4999, 2));
    assert_eq!(summary.promo_total, Decimal::new(4999, 2));
    assert_eq!(summary.grand_total, totals.total - Decimal::new(4999, 2));

    Ok(())
}

#[test]
fn free_shipping_code_refunds_the_shipping_line() -> TestResult {
    let mut engine = demo_engine()?;

    // One t-shirt at 49.99 sits just under the free-shipping threshold.
    engine.add_item(ProductId::new(4), 1, VariantOptions::none())?;

    let totals = engine.totals();
    assert_eq!(totals.shipping, Decimal::new(999, 2));

    let mut session = PromoSession::new();
    let promo = session.apply("FREESHIP", &PromoRegistry::standard(), &totals)?;
    assert_eq!(promo.amount, Decimal::new(999, 2));

    let summary = CheckoutSummary::new(totals.clone(), &session);
    assert_eq!(summary.grand_total, totals.total - Decimal::new(999, 2));

    Ok(())
}

#[test]
fn min_order_rejects_then_accepts_after_topping_up() -> TestResult {
    let mut engine = demo_engine()?;
    let registry = PromoRegistry::standard();
    let mut session = PromoSession::new();

    engine.add_item(ProductId::new(4), 1, VariantOptions::none())?;

    let rejected = session.apply("WELCOME15", &registry, &engine.totals());
    assert_eq!(
        rejected,
        Err(PromoError::MinOrderNotMet {
            code: "WELCOME15".to_owned(),
            min_order: Decimal::from(75u32),
        })
    );

    engine.add_item(ProductId::new(6), 1, VariantOptions::none())?;

    let promo = session.apply("WELCOME15", &registry, &engine.totals())?;
    assert_eq!(promo.amount, Decimal::from(15u32));

    Ok(())
}

#[test]
fn checkout_places_order_and_resets_state() -> TestResult {
    let catalog = demo_catalog()?;
    let store = Rc::new(MemoryStore::new());
    let clock = ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
    );
    let mut engine = CartEngine::new(catalog, Rc::clone(&store), clock);

    engine.add_item(ProductId::new(2), 1, VariantOptions::none())?;

    let mut session = PromoSession::new();
    session.apply("SAVE20", &PromoRegistry::standard(), &engine.totals())?;

    let order = place_order(&mut engine, &mut session, "demo-user", &mut AlwaysApprove)?;

    assert!(order.id.starts_with("NX"));
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.promos.len(), 1);
    assert!(engine.items().is_empty());
    assert!(session.is_empty());

    // The order survives an engine restart via the shared store.
    let orders = nexus_cart::orders::orders_for(&*store, "demo-user");
    assert_eq!(orders, vec![order]);

    Ok(())
}

#[test]
fn declined_payment_keeps_the_cart_intact() -> TestResult {
    let mut engine = demo_engine()?;
    engine.add_item(ProductId::new(2), 1, VariantOptions::none())?;

    let mut session = PromoSession::new();
    let mut gateway = RandomGateway::with_seed(1.0, 7);

    let result = place_order(&mut engine, &mut session, "demo-user", &mut gateway);

    assert_eq!(result, Err(OrderError::PaymentDeclined));
    assert_eq!(engine.unique_item_count(), 1);

    Ok(())
}
