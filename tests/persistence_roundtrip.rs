//! Durability: engine state across restarts, corruption, and maintenance.

use std::rc::Rc;

use chrono::{TimeDelta, TimeZone, Utc};
use rust_decimal::Decimal;
use testresult::TestResult;

use nexus_cart::prelude::*;

fn clock() -> Rc<ManualClock> {
    Rc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
    ))
}

#[test]
fn engine_state_survives_a_restart_on_disk() -> TestResult {
    let dir = tempfile::tempdir()?;
    let clock = clock();

    {
        let store = JsonFileStore::open(dir.path())?;
        let mut engine = CartEngine::new(demo_catalog()?, store, Rc::clone(&clock));

        engine.add_item(ProductId::new(1), 2, VariantOptions::none().with("color", "black"))?;
        engine.add_to_wishlist(ProductId::new(3))?;
        engine.update_settings(CartSettings {
            tax_rate: Decimal::new(5, 2),
            ..CartSettings::default()
        });
    }

    let store = JsonFileStore::open(dir.path())?;
    let engine = CartEngine::new(demo_catalog()?, store, clock);

    assert_eq!(engine.unique_item_count(), 1);
    assert_eq!(engine.subtotal(), Decimal::new(59998, 2));
    assert!(engine.in_wishlist(ProductId::new(3)));
    assert_eq!(engine.settings().tax_rate, Decimal::new(5, 2));
    assert!(!engine.history().is_empty());

    Ok(())
}

#[test]
fn corrupt_files_load_as_defaults() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("nexus_cart.json"), "{broken")?;
    std::fs::write(dir.path().join("nexus_cart_settings.json"), "[1, 2]")?;

    let store = JsonFileStore::open(dir.path())?;
    let engine = CartEngine::new(demo_catalog()?, store, clock());

    assert!(engine.items().is_empty());
    assert_eq!(engine.settings(), &CartSettings::default());

    Ok(())
}

#[test]
fn autosave_tick_writes_without_history_or_notifications() -> TestResult {
    use std::cell::RefCell;

    let store = Rc::new(MemoryStore::new());
    let clock = clock();
    let mut engine = CartEngine::new(demo_catalog()?, Rc::clone(&store), Rc::clone(&clock));

    engine.add_item(ProductId::new(4), 1, VariantOptions::none())?;
    let history_len = engine.history().len();

    let notifications = Rc::new(RefCell::new(0u32));
    let sink = Rc::clone(&notifications);
    engine.subscribe(move |_| *sink.borrow_mut() += 1);

    store.remove("nexus_cart")?;
    clock.advance(TimeDelta::seconds(30));
    engine.tick();

    assert!(store.read("nexus_cart")?.is_some());
    assert_eq!(engine.history().len(), history_len);
    assert_eq!(*notifications.borrow(), 0);

    Ok(())
}

#[test]
fn daily_tick_evicts_stale_lines() -> TestResult {
    let store = Rc::new(MemoryStore::new());
    let clock = clock();
    let mut engine = CartEngine::new(demo_catalog()?, Rc::clone(&store), Rc::clone(&clock));

    engine.add_item(ProductId::new(4), 1, VariantOptions::none())?;

    clock.advance(TimeDelta::days(31));
    engine.add_item(ProductId::new(6), 1, VariantOptions::none())?;
    engine.tick();

    assert_eq!(engine.unique_item_count(), 1);
    assert_eq!(
        engine.items().first().map(|line| line.product_id),
        Some(ProductId::new(6))
    );

    // The eviction reached the persisted copy too.
    let raw = store.read("nexus_cart")?.ok_or("cart not persisted")?;
    let persisted: Vec<CartItem> = serde_json::from_str(&raw)?;
    assert_eq!(persisted.len(), 1);

    Ok(())
}

#[test]
fn persisted_line_shapes_stay_camel_case() -> TestResult {
    let store = Rc::new(MemoryStore::new());
    let mut engine = CartEngine::new(demo_catalog()?, Rc::clone(&store), clock());

    engine.add_item(ProductId::new(1), 1, VariantOptions::none().with("color", "black"))?;

    let raw = store.read("nexus_cart")?.ok_or("cart not persisted")?;

    assert!(raw.contains("\"productId\":1"));
    assert!(raw.contains("\"addedAt\""));
    assert!(raw.contains("\"originalPrice\""));

    Ok(())
}
