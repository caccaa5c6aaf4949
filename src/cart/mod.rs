//! Cart Engine
//!
//! The single authoritative in-memory representation of the shopping cart
//! and wishlist for the active browser profile. Every mutation persists the
//! affected collections, records a history entry, and notifies subscribed
//! listeners; every pricing query recomputes from current state.
//!
//! The engine is injected into each page controller at construction and is
//! the only coupling point they are allowed: mutations and queries here,
//! plus [`CartEngine::subscribe`]/[`CartEngine::unsubscribe`].

use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    catalog::{ProductCatalog, ProductId},
    clock::Clock,
    items::{CartItem, VariantOptions, WishlistItem},
    maintenance::MaintenanceSchedule,
    notify::{ChangeNotifier, ListenerKey},
    persistence::{self, KeyValueStore, keys},
    pricing::{self, CartTotals},
    settings::CartSettings,
};

pub mod export;
pub mod history;
pub mod statistics;

use export::{CartExport, ExportError};
use history::{CartHistory, HistoryAction, HistoryEntry};
use statistics::CartStatistics;

/// Failures of cart mutations.
///
/// Mutations report failure through `Result` so the UI layer decides how to
/// present it; nothing here is ever raised as a panic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The referenced product does not exist in the catalog.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The catalog reports the product unavailable.
    #[error("product {0} is out of stock")]
    OutOfStock(ProductId),

    /// A quantity of zero was requested where at least one is required.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// No cart line matches the (product, options) pair.
    #[error("no cart line for product {0} with the given options")]
    LineNotFound(ProductId),

    /// The product is already on the wishlist.
    #[error("product {0} is already in the wishlist")]
    AlreadyInWishlist(ProductId),

    /// The product is not on the wishlist.
    #[error("product {0} is not in the wishlist")]
    NotInWishlist(ProductId),
}

/// What a cleanup pass evicted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Cart lines dropped for exceeding the retention window.
    pub lines: usize,

    /// History entries dropped.
    pub history_entries: usize,
}

/// The cart engine. See the module docs for the contract.
pub struct CartEngine {
    items: Vec<CartItem>,
    wishlist: Vec<WishlistItem>,
    history: CartHistory,
    settings: CartSettings,
    catalog: Box<dyn ProductCatalog>,
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    notifier: ChangeNotifier,
    schedule: MaintenanceSchedule,
}

impl fmt::Debug for CartEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartEngine")
            .field("items", &self.items.len())
            .field("wishlist", &self.wishlist.len())
            .field("history", &self.history.len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl CartEngine {
    /// Construct an engine, loading cart, wishlist, history, and settings
    /// from the store. Missing or corrupt collections load as empty defaults.
    pub fn new(
        catalog: impl ProductCatalog + 'static,
        store: impl KeyValueStore + 'static,
        clock: impl Clock + 'static,
    ) -> Self {
        let store: Box<dyn KeyValueStore> = Box::new(store);
        let clock: Box<dyn Clock> = Box::new(clock);

        let items = persistence::load_or_default(store.as_ref(), keys::CART);
        let wishlist = persistence::load_or_default(store.as_ref(), keys::WISHLIST);
        let history = persistence::load_or_default(store.as_ref(), keys::CART_HISTORY);
        let settings = persistence::load_or_default(store.as_ref(), keys::SETTINGS);
        let schedule = MaintenanceSchedule::new(clock.now());

        Self {
            items,
            wishlist,
            history,
            settings,
            catalog: Box::new(catalog),
            store,
            clock,
            notifier: ChangeNotifier::new(),
            schedule,
        }
    }

    // --- mutations -------------------------------------------------------

    /// Add `quantity` units of a product to the cart.
    ///
    /// Merges into an existing line with the same (product, options) pair;
    /// otherwise appends a new line whose display fields and price are
    /// snapshots of the catalog at this moment.
    ///
    /// # Errors
    ///
    /// - [`CartError::ProductNotFound`] for an unknown product.
    /// - [`CartError::OutOfStock`] when the catalog reports no stock.
    /// - [`CartError::InvalidQuantity`] for a zero quantity.
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        options: VariantOptions,
    ) -> Result<(), CartError> {
        let product = self
            .catalog
            .product(product_id)
            .ok_or(CartError::ProductNotFound(product_id))?;

        if !product.in_stock {
            return Err(CartError::OutOfStock(product_id));
        }

        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let now = self.clock.now();

        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.matches(product_id, &options))
        {
            line.quantity += quantity;
            line.updated_at = now;
        } else {
            self.items
                .push(CartItem::from_product(&product, quantity, options, now));
        }

        tracing::debug!(%product_id, quantity, "added to cart");
        self.after_cart_mutation(HistoryAction::CartUpdated);

        Ok(())
    }

    /// Remove the line identified by the (product, options) pair.
    ///
    /// # Errors
    ///
    /// [`CartError::LineNotFound`] when no line matches; the cart is left
    /// untouched.
    pub fn remove_item(
        &mut self,
        product_id: ProductId,
        options: &VariantOptions,
    ) -> Result<(), CartError> {
        let index = self
            .items
            .iter()
            .position(|line| line.matches(product_id, options))
            .ok_or(CartError::LineNotFound(product_id))?;

        self.items.remove(index);

        tracing::debug!(%product_id, "removed from cart");
        self.after_cart_mutation(HistoryAction::CartUpdated);

        Ok(())
    }

    /// Set the quantity of an existing line. A quantity of zero removes the
    /// line, exactly as [`CartEngine::remove_item`] would.
    ///
    /// # Errors
    ///
    /// [`CartError::LineNotFound`] when no line matches.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        options: &VariantOptions,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove_item(product_id, options);
        }

        let now = self.clock.now();

        let line = self
            .items
            .iter_mut()
            .find(|line| line.matches(product_id, options))
            .ok_or(CartError::LineNotFound(product_id))?;

        line.quantity = quantity;
        line.updated_at = now;

        self.after_cart_mutation(HistoryAction::CartUpdated);

        Ok(())
    }

    /// Move a cart line to the wishlist: one atomic wishlist-add plus
    /// cart-remove. The wishlist entry caches the line's own snapshot fields,
    /// so the move works even if the product has left the catalog since.
    ///
    /// # Errors
    ///
    /// [`CartError::LineNotFound`] when no cart line matches. A product
    /// already on the wishlist is not an error; the line is still removed.
    pub fn move_to_wishlist(
        &mut self,
        product_id: ProductId,
        options: &VariantOptions,
    ) -> Result<(), CartError> {
        let index = self
            .items
            .iter()
            .position(|line| line.matches(product_id, options))
            .ok_or(CartError::LineNotFound(product_id))?;

        let line = self.items.remove(index);

        if !self.in_wishlist(product_id) {
            self.wishlist.push(WishlistItem {
                product_id,
                name: line.name,
                price: line.price,
                image: line.image,
                added_at: self.clock.now(),
            });
        }

        persistence::save(self.store.as_ref(), keys::WISHLIST, &self.wishlist);
        self.after_cart_mutation(HistoryAction::CartUpdated);

        Ok(())
    }

    /// Add a product to the wishlist.
    ///
    /// # Errors
    ///
    /// - [`CartError::ProductNotFound`] for an unknown product.
    /// - [`CartError::AlreadyInWishlist`] for a duplicate; the wishlist is
    ///   left untouched.
    pub fn add_to_wishlist(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let product = self
            .catalog
            .product(product_id)
            .ok_or(CartError::ProductNotFound(product_id))?;

        if self.in_wishlist(product_id) {
            return Err(CartError::AlreadyInWishlist(product_id));
        }

        self.wishlist.push(WishlistItem {
            product_id,
            name: product.name,
            price: product.price,
            image: product.image,
            added_at: self.clock.now(),
        });

        persistence::save(self.store.as_ref(), keys::WISHLIST, &self.wishlist);

        Ok(())
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// [`CartError::NotInWishlist`] when the product is not saved.
    pub fn remove_from_wishlist(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let index = self
            .wishlist
            .iter()
            .position(|entry| entry.product_id == product_id)
            .ok_or(CartError::NotInWishlist(product_id))?;

        self.wishlist.remove(index);
        persistence::save(self.store.as_ref(), keys::WISHLIST, &self.wishlist);

        Ok(())
    }

    /// Add the product to the wishlist if absent, remove it if present.
    /// Returns whether the product is on the wishlist afterwards.
    ///
    /// # Errors
    ///
    /// [`CartError::ProductNotFound`] when adding an unknown product.
    pub fn toggle_wishlist(&mut self, product_id: ProductId) -> Result<bool, CartError> {
        if self.in_wishlist(product_id) {
            self.remove_from_wishlist(product_id)?;
            Ok(false)
        } else {
            self.add_to_wishlist(product_id)?;
            Ok(true)
        }
    }

    /// Empty the cart, recording a history entry and notifying listeners.
    pub fn clear(&mut self) {
        self.items.clear();
        self.after_cart_mutation(HistoryAction::CartCleared);
    }

    /// Replace the settings and persist them.
    pub fn update_settings(&mut self, settings: CartSettings) {
        self.settings = settings;
        persistence::save(self.store.as_ref(), keys::SETTINGS, &self.settings);
    }

    /// Replace the cart lines from a JSON export payload.
    ///
    /// # Errors
    ///
    /// [`ExportError::Json`] for a malformed payload; the cart is left
    /// untouched.
    pub fn import_json(&mut self, raw: &str) -> Result<(), ExportError> {
        let export = CartExport::from_json(raw)?;

        self.items = export.items;
        self.after_cart_mutation(HistoryAction::CartUpdated);

        Ok(())
    }

    /// Evict cart lines and history entries older than the 30-day retention
    /// window, persisting and notifying when anything was dropped.
    pub fn cleanup(&mut self) -> CleanupReport {
        let cutoff = MaintenanceSchedule::retention_cutoff(self.clock.now());

        let before = self.items.len();
        self.items.retain(|line| line.added_at > cutoff);
        let lines = before - self.items.len();

        let history_entries = self.history.evict_older_than(cutoff);

        if lines > 0 || history_entries > 0 {
            tracing::debug!(lines, history_entries, "cleanup evicted stale entries");
            persistence::save(self.store.as_ref(), keys::CART, &self.items);
            persistence::save(self.store.as_ref(), keys::CART_HISTORY, &self.history);
        }

        if lines > 0 {
            self.notifier.notify(&self.items);
        }

        CleanupReport {
            lines,
            history_entries,
        }
    }

    /// Host-driven maintenance tick. Call from a timer: re-persists all
    /// state when the 30-second auto-save is due (and enabled in settings),
    /// and runs [`CartEngine::cleanup`] when the daily pass is due. The
    /// auto-save is a plain re-persist; it records no history entry and
    /// notifies nobody.
    pub fn tick(&mut self) {
        let now = self.clock.now();

        if self.settings.auto_save && self.schedule.autosave_due(now) {
            self.persist_all();
        }

        if self.schedule.cleanup_due(now) {
            self.cleanup();
        }
    }

    // --- queries ---------------------------------------------------------

    /// Current cart lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Current wishlist entries, in insertion order.
    #[must_use]
    pub fn wishlist(&self) -> &[WishlistItem] {
        &self.wishlist
    }

    /// Recorded cart changes, most recent first.
    #[must_use]
    pub fn history(&self) -> &CartHistory {
        &self.history
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &CartSettings {
        &self.settings
    }

    /// Whether the product is on the wishlist.
    #[must_use]
    pub fn in_wishlist(&self, product_id: ProductId) -> bool {
        self.wishlist
            .iter()
            .any(|entry| entry.product_id == product_id)
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        pricing::item_count(&self.items)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn unique_item_count(&self) -> usize {
        pricing::unique_item_count(&self.items)
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        pricing::subtotal(&self.items)
    }

    /// Built-in tiered plus category discount.
    #[must_use]
    pub fn discount(&self) -> Decimal {
        pricing::discount(&self.items)
    }

    /// Tax on the discounted subtotal.
    #[must_use]
    pub fn tax(&self) -> Decimal {
        pricing::tax(&self.items, &self.settings)
    }

    /// Shipping cost under the current settings.
    #[must_use]
    pub fn shipping(&self) -> Decimal {
        pricing::shipping(&self.items, &self.settings)
    }

    /// Grand total including discount, tax, and shipping.
    #[must_use]
    pub fn final_total(&self) -> Decimal {
        pricing::final_total(&self.items, &self.settings)
    }

    /// Markdown savings plus the built-in discount.
    #[must_use]
    pub fn savings(&self) -> Decimal {
        pricing::savings(&self.items)
    }

    /// Fresh snapshot of all derived figures.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals::compute(&self.items, &self.settings)
    }

    /// Aggregate statistics for the account page.
    #[must_use]
    pub fn statistics(&self) -> CartStatistics {
        CartStatistics::compute(&self.items, self.clock.now())
    }

    /// Integrity scan over the loaded lines. Persisted data can predate the
    /// current invariants, so quantities and prices are re-checked here.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();

        for (index, line) in self.items.iter().enumerate() {
            if line.quantity == 0 {
                violations.push(format!("line {}: quantity must be at least 1", index + 1));
            }

            if line.price < Decimal::ZERO {
                violations.push(format!("line {}: negative price", index + 1));
            }
        }

        violations
    }

    /// Export the cart as pretty-printed JSON with a derived summary.
    ///
    /// # Errors
    ///
    /// [`ExportError::Json`] if serialization fails.
    pub fn export_json(&self) -> Result<String, ExportError> {
        let export = CartExport {
            items: self.items.clone(),
            summary: self.totals(),
            export_date: self.clock.now(),
        };

        export.to_json()
    }

    /// Export the cart lines as CSV.
    #[must_use]
    pub fn export_csv(&self) -> String {
        export::to_csv(&self.items)
    }

    // --- notifications ---------------------------------------------------

    /// Register a listener invoked with the item list after every cart
    /// mutation.
    pub fn subscribe(&mut self, listener: impl Fn(&[CartItem]) + 'static) -> ListenerKey {
        self.notifier.subscribe(listener)
    }

    /// Remove a listener. Returns `false` when it was already gone.
    pub fn unsubscribe(&mut self, key: ListenerKey) -> bool {
        self.notifier.unsubscribe(key)
    }

    // --- internals -------------------------------------------------------

    pub(crate) fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub(crate) fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    /// Persist every collection without recording history or notifying.
    fn persist_all(&self) {
        persistence::save(self.store.as_ref(), keys::CART, &self.items);
        persistence::save(self.store.as_ref(), keys::WISHLIST, &self.wishlist);
        persistence::save(self.store.as_ref(), keys::CART_HISTORY, &self.history);
        persistence::save(self.store.as_ref(), keys::SETTINGS, &self.settings);
    }

    /// Persist the cart, append a history entry, and notify listeners.
    /// Runs after every successful cart mutation.
    fn after_cart_mutation(&mut self, action: HistoryAction) {
        self.history.record(HistoryEntry {
            timestamp: self.clock.now(),
            action,
            item_count: self.item_count(),
            total: self.subtotal(),
        });

        persistence::save(self.store.as_ref(), keys::CART, &self.items);
        persistence::save(self.store.as_ref(), keys::CART_HISTORY, &self.history);

        self.notifier.notify(&self.items);
    }
}
