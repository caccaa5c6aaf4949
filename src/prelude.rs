//! Prelude
//!
//! One-line import of the types most callers need.
//!
//! ```
//! use nexus_cart::prelude::*;
//! ```

pub use crate::{
    cart::{
        CartEngine, CartError, CleanupReport,
        export::{CartExport, ExportError},
        history::{CartHistory, HistoryAction, HistoryEntry},
        statistics::CartStatistics,
    },
    catalog::{InMemoryCatalog, Product, ProductCatalog, ProductId},
    clock::{Clock, ManualClock, SystemClock},
    fixtures::demo_catalog,
    items::{CartItem, VariantOptions, WishlistItem},
    orders::{
        AlwaysApprove, Order, OrderError, PaymentGateway, RandomGateway, place_order,
    },
    persistence::{JsonFileStore, KeyValueStore, MemoryStore, StoreError},
    pricing::{CartTotals, to_money},
    promotions::{
        AppliedPromo, CheckoutSummary, PromoCode, PromoError, PromoKind, PromoRegistry,
        PromoSession,
    },
    settings::CartSettings,
};
