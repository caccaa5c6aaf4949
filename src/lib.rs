//! Nexus Cart
//!
//! Cart pricing and persistence engine for the Nexus demo storefront. The
//! crate owns cart lines, the wishlist, and derived pricing (tiered and
//! category discounts, tax, shipping, promo codes), persists everything to a
//! pluggable key-value store, and notifies registered listeners on every
//! mutation. Page controllers and rendering live outside this crate and talk
//! to it exclusively through [`cart::CartEngine`].

pub mod cart;
pub mod catalog;
pub mod clock;
pub mod fixtures;
pub mod items;
pub mod maintenance;
pub mod notify;
pub mod orders;
pub mod persistence;
pub mod prelude;
pub mod pricing;
pub mod promotions;
pub mod settings;
