//! Store Keys
//!
//! Every collection lives under a fixed key in one shared namespace;
//! per-account collections are namespaced by user id.

/// Cart lines.
pub const CART: &str = "nexus_cart";

/// Wishlist entries.
pub const WISHLIST: &str = "nexus_wishlist";

/// Capped cart history.
pub const CART_HISTORY: &str = "nexus_cart_history";

/// Cart settings.
pub const SETTINGS: &str = "nexus_cart_settings";

/// Orders placed by one user.
#[must_use]
pub fn orders(user_id: &str) -> String {
    format!("nexus_orders_{user_id}")
}

/// Activity log for one user.
#[must_use]
pub fn activity(user_id: &str) -> String {
    format!("nexus_activity_{user_id}")
}
