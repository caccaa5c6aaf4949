//! Change Notifier
//!
//! Decouples cart mutations from the page controllers that re-render on
//! change. Dispatch is synchronous; a panicking listener is caught and logged
//! so one faulty subscriber cannot block the others.

use std::{fmt, panic::AssertUnwindSafe};

use slotmap::{SlotMap, new_key_type};

use crate::items::CartItem;

new_key_type! {
    /// Handle returned by [`ChangeNotifier::subscribe`], used to unsubscribe.
    pub struct ListenerKey;
}

type Listener = Box<dyn Fn(&[CartItem])>;

/// Subscriber list with synchronous dispatch.
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: SlotMap<ListenerKey, Listener>,
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ChangeNotifier {
    /// Create a notifier with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked with the current item list on every cart
    /// mutation.
    pub fn subscribe(&mut self, listener: impl Fn(&[CartItem]) + 'static) -> ListenerKey {
        self.listeners.insert(Box::new(listener))
    }

    /// Remove a previously registered callback. Returns `false` when the key
    /// was already gone.
    pub fn unsubscribe(&mut self, key: ListenerKey) -> bool {
        self.listeners.remove(key).is_some()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Invoke every listener with the current item list, in registration
    /// order as far as the registry allows. A panicking listener is caught
    /// and logged; the remaining listeners still run.
    pub fn notify(&self, items: &[CartItem]) {
        for (key, listener) in &self.listeners {
            let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| listener(items)));

            if outcome.is_err() {
                tracing::error!(?key, "cart listener panicked during notify");
            }
        }
    }
}
