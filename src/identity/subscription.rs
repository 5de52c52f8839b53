//! Cancellable subscription handle.

use std::fmt;

use super::SubscriptionId;

type Cancel = Box<dyn FnOnce() + Send>;

/// Handle for a registered auth-state listener.
///
/// Dropping the handle unsubscribes. `unsubscribe` may be called any number
/// of times; only the first call has an effect.
pub struct Subscription {
    id: SubscriptionId,
    cancel: Option<Cancel>,
}

impl Subscription {
    /// Create a handle that runs `cancel` when released.
    pub fn new(id: SubscriptionId, cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Create a handle that was never attached to a listener.
    pub fn detached() -> Self {
        Self {
            id: SubscriptionId::new(),
            cancel: None,
        }
    }

    /// Identifier of the registration.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Whether the listener is still registered through this handle.
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    /// Release the listener.
    pub fn unsubscribe(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            tracing::debug!("Releasing subscription {}", self.id);
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
