//! Listener storage and dispatch.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::{AuthChangeEvent, AuthListener, Subscription, SubscriptionId};
use crate::error::AuthContextError;
use crate::session::Session;
use crate::Result;

/// Thread-safe registry of auth-state listeners.
///
/// Listeners are keyed by [`SubscriptionId`], so dispatch follows
/// registration order. Dispatch clones the listener list and releases the
/// lock before calling out, so a listener may register or unregister
/// without deadlocking.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<BTreeMap<SubscriptionId, AuthListener>>,
}

impl ListenerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener and return the handle that releases it.
    ///
    /// The handle only holds a weak reference to the registry; releasing it
    /// after the registry is gone is a no-op.
    pub fn register(self: &Arc<Self>, listener: AuthListener) -> Result<Subscription> {
        let id = SubscriptionId::new();

        let mut listeners = self
            .listeners
            .write()
            .map_err(|_| AuthContextError::LockPoisoned)?;
        listeners.insert(id, listener);

        let registry = Arc::downgrade(self);
        Ok(Subscription::new(id, move || {
            if let Some(registry) = registry.upgrade() {
                let _ = registry.remove(&id);
            }
        }))
    }

    /// Remove a listener.
    ///
    /// Returns whether the listener was registered.
    pub fn remove(&self, id: &SubscriptionId) -> Result<bool> {
        let mut listeners = self
            .listeners
            .write()
            .map_err(|_| AuthContextError::LockPoisoned)?;
        Ok(listeners.remove(id).is_some())
    }

    /// Get the number of registered listeners.
    pub fn count(&self) -> usize {
        self.listeners.read().map(|l| l.len()).unwrap_or(0)
    }

    /// Deliver an event to every listener.
    ///
    /// Returns the number of listeners called.
    pub fn emit(&self, event: AuthChangeEvent, session: Option<&Session>) -> Result<usize> {
        let snapshot: Vec<AuthListener> = {
            let listeners = self
                .listeners
                .read()
                .map_err(|_| AuthContextError::LockPoisoned)?;
            listeners.values().cloned().collect()
        };

        for listener in &snapshot {
            listener(event, session.cloned());
        }
        Ok(snapshot.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::User;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> AuthListener) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_for = {
            let log = Arc::clone(&log);
            move |name: &str| -> AuthListener {
                let log = Arc::clone(&log);
                let name = name.to_string();
                Arc::new(move |event: AuthChangeEvent, session: Option<Session>| {
                    let email = session.map(|s| s.user.email).unwrap_or_default();
                    log.lock().unwrap().push(format!("{name}:{event}:{email}"));
                })
            }
        };
        (log, log_for)
    }

    #[test]
    fn test_register_and_emit() {
        let registry = Arc::new(ListenerRegistry::new());
        let (log, listener) = recorder();

        let _sub = registry.register(listener("a")).unwrap();
        let session = Session::issue(User::new("a@b.com"), chrono::Duration::hours(1));
        let delivered = registry
            .emit(AuthChangeEvent::SignedIn, Some(&session))
            .unwrap();

        assert_eq!(delivered, 1);
        assert_eq!(*log.lock().unwrap(), vec!["a:SIGNED_IN:a@b.com"]);
    }

    #[test]
    fn test_dispatch_follows_registration_order() {
        let registry = Arc::new(ListenerRegistry::new());
        let (log, listener) = recorder();

        let _first = registry.register(listener("first")).unwrap();
        let _second = registry.register(listener("second")).unwrap();
        registry.emit(AuthChangeEvent::SignedOut, None).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["first:SIGNED_OUT:", "second:SIGNED_OUT:"]
        );
    }

    #[test]
    fn test_dropping_handle_removes_listener() {
        let registry = Arc::new(ListenerRegistry::new());
        let (log, listener) = recorder();

        let sub = registry.register(listener("a")).unwrap();
        let id = sub.id();
        assert_eq!(registry.count(), 1);

        drop(sub);
        assert_eq!(registry.count(), 0);
        assert!(!registry.remove(&id).unwrap());
        assert_eq!(registry.emit(AuthChangeEvent::SignedOut, None).unwrap(), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_handle_outlives_registry() {
        let registry = Arc::new(ListenerRegistry::new());
        let (_log, listener) = recorder();

        let mut sub = registry.register(listener("a")).unwrap();
        drop(registry);
        sub.unsubscribe();
        assert!(!sub.is_active());
    }

    #[test]
    fn test_listener_may_unsubscribe_during_dispatch() {
        let registry = Arc::new(ListenerRegistry::new());
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let slot_in_listener = Arc::clone(&slot);
        let sub = registry
            .register(Arc::new(move |_: AuthChangeEvent, _: Option<Session>| {
                if let Some(mut sub) = slot_in_listener.lock().unwrap().take() {
                    sub.unsubscribe();
                }
            }))
            .unwrap();
        *slot.lock().unwrap() = Some(sub);

        assert_eq!(registry.emit(AuthChangeEvent::SignedOut, None).unwrap(), 1);
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_concurrent_registration() {
        use std::thread;

        let registry = Arc::new(ListenerRegistry::new());
        let handles: Vec<_> = (0..50)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry
                        .register(Arc::new(|_: AuthChangeEvent, _: Option<Session>| {}))
                        .unwrap()
                })
            })
            .collect();

        let subs: Vec<Subscription> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(registry.count(), 50);

        drop(subs);
        assert_eq!(registry.count(), 0);
    }
}
