//! Context lookup hooks.

use serde::Serialize;

use super::{AuthContext, Scope};
use crate::session::User;

/// Derived view returned by [`use_require_auth`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequireAuth {
    pub is_authenticated: bool,
    pub user: Option<User>,
    pub loading: bool,
}

/// Look up the nearest auth context above `scope`.
///
/// # Panics
///
/// Panics if no ancestor of `scope` provides an auth context. That is a
/// wiring mistake in the consumer tree, not a runtime condition.
pub fn use_auth(scope: &Scope) -> AuthContext {
    match try_use_auth(scope) {
        Some(auth) => auth,
        None => panic!(
            "use_auth must be used within an AuthProvider (scope: {})",
            scope.path()
        ),
    }
}

/// Non-panicking variant of [`use_auth`].
pub fn try_use_auth(scope: &Scope) -> Option<AuthContext> {
    scope.find_auth().cloned()
}

/// Authentication status for gating content.
///
/// # Panics
///
/// Same as [`use_auth`].
pub fn use_require_auth(scope: &Scope) -> RequireAuth {
    let state = use_auth(scope).state();
    RequireAuth {
        is_authenticated: state.is_authenticated(),
        user: state.user().cloned(),
        loading: state.loading(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::identity::{AuthChangeEvent, MemoryIdentityService};
    use crate::provider::AuthProvider;
    use crate::session::Session;

    #[test]
    #[should_panic(expected = "use_auth must be used within an AuthProvider")]
    fn test_use_auth_without_provider_panics() {
        let scope = Scope::root().child("page");
        use_auth(&scope);
    }

    #[test]
    fn test_try_use_auth_without_provider() {
        assert!(try_use_auth(&Scope::root()).is_none());
    }

    #[test]
    fn test_use_auth_finds_ancestor() {
        let provider = AuthProvider::new(Arc::new(MemoryIdentityService::new()));
        let page = Scope::root()
            .provide(provider.context())
            .child("layout")
            .child("page");

        let auth = use_auth(&page);
        assert!(auth.loading());
    }

    #[test]
    fn test_nearest_provider_wins() {
        let outer = AuthProvider::new(Arc::new(MemoryIdentityService::new()));
        let inner = AuthProvider::new(Arc::new(MemoryIdentityService::new()));
        let session = Session::issue(User::new("inner@x.com"), chrono::Duration::hours(1));
        inner.on_session_changed(AuthChangeEvent::SignedIn, Some(session));

        let page = Scope::root()
            .provide(outer.context())
            .child("section")
            .provide(inner.context())
            .child("page");

        assert_eq!(use_auth(&page).user().unwrap().email, "inner@x.com");
    }

    #[test]
    fn test_use_require_auth() {
        let provider = AuthProvider::new(Arc::new(MemoryIdentityService::new()));
        let page = Scope::root().provide(provider.context()).child("page");

        assert_eq!(
            use_require_auth(&page),
            RequireAuth {
                is_authenticated: false,
                user: None,
                loading: true,
            }
        );

        let session = Session::issue(User::new("u@x.com"), chrono::Duration::hours(1));
        provider.on_session_changed(AuthChangeEvent::SignedIn, Some(session.clone()));

        let view = use_require_auth(&page);
        assert!(view.is_authenticated);
        assert_eq!(view.user, Some(session.user));
        assert!(!view.loading);
    }
}
