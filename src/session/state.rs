//! Cached authentication state.

use serde::Serialize;

use super::{Session, User};

/// The `{ user, session, loading }` tuple mirrored by the provider.
///
/// `user` is always derived from `session`, so one is present exactly when
/// the other is. Fields are private to keep it that way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthState {
    user: Option<User>,
    session: Option<Session>,
    loading: bool,
}

impl AuthState {
    /// State before the first session fetch resolves.
    pub fn initial() -> Self {
        Self {
            user: None,
            session: None,
            loading: true,
        }
    }

    /// Settled state mirroring `session`.
    pub fn from_session(session: Option<Session>) -> Self {
        Self {
            user: session.as_ref().map(|s| s.user.clone()),
            session,
            loading: false,
        }
    }

    /// Current user, if signed in.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Current session, if signed in.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether a fetch or sign-in/out is in flight.
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Whether a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Replace user and session from `session`, leaving `loading` untouched.
    pub fn set_session(&mut self, session: Option<Session>) {
        self.user = session.as_ref().map(|s| s.user.clone());
        self.session = session;
    }

    /// Set the loading flag.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(email: &str) -> Session {
        Session::issue(User::new(email), Duration::hours(1))
    }

    #[test]
    fn test_initial() {
        let state = AuthState::initial();
        assert!(state.user().is_none());
        assert!(state.session().is_none());
        assert!(state.loading());
        assert_eq!(state, AuthState::default());
    }

    #[test]
    fn test_from_session_derives_user() {
        let s = session("a@b.com");
        let state = AuthState::from_session(Some(s.clone()));

        assert_eq!(state.user(), Some(&s.user));
        assert_eq!(state.session(), Some(&s));
        assert!(!state.loading());
        assert!(state.is_authenticated());
    }

    #[test]
    fn test_from_none() {
        let state = AuthState::from_session(None);
        assert!(state.user().is_none());
        assert!(state.session().is_none());
        assert!(!state.loading());
        assert!(!state.is_authenticated());
    }

    #[test]
    fn test_set_session_keeps_user_paired() {
        let mut state = AuthState::initial();

        state.set_session(Some(session("x@y.com")));
        assert_eq!(state.user().is_some(), state.session().is_some());
        assert!(state.loading());

        state.set_session(None);
        assert!(state.user().is_none());
        assert!(state.session().is_none());
    }

    #[test]
    fn test_serialize_shape() {
        let json = serde_json::to_value(AuthState::initial()).unwrap();
        assert!(json["user"].is_null());
        assert!(json["session"].is_null());
        assert_eq!(json["loading"], true);
    }
}
