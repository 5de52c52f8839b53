//! Explicit consumer tree.

use std::fmt;
use std::sync::Arc;

use super::AuthContext;

struct Node {
    name: String,
    parent: Option<Scope>,
    auth: Option<AuthContext>,
}

/// A node in the tree of auth consumers.
///
/// A provider's context is attached to a scope with [`provide`](Self::provide);
/// every descendant of that scope can look it up with
/// [`use_auth`](super::use_auth). The nearest provider wins.
#[derive(Clone)]
pub struct Scope {
    node: Arc<Node>,
}

impl Scope {
    /// Create a root scope with no provider.
    pub fn root() -> Self {
        Self::with_parent("root", None, None)
    }

    fn with_parent(name: &str, parent: Option<Scope>, auth: Option<AuthContext>) -> Self {
        Self {
            node: Arc::new(Node {
                name: name.to_string(),
                parent,
                auth,
            }),
        }
    }

    /// Create a child scope.
    pub fn child(&self, name: &str) -> Self {
        Self::with_parent(name, Some(self.clone()), None)
    }

    /// Create a child scope that provides `auth` to its subtree.
    pub fn provide(&self, auth: AuthContext) -> Self {
        Self::with_parent("AuthProvider", Some(self.clone()), Some(auth))
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }

    pub fn parent(&self) -> Option<&Scope> {
        self.node.parent.as_ref()
    }

    /// Slash-separated names from the root down to this scope.
    pub fn path(&self) -> String {
        let mut names = Vec::new();
        let mut current = Some(self);
        while let Some(scope) = current {
            names.push(scope.name());
            current = scope.parent();
        }
        names.reverse();
        names.join("/")
    }

    /// Nearest auth context at or above this scope.
    pub(crate) fn find_auth(&self) -> Option<&AuthContext> {
        let mut current = Some(self);
        while let Some(scope) = current {
            if let Some(auth) = &scope.node.auth {
                return Some(auth);
            }
            current = scope.parent();
        }
        None
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("path", &self.path())
            .field("provides_auth", &self.node.auth.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path() {
        let page = Scope::root().child("app").child("page");
        assert_eq!(page.path(), "root/app/page");
        assert_eq!(page.parent().unwrap().name(), "app");
    }

    #[test]
    fn test_no_provider() {
        let page = Scope::root().child("page");
        assert!(page.find_auth().is_none());
    }
}
