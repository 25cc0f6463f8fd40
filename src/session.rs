//! Who is logged in, for the lifetime of the running process.
//!
//! Nothing here is persisted: a restart always begins signed out.

use parking_lot::RwLock;
use std::sync::Arc;

/// Shared handle to the current session. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    current: Arc<RwLock<Option<String>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `identifier` as the logged-in account, replacing any previous one.
    pub fn set_current(&self, identifier: impl Into<String>) {
        let identifier = identifier.into();
        tracing::debug!(identifier = %identifier, "Session started");
        *self.current.write() = Some(identifier);
    }

    /// Drop the current identifier.
    pub fn clear(&self) {
        if let Some(previous) = self.current.write().take() {
            tracing::debug!(identifier = %previous, "Session cleared");
        }
    }

    pub fn current(&self) -> Option<String> {
        self.current.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_signed_out() {
        let session = SessionContext::new();
        assert_eq!(session.current(), None);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn set_replace_and_clear() {
        let session = SessionContext::new();

        session.set_current("a@x.com");
        assert_eq!(session.current().as_deref(), Some("a@x.com"));

        session.set_current("b@x.com");
        assert_eq!(session.current().as_deref(), Some("b@x.com"));

        session.clear();
        assert_eq!(session.current(), None);
        session.clear();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn clones_share_state() {
        let session = SessionContext::new();
        let handle = session.clone();

        handle.set_current("a@x.com");
        assert!(session.is_authenticated());
    }
}
