//! Process-wide session context. One watch channel replaces the ad hoc
//! logged-in booleans a UI tends to grow: every observer subscribes to the
//! same state, and the context is populated once at startup from the
//! provider's session restore.

use crate::{errors::AuthError, provider::IdentityProvider, provider::Session};
use tokio::sync::watch;
use tracing::debug;

/// Shared handle to the current session.
pub struct SessionContext {
    current: watch::Sender<Option<Session>>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    #[must_use]
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self { current }
    }

    /// Populate the context from the provider, once at startup.
    ///
    /// Returns whether a session was recovered. A missing session is not an
    /// error; the user simply is not signed in yet.
    pub async fn restore<P: IdentityProvider>(&self, provider: &P) -> Result<bool, AuthError> {
        match provider.restore_session().await? {
            Some(session) => {
                debug!("session restored");
                self.set_session(session);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Update the in-memory session after login.
    pub fn set_session(&self, session: Session) {
        self.current.send_replace(Some(session));
    }

    /// Clear the in-memory session, typically on logout.
    pub fn clear_session(&self) {
        self.current.send_replace(None);
    }

    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Observe session changes; receivers see the latest value immediately.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }
}
