//! Session context
//!
//! Single ownership point for the bearer credential. The console core
//! never touches ambient globals for auth: the backend client reads the
//! credential from here at call time, and everything interested in auth
//! transitions watches the state channel. Token issuance lives outside
//! this crate; a credential arrives ready-made from config, env or flag.

use tokio::sync::{watch, RwLock};
use tracing::{info, warn};

/// Where the session currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No credential installed
    SignedOut,
    /// Credential present and not known to be stale
    Active,
    /// Backend refused the credential; operator must re-authenticate
    Expired,
}

/// Holds the bearer credential and broadcasts auth transitions
pub struct SessionContext {
    credential: RwLock<Option<String>>,
    state_tx: watch::Sender<AuthState>,
}

impl SessionContext {
    /// Start signed out
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(AuthState::SignedOut);
        Self {
            credential: RwLock::new(None),
            state_tx,
        }
    }

    /// Start with a credential already installed
    pub fn with_credential(token: impl Into<String>) -> Self {
        let (state_tx, _) = watch::channel(AuthState::Active);
        Self {
            credential: RwLock::new(Some(token.into())),
            state_tx,
        }
    }

    /// Install a credential and mark the session active
    pub async fn sign_in(&self, token: impl Into<String>) {
        *self.credential.write().await = Some(token.into());
        self.state_tx.send_replace(AuthState::Active);
        info!("Session active");
    }

    /// The one exit point: drop the credential and tell every watcher
    pub async fn sign_out(&self) {
        *self.credential.write().await = None;
        self.state_tx.send_replace(AuthState::SignedOut);
        info!("Session signed out");
    }

    /// Called when the backend answers 401: the credential is useless
    /// now, so drop it and signal watchers to re-authenticate
    pub async fn mark_expired(&self) {
        *self.credential.write().await = None;
        self.state_tx.send_replace(AuthState::Expired);
        warn!("Session credential rejected by backend, re-authentication required");
    }

    /// Current credential, if any
    pub async fn bearer_token(&self) -> Option<String> {
        self.credential.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.credential.read().await.is_some()
    }

    /// Current state without subscribing
    pub fn state(&self) -> AuthState {
        *self.state_tx.borrow()
    }

    /// Subscribe to auth transitions
    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_starts_signed_out() {
        let session = SessionContext::new();
        assert_eq!(session.state(), AuthState::SignedOut);
        assert!(!session.is_authenticated().await);
        assert_eq!(session.bearer_token().await, None);
    }

    #[tokio::test]
    async fn test_sign_in_activates() {
        let session = SessionContext::new();
        session.sign_in("secret-token").await;

        assert_eq!(session.state(), AuthState::Active);
        assert_eq!(session.bearer_token().await.as_deref(), Some("secret-token"));
    }

    #[tokio::test]
    async fn test_with_credential_is_active() {
        let session = SessionContext::with_credential("secret-token");
        assert_eq!(session.state(), AuthState::Active);
        assert!(session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_sign_out_clears_and_notifies() {
        let session = SessionContext::with_credential("secret-token");
        let mut rx = session.watch();

        session.sign_out().await;

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), AuthState::SignedOut);
        assert_eq!(session.bearer_token().await, None);
    }

    #[tokio::test]
    async fn test_mark_expired_drops_credential() {
        let session = SessionContext::with_credential("stale-token");
        let mut rx = session.watch();

        session.mark_expired().await;

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), AuthState::Expired);
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_sign_in_after_expiry_reactivates() {
        let session = SessionContext::with_credential("stale-token");
        session.mark_expired().await;
        session.sign_in("fresh-token").await;

        assert_eq!(session.state(), AuthState::Active);
        assert_eq!(session.bearer_token().await.as_deref(), Some("fresh-token"));
    }
}
