//! Session store: the single source of truth for who is signed in.
//!
//! The store owns the bearer token and the resolved identity. It is a cheap
//! cloneable handle; the gateway and the access guard hold clones and always
//! read the current value at the moment they need it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

use super::store::{MemoryTokenStore, StoreError, TokenStore};
use crate::types::Role;

/// The signed-in user as reported by the `me` query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub role: Role,
}

/// Authentication state derived from the token and the identity resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// A token exists but its identity has not been resolved yet
    Loading,
    Anonymous,
    Authenticated(Identity),
}

/// Why the last session ended, for the navigation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Explicit logout: go to the anonymous landing page
    LoggedOut,
    /// Credential rejected: go to the login entry point
    Expired,
}

/// Point-in-time view of the session
#[derive(Debug, Clone)]
pub struct Session {
    token: Option<String>,
    generation: u64,
    state: SessionState,
    ended: Option<SessionEnd>,
}

impl Session {
    fn empty() -> Self {
        Self {
            token: None,
            generation: 0,
            state: SessionState::Anonymous,
            ended: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Bumped every time the token changes
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn ended(&self) -> Option<SessionEnd> {
        self.ended
    }

    fn clear(&mut self, reason: SessionEnd) {
        self.token = None;
        self.generation += 1;
        self.state = SessionState::Anonymous;
        self.ended = Some(reason);
    }
}

struct Shared {
    tx: watch::Sender<Session>,
    store: Box<dyn TokenStore>,
}

#[derive(Clone)]
pub struct SessionStore {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.shared.tx.borrow();
        f.debug_struct("SessionStore")
            .field("has_token", &session.token.is_some())
            .field("generation", &session.generation)
            .field("state", &session.state)
            .finish()
    }
}

impl SessionStore {
    /// Open the session from persisted storage. A stored token puts the
    /// session in `Loading` until its identity is resolved.
    pub fn open(store: impl TokenStore + 'static) -> Self {
        let mut session = Session::empty();

        match store.load() {
            Ok(Some(token)) => {
                session.token = Some(token);
                session.state = SessionState::Loading;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Ignoring unreadable session storage: {}", e);
            }
        }

        let (tx, _rx) = watch::channel(session);
        Self {
            shared: Arc::new(Shared {
                tx,
                store: Box::new(store),
            }),
        }
    }

    /// Empty session backed by memory only
    pub fn in_memory() -> Self {
        Self::open(MemoryTokenStore::new())
    }

    /// Current token, read fresh on every call
    pub fn token(&self) -> Option<String> {
        self.shared.tx.borrow().token.clone()
    }

    /// Token and its generation, read atomically
    pub fn credentials(&self) -> (Option<String>, u64) {
        let session = self.shared.tx.borrow();
        (session.token.clone(), session.generation)
    }

    pub fn current_state(&self) -> SessionState {
        self.shared.tx.borrow().state.clone()
    }

    pub fn snapshot(&self) -> Session {
        self.shared.tx.borrow().clone()
    }

    /// Watch session transitions (login, resolution, logout, expiry)
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.shared.tx.subscribe()
    }

    /// Persist a freshly issued token. The identity becomes unresolved until
    /// the identity resolver runs against the new token.
    pub fn login(&self, token: impl Into<String>) -> Result<(), StoreError> {
        let token = token.into();
        self.shared.store.save(&token)?;

        self.shared.tx.send_modify(|session| {
            session.token = Some(token);
            session.generation += 1;
            session.state = SessionState::Loading;
            session.ended = None;
        });
        tracing::info!("Session token stored; identity pending");
        Ok(())
    }

    /// Clear token and identity. Logging out an anonymous session is a no-op.
    pub fn logout(&self) {
        let store = &self.shared.store;
        let changed = self.shared.tx.send_if_modified(|session| {
            if session.token.is_none() && session.state == SessionState::Anonymous {
                return false;
            }
            if let Err(e) = store.clear() {
                tracing::warn!("Failed to clear stored session: {}", e);
            }
            session.clear(SessionEnd::LoggedOut);
            true
        });
        if changed {
            tracing::info!("Logged out");
        }
    }

    /// Drop the credential after the API rejected it. Only the first report
    /// against a given token generation has any effect; returns whether this
    /// call performed the transition.
    pub fn expire(&self, generation: u64) -> bool {
        let store = &self.shared.store;
        let changed = self.shared.tx.send_if_modified(|session| {
            if session.generation != generation || session.token.is_none() {
                return false;
            }
            if let Err(e) = store.clear() {
                tracing::warn!("Failed to clear stored session: {}", e);
            }
            session.clear(SessionEnd::Expired);
            true
        });
        if changed {
            tracing::info!("Session expired; credentials cleared");
        }
        changed
    }

    /// Record a successful identity resolution made with `generation`'s token.
    /// Stale results (token changed meanwhile) are dropped.
    pub fn resolved(&self, generation: u64, identity: Identity) -> bool {
        self.shared.tx.send_if_modified(|session| {
            if session.generation != generation || session.token.is_none() {
                return false;
            }
            tracing::info!("Signed in as {} ({})", identity.email, identity.role);
            session.state = SessionState::Authenticated(identity);
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role) -> Identity {
        Identity {
            id: "u-1".into(),
            email: "ana@ferreteria.bo".into(),
            role,
        }
    }

    #[test]
    fn test_starts_anonymous_without_token() {
        let session = SessionStore::in_memory();
        assert_eq!(session.current_state(), SessionState::Anonymous);
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_stored_token_starts_loading() {
        let session = SessionStore::open(MemoryTokenStore::with_token("tok"));
        assert_eq!(session.current_state(), SessionState::Loading);
        assert_eq!(session.token().as_deref(), Some("tok"));
    }

    #[test]
    fn test_login_then_resolve() {
        let session = SessionStore::in_memory();
        session.login("tok").unwrap();
        assert_eq!(session.current_state(), SessionState::Loading);

        let (_, generation) = session.credentials();
        assert!(session.resolved(generation, identity(Role::Vendedor)));
        assert_eq!(
            session.current_state(),
            SessionState::Authenticated(identity(Role::Vendedor))
        );
    }

    #[test]
    fn test_stale_resolution_is_dropped() {
        let session = SessionStore::in_memory();
        session.login("old").unwrap();
        let (_, stale) = session.credentials();
        session.login("new").unwrap();

        assert!(!session.resolved(stale, identity(Role::Admin)));
        assert_eq!(session.current_state(), SessionState::Loading);
    }

    #[test]
    fn test_logout_is_idempotent() {
        let session = SessionStore::in_memory();
        let rx = session.subscribe();

        session.logout();
        assert_eq!(session.current_state(), SessionState::Anonymous);
        assert!(!rx.has_changed().unwrap());

        session.login("tok").unwrap();
        session.logout();
        session.logout();
        assert_eq!(session.current_state(), SessionState::Anonymous);
        assert_eq!(session.snapshot().ended(), Some(SessionEnd::LoggedOut));
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_expire_only_once_per_generation() {
        let session = SessionStore::in_memory();
        session.login("tok").unwrap();
        let (_, generation) = session.credentials();

        assert!(session.expire(generation));
        assert!(!session.expire(generation));
        assert_eq!(session.current_state(), SessionState::Anonymous);
        assert_eq!(session.snapshot().ended(), Some(SessionEnd::Expired));
    }

    #[test]
    fn test_expire_ignores_reports_about_previous_token() {
        let session = SessionStore::in_memory();
        session.login("first").unwrap();
        let (_, first) = session.credentials();
        session.login("second").unwrap();

        assert!(!session.expire(first));
        assert_eq!(session.token().as_deref(), Some("second"));
    }
}
