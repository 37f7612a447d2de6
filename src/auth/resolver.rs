use serde_json::json;
use tracing::{debug, warn};

use super::session::{Identity, SessionState};
use crate::error::ClientError;
use crate::gateway::{Gateway, Operation};

pub const ME: Operation = Operation::query(
    "Me",
    "me",
    r#"query Me {
  me {
    id
    email
    role
  }
}"#,
);

/// Turns the session's token into an identity by asking the API who it
/// belongs to.
///
/// A rejected or unreadable answer ends the session: the stored token is
/// dropped and the state becomes `Anonymous`. There is no retry. A transport
/// failure leaves the token and the `Loading` state untouched and is
/// returned to the caller.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    gateway: Gateway,
}

impl IdentityResolver {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn resolve(&self) -> Result<SessionState, ClientError> {
        let session = self.gateway.session();
        let (token, generation) = session.credentials();
        if token.is_none() {
            return Ok(SessionState::Anonymous);
        }

        match self.gateway.execute::<Option<Identity>>(&ME, json!({})).await {
            Ok(Some(identity)) => {
                if !session.resolved(generation, identity) {
                    debug!("Discarding identity resolved for a replaced token");
                }
            }
            Ok(None) => {
                warn!("Identity query returned no user; signing out");
                session.expire(generation);
            }
            // Already handled by the gateway
            Err(ClientError::SessionExpired) => {}
            Err(e @ ClientError::Transport(_)) => {
                warn!("Identity resolution could not reach the API; keeping the token: {}", e);
                return Err(e);
            }
            Err(e) => {
                warn!("Identity resolution failed; signing out: {}", e);
                session.expire(generation);
            }
        }

        Ok(session.current_state())
    }

    /// Resolve only while the session is still loading
    pub async fn ensure_resolved(&self) -> Result<SessionState, ClientError> {
        match self.gateway.session().current_state() {
            SessionState::Loading => self.resolve().await,
            settled => Ok(settled),
        }
    }
}
