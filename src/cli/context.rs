use anyhow::bail;

use super::config::token_store;
use super::SESSION_EXPIRED_MESSAGE;
use crate::auth::{AccessGuard, Decision, Identity, IdentityResolver, Requirement, SessionEnd, SessionState, SessionStore};
use crate::config::config;
use crate::error::ClientError;
use crate::gateway::Gateway;

/// Everything a command needs: the persisted session, a gateway bound to it
/// and a guard reading it.
#[derive(Debug, Clone)]
pub struct Console {
    gateway: Gateway,
    guard: AccessGuard,
}

impl Console {
    /// Session from the CLI config directory, gateway from the app config
    pub fn open() -> anyhow::Result<Self> {
        let app = config();
        let session = SessionStore::open(token_store()?);
        let gateway = Gateway::new(&app.api, session)?.log_graphql_errors(app.logging.log_graphql_errors);
        Ok(Self::with_gateway(gateway))
    }

    pub fn with_gateway(gateway: Gateway) -> Self {
        let guard = AccessGuard::new(gateway.session().clone());
        Self { gateway, guard }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn session(&self) -> &SessionStore {
        self.gateway.session()
    }

    /// Settle a stored token into an identity, asking the API at most once
    pub async fn resolve(&self) -> Result<SessionState, ClientError> {
        IdentityResolver::new(self.gateway.clone()).ensure_resolved().await
    }

    /// Resolve the session, then apply the guard. Nothing is sent to the
    /// API for the guarded operation unless this returns the identity.
    pub async fn authorize(&self, requirement: Requirement) -> anyhow::Result<Identity> {
        let state = self.resolve().await?;

        match (self.guard.check(&requirement), state) {
            (Decision::Allow, SessionState::Authenticated(identity)) => Ok(identity),
            (Decision::DenyRedirect, SessionState::Authenticated(identity)) => match requirement.permission {
                Some((resource, action)) => bail!("{} may not {} {}", identity.role, action, resource),
                None => bail!("{} may not use this command", identity.role),
            },
            (Decision::Pending, _) => bail!("session is still being resolved"),
            _ if self.session().snapshot().ended() == Some(SessionEnd::Expired) => {
                bail!(SESSION_EXPIRED_MESSAGE)
            }
            _ => bail!("not signed in; run `ferre auth login` first"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;
    use crate::testing::{endpoint, gateway_as, ScriptedTransport};
    use crate::types::{Action, Resource, Role};
    use serde_json::json;

    #[tokio::test]
    async fn test_authorize_denies_before_any_call() {
        let transport = ScriptedTransport::new();
        let console = Console::with_gateway(gateway_as(Role::Vendedor, transport.clone()));

        let err = console
            .authorize(Requirement::permission(Resource::Usuarios, Action::View))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "VENDEDOR may not VIEW USUARIOS");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_stored_token_reads_as_expired() {
        let transport = ScriptedTransport::new();
        transport.status("Me", 401, json!({ "errors": [{ "message": "Unauthorized" }] }));
        let session = SessionStore::open(MemoryTokenStore::with_token("old"));
        let console = Console::with_gateway(Gateway::with_transport(endpoint(), transport.clone(), session));

        let err = console.authorize(Requirement::authenticated()).await.unwrap_err();
        assert_eq!(err.to_string(), SESSION_EXPIRED_MESSAGE);
        assert_eq!(transport.calls("Me"), 1);
    }

    #[tokio::test]
    async fn test_unreachable_api_keeps_stored_token() {
        let transport = ScriptedTransport::new();
        transport.fail("Me");
        let session = SessionStore::open(MemoryTokenStore::with_token("good-token"));
        let console = Console::with_gateway(Gateway::with_transport(endpoint(), transport, session.clone()));

        let err = console.authorize(Requirement::authenticated()).await.unwrap_err();
        assert!(err.to_string().starts_with("Transport error"));
        assert_eq!(session.token().as_deref(), Some("good-token"));
        assert_eq!(session.snapshot().ended(), None);
    }

    #[tokio::test]
    async fn test_anonymous_is_told_to_log_in() {
        let transport = ScriptedTransport::new();
        let console = Console::with_gateway(Gateway::with_transport(
            endpoint(),
            transport,
            SessionStore::in_memory(),
        ));

        let err = console.authorize(Requirement::authenticated()).await.unwrap_err();
        assert!(err.to_string().starts_with("not signed in"));
    }
}
