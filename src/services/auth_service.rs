use serde_json::json;

use crate::auth::{IdentityResolver, SessionState};
use crate::error::ClientError;
use crate::gateway::{Gateway, Operation};

pub const LOGIN: Operation = Operation::mutation(
    "Login",
    "login",
    r#"mutation Login($email: String!, $password: String!) {
  login(email: $email, password: $password)
}"#,
)
.public();

pub const REGISTER: Operation = Operation::mutation(
    "Register",
    "register",
    r#"mutation Register($email: String!, $password: String!) {
  register(email: $email, password: $password)
}"#,
)
.public();

pub struct AuthService {
    gateway: Gateway,
}

impl AuthService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Exchange credentials for a token, store it and resolve who it belongs to
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionState, ClientError> {
        let token: String = self
            .gateway
            .execute(&LOGIN, json!({ "email": email, "password": password }))
            .await?;
        self.start_session(token).await
    }

    /// Create an account; the API signs the new user in directly
    pub async fn register(&self, email: &str, password: &str) -> Result<SessionState, ClientError> {
        let token: String = self
            .gateway
            .execute(&REGISTER, json!({ "email": email, "password": password }))
            .await?;
        self.start_session(token).await
    }

    pub fn logout(&self) {
        self.gateway.session().logout();
    }

    async fn start_session(&self, token: String) -> Result<SessionState, ClientError> {
        if token.trim().is_empty() {
            return Err(ClientError::Decode("empty token issued".into()));
        }
        self.gateway.session().login(token)?;
        IdentityResolver::new(self.gateway.clone()).resolve().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionStore;
    use crate::testing::{endpoint, ScriptedTransport};
    use crate::types::Role;

    #[tokio::test]
    async fn test_login_resolves_identity_with_new_token() {
        let transport = ScriptedTransport::new();
        transport.data("Login", json!({ "login": "fresh" }));
        transport.data("Me", json!({ "me": { "id": "2", "email": "v@f.bo", "role": "VENDEDOR" } }));
        let gateway = Gateway::with_transport(endpoint(), transport.clone(), SessionStore::in_memory());

        let state = AuthService::new(gateway).login("v@f.bo", "secret").await.unwrap();
        assert!(matches!(state, SessionState::Authenticated(ref i) if i.role == Role::Vendedor));

        let sent = transport.requests();
        assert_eq!(sent[0].header("authorization"), None);
        assert_eq!(sent[1].header("authorization"), Some("Bearer fresh"));
    }

    #[tokio::test]
    async fn test_bad_credentials_leave_session_anonymous() {
        let transport = ScriptedTransport::new();
        transport.errors("Login", "Credenciales inválidas", Some("UNAUTHENTICATED"));
        let gateway = Gateway::with_transport(endpoint(), transport, SessionStore::in_memory());

        let err = AuthService::new(gateway.clone()).login("x", "y").await.unwrap_err();
        assert_eq!(err.to_string(), "Credenciales inválidas");
        assert_eq!(gateway.session().current_state(), SessionState::Anonymous);
    }
}
