//! Remote data gateway.
//!
//! Every call goes through [`Gateway::execute`], which attaches the current
//! bearer token, sends the operation, and sorts the outcome into transport
//! failures, authentication failures (which end the session) and
//! application errors (returned verbatim). Nothing is cached.

pub mod operation;
pub mod response;
pub mod transport;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, warn};
use url::Url;
use uuid::Uuid;

use crate::auth::SessionStore;
use crate::config::ApiConfig;
use crate::error::{ClientError, GraphQLError};

pub use operation::{Operation, OperationKind};
pub use response::{classify, is_auth_error, Reply};
pub use transport::{HttpTransport, OutboundRequest, RawResponse, Transport, TransportError};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct Gateway {
    endpoint: Url,
    transport: Arc<dyn Transport>,
    session: SessionStore,
    log_graphql_errors: bool,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("endpoint", &self.endpoint.as_str())
            .field("session", &self.session)
            .finish()
    }
}

impl Gateway {
    /// Gateway over HTTP using the configured endpoint
    pub fn new(api: &ApiConfig, session: SessionStore) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(api).map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self::with_transport(api.endpoint.clone(), Arc::new(transport), session))
    }

    pub fn with_transport(endpoint: Url, transport: Arc<dyn Transport>, session: SessionStore) -> Self {
        Self {
            endpoint,
            transport,
            session,
            log_graphql_errors: true,
        }
    }

    pub fn log_graphql_errors(mut self, enabled: bool) -> Self {
        self.log_graphql_errors = enabled;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Run `op` and deserialize the value under its root field
    pub async fn execute<T: DeserializeOwned>(&self, op: &Operation, variables: Value) -> Result<T, ClientError> {
        let mut data = self.execute_raw(op, variables).await?;

        let root = data
            .as_object_mut()
            .and_then(|fields| fields.remove(op.root_field))
            .ok_or_else(|| ClientError::Decode(format!("{}: missing field '{}'", op.name, op.root_field)))?;

        serde_json::from_value(root).map_err(|e| ClientError::Decode(format!("{}: {}", op.name, e)))
    }

    /// Run `op` and return the whole `data` object
    pub async fn execute_raw(&self, op: &Operation, variables: Value) -> Result<Value, ClientError> {
        // Read at call time so a login or logout in between is honoured
        let (token, generation) = self.session.credentials();
        let request = self.build_request(op, variables, token.as_deref());
        let request_id = request.header(REQUEST_ID_HEADER).unwrap_or_default().to_string();

        debug!(
            operation = op.name,
            kind = ?op.kind,
            request_id = %request_id,
            authenticated = token.is_some(),
            "Sending GraphQL operation"
        );

        let raw = match self.transport.send(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(operation = op.name, request_id = %request_id, "Transport failure: {}", e);
                return Err(ClientError::Transport(e.to_string()));
            }
        };

        match classify(raw.status, &raw.body) {
            Reply::Data(data) => Ok(data),

            Reply::Unauthenticated(errors) if op.public => {
                warn!(operation = op.name, request_id = %request_id, "Credentials rejected");
                Err(rejection(errors))
            }

            Reply::Unauthenticated(_) => {
                if self.session.expire(generation) {
                    warn!(operation = op.name, request_id = %request_id, "Session rejected by the API; signed out");
                } else {
                    debug!(operation = op.name, request_id = %request_id, "Auth failure for an already-ended session");
                }
                Err(ClientError::SessionExpired)
            }

            Reply::Rejected(errors) => {
                warn!(operation = op.name, request_id = %request_id, count = errors.len(), "GraphQL errors");
                if self.log_graphql_errors {
                    for e in &errors {
                        warn!(
                            operation = op.name,
                            path = ?e.path,
                            code = e.code().unwrap_or("-"),
                            "[GraphQL error] {}",
                            e.message
                        );
                    }
                }
                Err(ClientError::Application(errors))
            }

            Reply::HttpFailure { status, body } => {
                error!(operation = op.name, request_id = %request_id, status, "HTTP failure: {}", body);
                Err(ClientError::Transport(format!("HTTP {}", status)))
            }

            Reply::Malformed(reason) => {
                error!(operation = op.name, request_id = %request_id, "Unreadable response: {}", reason);
                Err(ClientError::Decode(reason))
            }
        }
    }

    fn build_request(&self, op: &Operation, variables: Value, token: Option<&str>) -> OutboundRequest {
        let mut headers = vec![
            ("cache-control", "no-cache".to_string()),
            ("pragma", "no-cache".to_string()),
            (REQUEST_ID_HEADER, Uuid::new_v4().to_string()),
        ];
        if let Some(token) = token {
            headers.push(("authorization", format!("Bearer {}", token)));
        }

        OutboundRequest {
            url: self.endpoint.clone(),
            headers,
            body: json!({
                "operationName": op.name,
                "query": op.document,
                "variables": variables,
            }),
        }
    }
}

fn rejection(errors: Vec<GraphQLError>) -> ClientError {
    if errors.is_empty() {
        ClientError::application("Unauthorized", Some("UNAUTHENTICATED"))
    } else {
        ClientError::Application(errors)
    }
}
