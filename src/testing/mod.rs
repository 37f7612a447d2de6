use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use url::Url;

use crate::auth::{Identity, MemoryTokenStore, SessionStore};
use crate::gateway::{Gateway, OutboundRequest, RawResponse, Transport, TransportError};
use crate::types::Role;

enum Scripted {
    Reply(RawResponse),
    Fail,
}

/// In-memory transport answering by `operationName`, in the order scripted.
/// Every request is recorded for later inspection.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, operation: &str, entry: Scripted) {
        self.script
            .lock()
            .unwrap()
            .entry(operation.to_string())
            .or_default()
            .push_back(entry);
    }

    /// Answer `operation` once with `{"data": data}`
    pub fn data(&self, operation: &str, data: Value) {
        self.status(operation, 200, json!({ "data": data }));
    }

    /// Answer `operation` once with a single GraphQL error
    pub fn errors(&self, operation: &str, message: &str, code: Option<&str>) {
        let error = match code {
            Some(code) => json!({ "message": message, "extensions": { "code": code } }),
            None => json!({ "message": message }),
        };
        self.status(operation, 200, json!({ "data": null, "errors": [error] }));
    }

    pub fn status(&self, operation: &str, status: u16, body: Value) {
        self.push(
            operation,
            Scripted::Reply(RawResponse {
                status,
                body: body.to_string(),
            }),
        );
    }

    /// Fail `operation` once without a response
    pub fn fail(&self, operation: &str) {
        self.push(operation, Scripted::Fail);
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.operation_name() == Some(operation))
            .count()
    }

    /// Variables of every call to `operation`, in order
    pub fn variables(&self, operation: &str) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.operation_name() == Some(operation))
            .map(|r| r.body["variables"].clone())
            .collect()
    }

    /// Operation names in the order they were sent
    pub fn sequence(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| r.operation_name().map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        let operation = request.operation_name().unwrap_or_default().to_string();
        let next = self
            .script
            .lock()
            .unwrap()
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);

        match next {
            Some(Scripted::Reply(response)) => Ok(response),
            Some(Scripted::Fail) => Err(TransportError::Connect("connection refused".to_string())),
            None => Ok(RawResponse {
                status: 200,
                body: json!({
                    "data": null,
                    "errors": [{ "message": format!("no scripted response for {}", operation) }]
                })
                .to_string(),
            }),
        }
    }
}

/// Gateway whose session is already resolved to `role`
pub fn gateway_as(role: Role, transport: Arc<ScriptedTransport>) -> Gateway {
    let session = SessionStore::open(MemoryTokenStore::with_token("test-token"));
    let (_, generation) = session.credentials();
    session.resolved(
        generation,
        Identity {
            id: "u-test".into(),
            email: "test@ferreteria.bo".into(),
            role,
        },
    );
    Gateway::with_transport(endpoint(), transport, session)
}

pub fn endpoint() -> Url {
    Url::parse("http://api.test/graphql").unwrap()
}
