#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use url::Url;

use ferreteria_console::auth::{FileTokenStore, Identity, SessionStore};
use ferreteria_console::config::ApiConfig;
use ferreteria_console::gateway::Gateway;
use ferreteria_console::types::Role;

/// One request as the fake API saw it
#[derive(Debug, Clone)]
pub struct Seen {
    pub operation: String,
    pub variables: Value,
    pub authorization: Option<String>,
    pub cache_control: Option<String>,
    pub request_id: Option<String>,
}

#[derive(Default)]
struct Shared {
    script: Mutex<HashMap<String, VecDeque<(u16, Value)>>>,
    seen: Mutex<Vec<Seen>>,
}

/// In-process GraphQL endpoint answering scripted replies by `operationName`
pub struct FakeApi {
    pub port: u16,
    shared: Arc<Shared>,
}

impl FakeApi {
    pub async fn start() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind fake API")?;

        let shared = Arc::new(Shared::default());
        let app = Router::new()
            .route("/graphql", post(graphql))
            .with_state(shared.clone());

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { port, shared })
    }

    pub fn endpoint(&self) -> Url {
        Url::parse(&format!("http://127.0.0.1:{}/graphql", self.port)).expect("valid test URL")
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            endpoint: self.endpoint(),
            timeout_secs: 5,
            user_agent: "ferre-tests".to_string(),
        }
    }

    pub fn gateway(&self, session: SessionStore) -> Gateway {
        Gateway::new(&self.api_config(), session).expect("HTTP client builds")
    }

    /// Answer `operation` once with `{"data": data}`
    pub fn data(&self, operation: &str, data: Value) {
        self.reply(operation, 200, json!({ "data": data }));
    }

    /// Answer `operation` once with a single GraphQL error
    pub fn error(&self, operation: &str, message: &str, code: Option<&str>) {
        let mut error = json!({ "message": message });
        if let Some(code) = code {
            error["extensions"] = json!({ "code": code });
        }
        self.reply(operation, 200, json!({ "data": null, "errors": [error] }));
    }

    pub fn reply(&self, operation: &str, status: u16, body: Value) {
        self.shared
            .script
            .lock()
            .unwrap()
            .entry(operation.to_string())
            .or_default()
            .push_back((status, body));
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.shared.seen.lock().unwrap().clone()
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.seen().iter().filter(|s| s.operation == operation).count()
    }

    pub fn operations(&self) -> Vec<String> {
        self.seen().into_iter().map(|s| s.operation).collect()
    }

    pub fn variables(&self, operation: &str) -> Vec<Value> {
        self.seen()
            .into_iter()
            .filter(|s| s.operation == operation)
            .map(|s| s.variables)
            .collect()
    }
}

async fn graphql(State(shared): State<Arc<Shared>>, headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    let operation = body["operationName"].as_str().unwrap_or_default().to_string();

    shared.seen.lock().unwrap().push(Seen {
        operation: operation.clone(),
        variables: body["variables"].clone(),
        authorization: header("authorization"),
        cache_control: header("cache-control"),
        request_id: header("x-request-id"),
    });

    let next = shared
        .script
        .lock()
        .unwrap()
        .get_mut(&operation)
        .and_then(VecDeque::pop_front);

    match next {
        Some((status, body)) => (StatusCode::from_u16(status).unwrap_or(StatusCode::OK), Json(body)),
        None => (
            StatusCode::OK,
            Json(json!({
                "data": null,
                "errors": [{ "message": format!("no scripted response for {}", operation) }]
            })),
        ),
    }
}

/// Session persisted under `dir`, as the CLI opens it
pub fn file_session(dir: &Path) -> SessionStore {
    SessionStore::open(FileTokenStore::in_dir(dir))
}

/// Session already signed in as `role`
pub fn signed_in(role: Role) -> SessionStore {
    let session = SessionStore::in_memory();
    session.login("integration-token").expect("memory store never fails");
    let (_, generation) = session.credentials();
    session.resolved(
        generation,
        Identity {
            id: "u-int".to_string(),
            email: "int@ferreteria.bo".to_string(),
            role,
        },
    );
    session
}

pub fn me(role: &str) -> Value {
    json!({ "me": { "id": "u-1", "email": "user@ferreteria.bo", "role": role } })
}
