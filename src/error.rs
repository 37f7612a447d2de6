// Client error types
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::auth::StoreError;

/// One entry of a GraphQL `errors` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default)]
    pub path: Option<Vec<Value>>,
    #[serde(default)]
    pub extensions: Option<Value>,
}

impl GraphQLError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            extensions: None,
        }
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.extensions = Some(serde_json::json!({ "code": code }));
        self
    }

    /// Machine-readable error code from `extensions.code`, when present
    pub fn code(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .and_then(Value::as_str)
    }
}

/// Errors surfaced by the gateway and the typed API layer
#[derive(Debug, Error)]
pub enum ClientError {
    /// No response was received (connection refused, timeout, TLS failure)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The credential was rejected. The session has already been cleared and
    /// the caller should send the user to the login entry point.
    #[error("Session expired")]
    SessionExpired,

    /// Validation or business-rule rejection reported by the API, verbatim
    #[error("{}", join_messages(.0))]
    Application(Vec<GraphQLError>),

    /// The response arrived but could not be read into the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Input rejected locally before any request was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The issued token could not be persisted
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ClientError {
    pub fn application(message: impl Into<String>, code: Option<&str>) -> Self {
        let error = GraphQLError::new(message);
        ClientError::Application(vec![match code {
            Some(code) => error.with_code(code),
            None => error,
        }])
    }

    /// Transport failures may succeed on a later attempt; nothing else will
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }

    /// Whether the error text may be shown to the user as-is
    pub fn is_displayable(&self) -> bool {
        !matches!(self, ClientError::SessionExpired)
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::SessionExpired => "SESSION_EXPIRED",
            ClientError::Application(_) => "APPLICATION_ERROR",
            ClientError::Decode(_) => "DECODE_ERROR",
            ClientError::InvalidInput(_) => "INVALID_INPUT",
            ClientError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

fn join_messages(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "Unknown API error".to_string();
    }
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
