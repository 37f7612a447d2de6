use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;

/// A fully built GraphQL POST, ready for the wire
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: Url,
    pub headers: Vec<(&'static str, String)>,
    pub body: Value,
}

impl OutboundRequest {
    /// First value of a header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn operation_name(&self) -> Option<&str> {
        self.body.get("operationName").and_then(Value::as_str)
    }
}

/// Whatever came back, before any GraphQL interpretation
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, TransportError>;
}

/// `reqwest`-backed transport; one pooled client per gateway
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, TransportError> {
        let mut req = self.client.post(request.url.clone()).json(&request.body);
        for (name, value) in &request.headers {
            req = req.header(*name, value.as_str());
        }

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;

        Ok(RawResponse { status, body })
    }
}
