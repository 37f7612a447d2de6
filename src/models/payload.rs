use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// `error { message code }` carried inside a mutation payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl From<PayloadError> for ClientError {
    fn from(err: PayloadError) -> Self {
        ClientError::application(err.message, err.code.as_deref())
    }
}

/// `{ <entity>, error }` envelope used by the supplier and purchase operations
#[derive(Debug, Clone, Deserialize)]
pub struct Payload<T> {
    #[serde(alias = "proveedor", alias = "compra")]
    item: Option<T>,
    error: Option<PayloadError>,
}

impl<T> Payload<T> {
    /// The entity, or the payload's own error surfaced verbatim.
    /// `Ok(None)` means the lookup found nothing.
    pub fn into_result(self) -> Result<Option<T>, ClientError> {
        match (self.item, self.error) {
            (_, Some(error)) => Err(error.into()),
            (item, None) => Ok(item),
        }
    }

    /// Like [`Payload::into_result`] but a missing entity is an error
    pub fn into_item(self, what: &str) -> Result<T, ClientError> {
        self.into_result()?
            .ok_or_else(|| ClientError::Decode(format!("{} payload carried neither entity nor error", what)))
    }
}

/// `{ success, error }` envelope returned by enveloped deletes
#[derive(Debug, Clone, Deserialize)]
pub struct DeletePayload {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<PayloadError>,
}

impl DeletePayload {
    pub fn into_result(self) -> Result<bool, ClientError> {
        match self.error {
            Some(error) => Err(error.into()),
            None => Ok(self.success),
        }
    }
}
