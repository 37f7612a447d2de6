use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ClientError;
use crate::types::{id, Id};

/// Purchase lifecycle. The API spells these in lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Pendiente,
    Completada,
    Cancelada,
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PurchaseStatus::Pendiente => "pendiente",
            PurchaseStatus::Completada => "completada",
            PurchaseStatus::Cancelada => "cancelada",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: Id,
    #[serde(deserialize_with = "id::deserialize")]
    pub proveedor_id: Id,
    #[serde(default)]
    pub fecha_compra: Option<String>,
    pub total: Decimal,
    pub estado: PurchaseStatus,
    #[serde(default)]
    pub detalles: Vec<PurchaseLine>,
}

impl Purchase {
    pub fn is_pending(&self) -> bool {
        self.estado == PurchaseStatus::Pendiente
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLine {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: Id,
    #[serde(deserialize_with = "id::deserialize")]
    pub producto_id: Id,
    pub cantidad: i64,
    pub precio_unitario: Decimal,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseInput {
    pub proveedor_id: Id,
    pub detalles: Vec<PurchaseLineInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLineInput {
    pub producto_id: Id,
    pub cantidad: i64,
    pub precio_unitario: Decimal,
}

impl PurchaseInput {
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.proveedor_id <= 0 {
            return Err(ClientError::InvalidInput("a supplier is required".into()));
        }
        if self.detalles.is_empty() {
            return Err(ClientError::InvalidInput("a purchase needs at least one line".into()));
        }
        for (i, line) in self.detalles.iter().enumerate() {
            if line.producto_id <= 0 || line.cantidad <= 0 || line.precio_unitario < Decimal::ZERO {
                return Err(ClientError::InvalidInput(format!(
                    "line {}: product, positive quantity and non-negative price are required",
                    i + 1
                )));
            }
        }
        Ok(())
    }

    pub fn total(&self) -> Decimal {
        self.detalles
            .iter()
            .map(|line| line.precio_unitario * Decimal::from(line.cantidad))
            .sum()
    }
}
