use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::EntityRef;
use crate::error::ClientError;
use crate::types::{id, Id, ParseNameError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Goods received into a warehouse
    Entrada,
    /// Goods leaving a warehouse
    Salida,
    /// Move between two warehouses
    Traslado,
    /// Physical count correction
    Ajuste,
    /// Return to a supplier
    Devolucion,
}

impl MovementType {
    pub const ALL: [MovementType; 5] = [
        MovementType::Entrada,
        MovementType::Salida,
        MovementType::Traslado,
        MovementType::Ajuste,
        MovementType::Devolucion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Entrada => "ENTRADA",
            MovementType::Salida => "SALIDA",
            MovementType::Traslado => "TRASLADO",
            MovementType::Ajuste => "AJUSTE",
            MovementType::Devolucion => "DEVOLUCION",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        MovementType::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| ParseNameError {
                kind: "movement type",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: Id,
    #[serde(default)]
    pub fecha: Option<String>,
    #[serde(default)]
    pub producto: Option<EntityRef>,
    pub tipo_movimiento: MovementType,
    pub cantidad: Decimal,
    #[serde(default)]
    pub almacen_origen: Option<EntityRef>,
    #[serde(default)]
    pub almacen_destino: Option<EntityRef>,
    #[serde(default)]
    pub observaciones: Option<String>,
    #[serde(default)]
    pub estado: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementInput {
    pub producto_id: Id,
    pub tipo_movimiento: MovementType,
    pub cantidad: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub almacen_origen_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub almacen_destino_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
}

impl MovementInput {
    pub fn inbound(producto_id: Id, cantidad: impl Into<Decimal>, destino: Id) -> Self {
        Self {
            producto_id,
            tipo_movimiento: MovementType::Entrada,
            cantidad: cantidad.into(),
            almacen_origen_id: None,
            almacen_destino_id: Some(destino),
            observaciones: None,
        }
    }

    pub fn outbound(producto_id: Id, cantidad: impl Into<Decimal>, origen: Id) -> Self {
        Self {
            producto_id,
            tipo_movimiento: MovementType::Salida,
            cantidad: cantidad.into(),
            almacen_origen_id: Some(origen),
            almacen_destino_id: None,
            observaciones: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.observaciones = Some(notes.into());
        self
    }

    /// Checks the warehouse rules for the movement type before it is sent
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.producto_id <= 0 {
            return Err(invalid("a product is required"));
        }
        if self.cantidad <= Decimal::ZERO {
            return Err(invalid("quantity must be greater than 0"));
        }

        match self.tipo_movimiento {
            MovementType::Entrada if self.almacen_destino_id.is_none() => {
                Err(invalid("an inbound movement needs a destination warehouse"))
            }
            MovementType::Salida if self.almacen_origen_id.is_none() => {
                Err(invalid("an outbound movement needs a source warehouse"))
            }
            MovementType::Traslado => match (self.almacen_origen_id, self.almacen_destino_id) {
                (Some(origen), Some(destino)) if origen == destino => {
                    Err(invalid("source and destination warehouse must differ"))
                }
                (Some(_), Some(_)) => Ok(()),
                _ => Err(invalid("a transfer needs both source and destination warehouses")),
            },
            _ => Ok(()),
        }
    }
}

fn invalid(message: &str) -> ClientError {
    ClientError::InvalidInput(message.to_string())
}
