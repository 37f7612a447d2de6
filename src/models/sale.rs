use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Client;
use crate::types::{id, Id, ParseNameError};

/// Sale lifecycle. Unlike purchases, the API spells these in uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    Pendiente,
    Completada,
    Cancelada,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Pendiente => "PENDIENTE",
            SaleStatus::Completada => "COMPLETADA",
            SaleStatus::Cancelada => "CANCELADA",
        }
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaleStatus {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDIENTE" => Ok(SaleStatus::Pendiente),
            "COMPLETADA" => Ok(SaleStatus::Completada),
            "CANCELADA" => Ok(SaleStatus::Cancelada),
            _ => Err(ParseNameError {
                kind: "sale status",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Efectivo,
    Tarjeta,
    Transferencia,
}

impl FromStr for PaymentMethod {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EFECTIVO" => Ok(PaymentMethod::Efectivo),
            "TARJETA" => Ok(PaymentMethod::Tarjeta),
            "TRANSFERENCIA" => Ok(PaymentMethod::Transferencia),
            _ => Err(ParseNameError {
                kind: "payment method",
                value: s.to_string(),
            }),
        }
    }
}

/// A sale. Mutation results carry only some fields, so most are optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: Id,
    #[serde(default)]
    pub fecha: Option<String>,
    #[serde(default)]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub estado: Option<SaleStatus>,
    #[serde(default)]
    pub metodo_pago: Option<PaymentMethod>,
    #[serde(default)]
    pub cliente: Option<Client>,
    #[serde(default)]
    pub vendedor_id: Option<String>,
    #[serde(default)]
    pub detalles: Vec<SaleLine>,
    #[serde(default)]
    pub notas: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Sale {
    /// Amount to invoice: the recorded total, or the sum of line subtotals
    pub fn amount_due(&self) -> Decimal {
        self.total
            .unwrap_or_else(|| self.detalles.iter().map(SaleLine::amount).sum())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: Id,
    pub cantidad: i64,
    pub precio_unitario: Decimal,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
    #[serde(default, deserialize_with = "id::option::deserialize")]
    pub producto_id: Option<Id>,
    /// Warehouse the goods leave from, when the line records one
    #[serde(default, deserialize_with = "id::option::deserialize")]
    pub almacen_id: Option<Id>,
    #[serde(default)]
    pub notas: Option<String>,
}

impl SaleLine {
    pub fn amount(&self) -> Decimal {
        self.subtotal
            .unwrap_or_else(|| self.precio_unitario * Decimal::from(self.cantidad))
    }
}

/// Sale as entered before it exists on the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
    pub cliente_id: Id,
    pub vendedor_id: String,
    pub metodo_pago: PaymentMethod,
    pub lines: Vec<NewSaleLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSaleLine {
    #[serde(default)]
    pub producto_id: Option<Id>,
    pub cantidad: i64,
    pub precio_unitario: Decimal,
}

impl NewSaleLine {
    /// Lines without a product or with no quantity are not sent
    pub fn is_valid(&self) -> bool {
        self.producto_id.is_some() && self.cantidad > 0
    }

    pub fn amount(&self) -> Decimal {
        self.precio_unitario * Decimal::from(self.cantidad)
    }
}

impl NewSale {
    /// Total over the lines that will actually be created
    pub fn total(&self) -> Decimal {
        self.lines.iter().filter(|l| l.is_valid()).map(NewSaleLine::amount).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: Id,
    #[serde(default)]
    pub numero: Option<String>,
    #[serde(default)]
    pub fecha: Option<String>,
    pub monto_total: Decimal,
    #[serde(default)]
    pub venta: Option<Sale>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sale_from_api() {
        let sale: Sale = serde_json::from_value(json!({
            "id": 9,
            "total": 80.0,
            "estado": "PENDIENTE",
            "metodo_pago": "EFECTIVO",
            "cliente": { "id": 1, "nombre": "Luis", "apellido": "Rojas" },
            "vendedor_id": "u-1",
            "detalles": [
                { "id": 1, "cantidad": 2, "precio_unitario": 25.0, "subtotal": 50.0, "producto_id": 3 },
                { "id": 2, "cantidad": 1, "precio_unitario": 30.0, "subtotal": 30.0, "producto_id": "4", "almacen_id": 2 }
            ]
        }))
        .unwrap();

        assert_eq!(sale.estado, Some(SaleStatus::Pendiente));
        assert_eq!(sale.cliente.as_ref().unwrap().full_name(), "Luis Rojas");
        assert_eq!(sale.detalles[1].producto_id, Some(4));
        assert_eq!(sale.detalles[1].almacen_id, Some(2));
        assert_eq!(sale.amount_due(), Decimal::from(80));
    }

    #[test]
    fn test_amount_due_falls_back_to_lines() {
        let sale: Sale = serde_json::from_value(json!({
            "id": 1,
            "detalles": [{ "id": 1, "cantidad": 3, "precio_unitario": 2.5 }]
        }))
        .unwrap();
        assert_eq!(sale.amount_due(), Decimal::new(75, 1));
    }

    #[test]
    fn test_new_sale_total_ignores_skipped_lines() {
        let sale = NewSale {
            cliente_id: 1,
            vendedor_id: "u-1".into(),
            metodo_pago: PaymentMethod::Tarjeta,
            lines: vec![
                NewSaleLine { producto_id: Some(1), cantidad: 2, precio_unitario: Decimal::from(5) },
                NewSaleLine { producto_id: None, cantidad: 4, precio_unitario: Decimal::from(9) },
                NewSaleLine { producto_id: Some(2), cantidad: 0, precio_unitario: Decimal::from(9) },
            ],
        };
        assert_eq!(sale.total(), Decimal::from(10));
        assert_eq!("tarjeta".parse::<PaymentMethod>().unwrap(), PaymentMethod::Tarjeta);
    }
}
