//! Catalog records: products, categories, units, warehouses, suppliers, clients.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::EntityRef;
use crate::types::{id, Id};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: Id,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub precio: Option<Decimal>,
    #[serde(default)]
    pub url_imagen: Option<String>,
    #[serde(default)]
    pub categoria: Option<EntityRef>,
    #[serde(default)]
    pub unidad_medida: Option<UnitOfMeasure>,
    #[serde(default)]
    pub stocks: Vec<Stock>,
}

impl Product {
    /// Sum of stock across all warehouses
    pub fn total_stock(&self) -> Decimal {
        self.stocks.iter().map(|s| s.cantidad).sum()
    }
}

/// Stock of one product in one warehouse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: Id,
    pub cantidad: Decimal,
    #[serde(default)]
    pub estado: Option<String>,
    #[serde(default)]
    pub almacen: Option<EntityRef>,
    #[serde(default)]
    pub producto: Option<EntityRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub nombre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    pub categoria_id: Id,
    pub unidad_medida_id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_imagen: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: Id,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub productos: Vec<EntityRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInput {
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitOfMeasure {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: Id,
    pub nombre: String,
    #[serde(default)]
    pub abreviatura: Option<String>,
    #[serde(default)]
    pub productos: Vec<EntityRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitInput {
    pub nombre: String,
    pub abreviatura: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: Id,
    pub nombre: String,
    #[serde(default)]
    pub ubicacion: Option<String>,
    #[serde(default)]
    pub stocks: Vec<Stock>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseInput {
    pub nombre: String,
    pub ubicacion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: Id,
    pub nombre: String,
    #[serde(default)]
    pub nit: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// The NIT is fixed at creation; updates drop it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierInput {
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Customer record. Field names follow the API's snake_case spelling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: Id,
    pub nombre: String,
    #[serde(default)]
    pub apellido: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub ci: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub tipo_cliente: Option<String>,
    #[serde(default)]
    pub fecha_registro: Option<String>,
}

impl Client {
    pub fn full_name(&self) -> String {
        match &self.apellido {
            Some(apellido) if !apellido.is_empty() => format!("{} {}", self.nombre, apellido),
            _ => self.nombre.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInput {
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apellido: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(default = "default_client_type")]
    pub tipo_cliente: String,
}

fn default_client_type() -> String {
    "PARTICULAR".to_string()
}
