pub mod catalog;
pub mod inventory;
pub mod payload;
pub mod purchase;
pub mod sale;
pub mod user;

use serde::{Deserialize, Serialize};

use crate::types::{id, Id};

pub use catalog::{
    Category, CategoryInput, Client, ClientInput, Product, ProductInput, Stock, Supplier, SupplierInput,
    UnitInput, UnitOfMeasure, Warehouse, WarehouseInput,
};
pub use inventory::{Movement, MovementInput, MovementType};
pub use payload::{DeletePayload, Payload, PayloadError};
pub use purchase::{Purchase, PurchaseInput, PurchaseLine, PurchaseLineInput, PurchaseStatus};
pub use sale::{Invoice, NewSale, NewSaleLine, PaymentMethod, Sale, SaleLine, SaleStatus};
pub use user::{NewUser, User, UserUpdate};

/// `{ id nombre }` reference to another record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: Id,
    #[serde(default)]
    pub nombre: Option<String>,
}

impl EntityRef {
    /// Name when known, otherwise `#id`
    pub fn label(&self) -> String {
        match &self.nombre {
            Some(nombre) => nombre.clone(),
            None => format!("#{}", self.id),
        }
    }
}
