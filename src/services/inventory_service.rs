use serde_json::{json, Value};

use crate::error::ClientError;
use crate::gateway::{Gateway, Operation};
use crate::models::{Movement, MovementInput, Product};
use crate::types::Id;

pub const ALL_MOVEMENTS: Operation = Operation::query(
    "GetTodosMovimientos",
    "todosLosMovimientos",
    r#"query GetTodosMovimientos {
  todosLosMovimientos {
    id
    fecha
    producto { id nombre unidadMedida { id nombre abreviatura } }
    tipoMovimiento
    cantidad
    almacenOrigen { id nombre }
    almacenDestino { id nombre }
    observaciones
    estado
  }
}"#,
);

pub const PRODUCT_MOVEMENTS: Operation = Operation::query(
    "GetMovimientos",
    "movimientosInventario",
    r#"query GetMovimientos($productoId: ID) {
  movimientosInventario(productoId: $productoId) {
    id
    fecha
    tipoMovimiento
    cantidad
    estado
    observaciones
    producto { id }
    almacenOrigen { id }
    almacenDestino { id }
  }
}"#,
);

pub const MOVEMENT: Operation = Operation::query(
    "GetMovimiento",
    "movimientoInventario",
    r#"query GetMovimiento($id: ID!) {
  movimientoInventario(id: $id) {
    id
    fecha
    producto { id nombre }
    tipoMovimiento
    cantidad
    almacenOrigen { id nombre }
    almacenDestino { id nombre }
    observaciones
    estado
  }
}"#,
);

pub const REGISTER_MOVEMENT: Operation = Operation::mutation(
    "RegistrarMovimiento",
    "registrarMovimiento",
    r#"mutation RegistrarMovimiento($input: MovimientoInput!) {
  registrarMovimiento(input: $input) {
    id
    fecha
    producto { id nombre }
    tipoMovimiento
    cantidad
    almacenOrigen { id nombre }
    almacenDestino { id nombre }
    observaciones
    estado
  }
}"#,
);

pub const VOID_MOVEMENT: Operation = Operation::mutation(
    "AnularMovimiento",
    "anularMovimiento",
    r#"mutation AnularMovimiento($id: ID!, $motivo: String!) {
  anularMovimiento(id: $id, motivo: $motivo)
}"#,
);

pub const PRODUCT_STOCK: Operation = Operation::query(
    "GetProductoConStock",
    "producto",
    r#"query GetProductoConStock($id: ID!) {
  producto(id: $id) {
    id
    nombre
    stocks {
      id
      cantidad
      estado
      almacen { id nombre ubicacion }
    }
  }
}"#,
);

pub struct InventoryService {
    gateway: Gateway,
}

impl InventoryService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list_all(&self) -> Result<Vec<Movement>, ClientError> {
        let movements: Option<Vec<Movement>> = self.gateway.execute(&ALL_MOVEMENTS, json!({})).await?;
        Ok(movements.unwrap_or_default())
    }

    /// Movements of one product, or all when `product_id` is `None`
    pub async fn list(&self, product_id: Option<Id>) -> Result<Vec<Movement>, ClientError> {
        let vars = match product_id {
            Some(id) => json!({ "productoId": id }),
            None => json!({}),
        };
        let movements: Option<Vec<Movement>> = self.gateway.execute(&PRODUCT_MOVEMENTS, vars).await?;
        Ok(movements.unwrap_or_default())
    }

    pub async fn get(&self, id: Id) -> Result<Option<Movement>, ClientError> {
        self.gateway.execute(&MOVEMENT, json!({ "id": id })).await
    }

    /// Validate locally, then register. Nothing is sent for invalid input.
    pub async fn register(&self, input: &MovementInput) -> Result<Movement, ClientError> {
        input.validate()?;
        let movement: Movement = self
            .gateway
            .execute(&REGISTER_MOVEMENT, json!({ "input": input }))
            .await?;
        tracing::info!(
            "Registered {} movement {} ({} of product {})",
            movement.tipo_movimiento,
            movement.id,
            movement.cantidad,
            input.producto_id
        );
        Ok(movement)
    }

    /// Void a movement; a reason is mandatory
    pub async fn void(&self, id: Id, reason: &str) -> Result<bool, ClientError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ClientError::InvalidInput("a reason is required to void a movement".into()));
        }
        let result: Value = self
            .gateway
            .execute(&VOID_MOVEMENT, json!({ "id": id, "motivo": reason }))
            .await?;
        Ok(!matches!(result, Value::Bool(false) | Value::Null))
    }

    pub async fn product_stock(&self, product_id: Id) -> Result<Option<Product>, ClientError> {
        self.gateway.execute(&PRODUCT_STOCK, json!({ "id": product_id })).await
    }
}
