use serde_json::json;

use crate::error::ClientError;
use crate::gateway::{Gateway, Operation};
use crate::models::{DeletePayload, Payload, Purchase, PurchaseInput, PurchaseStatus};
use crate::types::Id;

macro_rules! purchase_payload {
    () => {
        r#"
    compra {
      id
      proveedorId
      fechaCompra
      total
      estado
      detalles { id productoId cantidad precioUnitario subtotal }
    }
    error { message code }"#
    };
}

pub const PURCHASES: Operation = Operation::query(
    "GetCompras",
    "compras",
    r#"query GetCompras {
  compras {
    id
    proveedorId
    fechaCompra
    total
    estado
    detalles { id productoId cantidad precioUnitario subtotal }
  }
}"#,
);

pub const PURCHASE: Operation = Operation::query(
    "GetCompra",
    "compra",
    concat!("query GetCompra($id: Int!) {\n  compra(id: $id) {", purchase_payload!(), "\n  }\n}"),
);

pub const CREATE_PURCHASE: Operation = Operation::mutation(
    "CrearCompra",
    "crearCompra",
    concat!(
        "mutation CrearCompra($input: CompraInput!) {\n  crearCompra(input: $input) {",
        purchase_payload!(),
        "\n  }\n}"
    ),
);

pub const UPDATE_PURCHASE: Operation = Operation::mutation(
    "ActualizarCompra",
    "actualizarCompra",
    concat!(
        "mutation ActualizarCompra($id: Int!, $input: CompraUpdateInput!) {\n  actualizarCompra(id: $id, input: $input) {",
        purchase_payload!(),
        "\n  }\n}"
    ),
);

pub const DELETE_PURCHASE: Operation = Operation::mutation(
    "EliminarCompra",
    "eliminarCompra",
    r#"mutation EliminarCompra($id: Int!) {
  eliminarCompra(id: $id) {
    success
    error { message code }
  }
}"#,
);

pub struct PurchaseService {
    gateway: Gateway,
}

impl PurchaseService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Purchase>, ClientError> {
        let purchases: Option<Vec<Purchase>> = self.gateway.execute(&PURCHASES, json!({})).await?;
        Ok(purchases.unwrap_or_default())
    }

    pub async fn get(&self, id: Id) -> Result<Option<Purchase>, ClientError> {
        let payload: Option<Payload<Purchase>> = self.gateway.execute(&PURCHASE, json!({ "id": id })).await?;
        match payload {
            Some(payload) => payload.into_result(),
            None => Ok(None),
        }
    }

    pub async fn create(&self, input: &PurchaseInput) -> Result<Purchase, ClientError> {
        input.validate()?;
        let payload: Payload<Purchase> = self
            .gateway
            .execute(&CREATE_PURCHASE, json!({ "input": input }))
            .await?;
        let purchase = payload.into_item("compra")?;
        tracing::info!("Created purchase {} for supplier {}", purchase.id, purchase.proveedor_id);
        Ok(purchase)
    }

    pub async fn set_status(&self, id: Id, status: PurchaseStatus) -> Result<Purchase, ClientError> {
        let payload: Payload<Purchase> = self
            .gateway
            .execute(&UPDATE_PURCHASE, json!({ "id": id, "input": { "estado": status } }))
            .await?;
        payload.into_item("compra")
    }

    pub async fn delete(&self, id: Id) -> Result<bool, ClientError> {
        let payload: DeletePayload = self.gateway.execute(&DELETE_PURCHASE, json!({ "id": id })).await?;
        payload.into_result()
    }
}
