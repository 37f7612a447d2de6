use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

use crate::error::ClientError;
use crate::gateway::{Gateway, Operation};
use crate::models::{Invoice, PaymentMethod, Sale, SaleLine, SaleStatus};
use crate::types::Id;

pub const SALES: Operation = Operation::query(
    "GetVentas",
    "ventas",
    r#"query GetVentas {
  ventas {
    id
    fecha
    total
    estado
    metodo_pago
    cliente { id nombre apellido email ci }
    vendedor_id
    detalles { id cantidad precio_unitario subtotal producto_id }
    created_at
    updated_at
    notas
  }
}"#,
);

pub const SALE: Operation = Operation::query(
    "GetVenta",
    "venta",
    r#"query GetVenta($id: Int!) {
  venta(id: $id) {
    id
    fecha
    total
    estado
    metodo_pago
    cliente { id nombre apellido email ci telefono direccion tipo_cliente }
    vendedor_id
    detalles { id cantidad precio_unitario subtotal producto_id almacen_id }
    created_at
    updated_at
    notas
  }
}"#,
);

pub const SALE_LINES: Operation = Operation::query(
    "GetDetallesVenta",
    "detallesPorVenta",
    r#"query GetDetallesVenta($ventaId: Int!) {
  detallesPorVenta(ventaId: $ventaId) {
    id
    cantidad
    precio_unitario
    subtotal
    notas
    producto_id
  }
}"#,
);

pub const CREATE_SALE: Operation = Operation::mutation(
    "CrearVenta",
    "crearVenta",
    r#"mutation CrearVenta($clienteId: Int!, $vendedorId: String!, $total: Float!, $estado: EstadoVenta!, $metodoPago: MetodoPago!) {
  crearVenta(clienteId: $clienteId, vendedorId: $vendedorId, total: $total, estado: $estado, metodoPago: $metodoPago) {
    id
    fecha
    total
    estado
    metodo_pago
    cliente { id nombre apellido }
    vendedor_id
  }
}"#,
);

pub const UPDATE_SALE: Operation = Operation::mutation(
    "ActualizarVenta",
    "actualizarVenta",
    r#"mutation ActualizarVenta($id: Int!, $estado: EstadoVenta, $metodoPago: MetodoPago) {
  actualizarVenta(id: $id, estado: $estado, metodoPago: $metodoPago) {
    id
    estado
    metodo_pago
  }
}"#,
);

pub const CREATE_SALE_LINE: Operation = Operation::mutation(
    "CrearDetalleVenta",
    "crearDetalleVenta",
    r#"mutation CrearDetalleVenta($ventaId: Int!, $productoId: Int!, $cantidad: Int!, $precioUnitario: Float!) {
  crearDetalleVenta(ventaId: $ventaId, productoId: $productoId, cantidad: $cantidad, precioUnitario: $precioUnitario) {
    id
    cantidad
    precio_unitario
    subtotal
  }
}"#,
);

pub const UPDATE_SALE_LINE: Operation = Operation::mutation(
    "ActualizarDetalleVenta",
    "actualizarDetalleVenta",
    r#"mutation ActualizarDetalleVenta($id: Int!, $cantidad: Int, $precioUnitario: Float) {
  actualizarDetalleVenta(id: $id, cantidad: $cantidad, precioUnitario: $precioUnitario) {
    id
    cantidad
    precio_unitario
    subtotal
  }
}"#,
);

pub const DELETE_SALE_LINE: Operation = Operation::mutation(
    "EliminarDetalleVenta",
    "eliminarDetalleVenta",
    "mutation EliminarDetalleVenta($id: Int!) {\n  eliminarDetalleVenta(id: $id)\n}",
);

pub const CREATE_INVOICE: Operation = Operation::mutation(
    "CrearFactura",
    "crearFactura",
    r#"mutation CrearFactura($ventaId: Int!, $montoTotal: Float!) {
  crearFactura(ventaId: $ventaId, monto_total: $montoTotal) {
    id
    numero
    fecha
    monto_total
    venta { id }
  }
}"#,
);

pub const INVOICES: Operation = Operation::query(
    "GetFacturas",
    "facturas",
    r#"query GetFacturas {
  facturas {
    id
    numero
    fecha
    monto_total
    venta { id }
  }
}"#,
);

pub const INVOICE: Operation = Operation::query(
    "GetFactura",
    "factura",
    r#"query GetFactura($id: Int!) {
  factura(id: $id) {
    id
    numero
    fecha
    monto_total
    venta {
      id
      fecha
      total
      estado
      metodo_pago
      cliente { id nombre apellido ci email telefono direccion tipo_cliente }
      detalles { id cantidad precio_unitario subtotal producto_id }
    }
  }
}"#,
);

/// Header fields of a sale being opened
#[derive(Debug, Clone)]
pub struct SaleHeader {
    pub cliente_id: Id,
    pub vendedor_id: String,
    pub total: Decimal,
    pub estado: SaleStatus,
    pub metodo_pago: PaymentMethod,
}

pub struct SalesService {
    gateway: Gateway,
}

impl SalesService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Sale>, ClientError> {
        let sales: Option<Vec<Sale>> = self.gateway.execute(&SALES, json!({})).await?;
        Ok(sales.unwrap_or_default())
    }

    pub async fn get(&self, id: Id) -> Result<Option<Sale>, ClientError> {
        self.gateway.execute(&SALE, json!({ "id": id })).await
    }

    pub async fn lines(&self, sale_id: Id) -> Result<Vec<SaleLine>, ClientError> {
        let lines: Option<Vec<SaleLine>> = self.gateway.execute(&SALE_LINES, json!({ "ventaId": sale_id })).await?;
        Ok(lines.unwrap_or_default())
    }

    pub async fn create(&self, header: &SaleHeader) -> Result<Sale, ClientError> {
        self.gateway
            .execute(
                &CREATE_SALE,
                json!({
                    "clienteId": header.cliente_id,
                    "vendedorId": header.vendedor_id,
                    "total": header.total,
                    "estado": header.estado,
                    "metodoPago": header.metodo_pago,
                }),
            )
            .await
    }

    /// Change status and/or payment method; absent values are left alone
    pub async fn update(
        &self,
        id: Id,
        status: Option<SaleStatus>,
        payment: Option<PaymentMethod>,
    ) -> Result<Sale, ClientError> {
        let mut vars = Map::new();
        vars.insert("id".into(), json!(id));
        if let Some(status) = status {
            vars.insert("estado".into(), json!(status));
        }
        if let Some(payment) = payment {
            vars.insert("metodoPago".into(), json!(payment));
        }
        self.gateway.execute(&UPDATE_SALE, Value::Object(vars)).await
    }

    pub async fn add_line(
        &self,
        sale_id: Id,
        product_id: Id,
        quantity: i64,
        unit_price: Decimal,
    ) -> Result<SaleLine, ClientError> {
        self.gateway
            .execute(
                &CREATE_SALE_LINE,
                json!({
                    "ventaId": sale_id,
                    "productoId": product_id,
                    "cantidad": quantity,
                    "precioUnitario": unit_price,
                }),
            )
            .await
    }

    pub async fn update_line(
        &self,
        line_id: Id,
        quantity: Option<i64>,
        unit_price: Option<Decimal>,
    ) -> Result<SaleLine, ClientError> {
        let mut vars = Map::new();
        vars.insert("id".into(), json!(line_id));
        if let Some(quantity) = quantity {
            vars.insert("cantidad".into(), json!(quantity));
        }
        if let Some(price) = unit_price {
            vars.insert("precioUnitario".into(), json!(price));
        }
        self.gateway.execute(&UPDATE_SALE_LINE, Value::Object(vars)).await
    }

    pub async fn delete_line(&self, line_id: Id) -> Result<bool, ClientError> {
        let result: Value = self.gateway.execute(&DELETE_SALE_LINE, json!({ "id": line_id })).await?;
        Ok(!matches!(result, Value::Bool(false) | Value::Null))
    }

    pub async fn create_invoice(&self, sale_id: Id, amount: Decimal) -> Result<Invoice, ClientError> {
        self.gateway
            .execute(&CREATE_INVOICE, json!({ "ventaId": sale_id, "montoTotal": amount }))
            .await
    }

    pub async fn invoices(&self) -> Result<Vec<Invoice>, ClientError> {
        let invoices: Option<Vec<Invoice>> = self.gateway.execute(&INVOICES, json!({})).await?;
        Ok(invoices.unwrap_or_default())
    }

    pub async fn invoice(&self, id: Id) -> Result<Option<Invoice>, ClientError> {
        self.gateway.execute(&INVOICE, json!({ "id": id })).await
    }

    /// The API has no lookup by sale, so the invoice list is filtered here
    pub async fn invoice_for_sale(&self, sale_id: Id) -> Result<Option<Invoice>, ClientError> {
        Ok(self
            .invoices()
            .await?
            .into_iter()
            .find(|invoice| invoice.venta.as_ref().map(|v| v.id) == Some(sale_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gateway_as, ScriptedTransport};
    use crate::types::Role;

    #[tokio::test]
    async fn test_update_sends_only_given_fields() {
        let transport = ScriptedTransport::new();
        transport.data(
            "ActualizarVenta",
            json!({ "actualizarVenta": { "id": 3, "estado": "CANCELADA", "metodo_pago": "EFECTIVO" } }),
        );
        let sales = SalesService::new(gateway_as(Role::Vendedor, transport.clone()));

        let sale = sales.update(3, Some(SaleStatus::Cancelada), None).await.unwrap();
        assert_eq!(sale.estado, Some(SaleStatus::Cancelada));
        assert_eq!(
            transport.variables("ActualizarVenta")[0],
            json!({ "id": 3, "estado": "CANCELADA" })
        );
    }

    #[tokio::test]
    async fn test_invoice_for_sale_filters_list() {
        let transport = ScriptedTransport::new();
        transport.data(
            "GetFacturas",
            json!({ "facturas": [
                { "id": 1, "numero": "F-0001", "monto_total": 10.0, "venta": { "id": 7 } },
                { "id": 2, "numero": "F-0002", "monto_total": 25.0, "venta": { "id": 9 } }
            ] }),
        );
        let sales = SalesService::new(gateway_as(Role::Vendedor, transport));

        let invoice = sales.invoice_for_sale(9).await.unwrap().unwrap();
        assert_eq!(invoice.numero.as_deref(), Some("F-0002"));
    }
}
