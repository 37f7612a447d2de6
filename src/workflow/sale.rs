use std::collections::BTreeSet;
use tracing::warn;

use super::{Step, WorkflowError, WorkflowReport};
use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::models::{MovementInput, NewSale, SaleStatus, Warehouse};
use crate::services::{CatalogService, InventoryService, SaleHeader, SalesService};
use crate::types::Id;

/// Invoice a pending sale, mark it completed, then take each line's goods out
/// of its warehouse. `fallback_warehouse` covers lines that record none.
pub async fn complete_sale(
    gateway: &Gateway,
    sale_id: Id,
    fallback_warehouse: Option<Id>,
) -> Result<WorkflowReport, WorkflowError> {
    let sales = SalesService::new(gateway.clone());
    let inventory = InventoryService::new(gateway.clone());

    let sale = sales.get(sale_id).await?.ok_or(WorkflowError::NotFound { kind: "sale", id: sale_id })?;
    if let Some(status) = sale.estado.filter(|s| *s != SaleStatus::Pendiente) {
        return Err(WorkflowError::NotPending {
            kind: "sale",
            id: sale_id,
            status: status.to_string(),
        });
    }
    if sale.detalles.is_empty() {
        return Err(WorkflowError::NoLineItems { kind: "sale" });
    }

    let notes = format!("Venta #{} completada", sale_id);
    let mut movements = Vec::with_capacity(sale.detalles.len());
    for line in &sale.detalles {
        let product_id = line.producto_id.ok_or(WorkflowError::MissingProduct { line_id: line.id })?;
        let warehouse_id = line
            .almacen_id
            .or(fallback_warehouse)
            .ok_or(WorkflowError::MissingWarehouse { line_id: line.id })?;
        let input = MovementInput::outbound(product_id, line.cantidad, warehouse_id).with_notes(&notes);
        input.validate()?;
        movements.push(input);
    }

    let warehouses: BTreeSet<Id> = movements.iter().filter_map(|m| m.almacen_origen_id).collect();
    let catalog = CatalogService::new(gateway.clone());
    for id in warehouses {
        if catalog.get::<Warehouse>(id).await?.is_none() {
            return Err(WorkflowError::UnknownWarehouse(id));
        }
    }

    let amount = sale.amount_due();
    let mut steps = vec![Step::CreateInvoice { sale_id, amount }, Step::CompleteSale { sale_id }];
    steps.extend(movements.iter().map(|input| Step::RegisterMovement {
        movement_type: input.tipo_movimiento,
        product_id: input.producto_id,
        quantity: input.cantidad,
        warehouse_id: input.almacen_origen_id.unwrap_or_default(),
    }));
    let mut report = WorkflowReport::plan("complete_sale", Some(sale_id), steps);

    if !report
        .run(0, async { sales.create_invoice(sale_id, amount).await.map(|i| i.id) })
        .await
    {
        return Ok(report);
    }
    if !report
        .run(1, async {
            sales
                .update(sale_id, Some(SaleStatus::Completada), None)
                .await
                .map(|s| s.id)
        })
        .await
    {
        warn!(sale = sale_id, "Invoice issued but the sale is still pending");
        return Ok(report);
    }
    for (i, input) in movements.iter().enumerate() {
        if !report.run(i + 2, async { inventory.register(input).await.map(|m| m.id) }).await {
            warn!(
                sale = sale_id,
                "Sale left completed with {} of {} lines dispatched",
                i,
                movements.len()
            );
            break;
        }
    }

    Ok(report)
}

/// Open a sale as `PENDIENTE` with the total of its valid lines, then add
/// those lines one by one. Lines without a product or quantity are dropped.
pub async fn create_sale(gateway: &Gateway, sale: &NewSale) -> Result<WorkflowReport, WorkflowError> {
    if sale.cliente_id <= 0 {
        return Err(ClientError::InvalidInput("a client is required".into()).into());
    }
    if sale.vendedor_id.trim().is_empty() {
        return Err(ClientError::InvalidInput("a seller is required".into()).into());
    }
    let lines = sale.lines.iter().filter(|l| l.is_valid()).collect::<Vec<_>>();
    if lines.is_empty() {
        return Err(WorkflowError::NoLineItems { kind: "sale" });
    }
    if lines.iter().any(|l| l.precio_unitario.is_sign_negative()) {
        return Err(ClientError::InvalidInput("unit prices cannot be negative".into()).into());
    }

    let sales = SalesService::new(gateway.clone());
    let header = SaleHeader {
        cliente_id: sale.cliente_id,
        vendedor_id: sale.vendedor_id.clone(),
        total: sale.total(),
        estado: SaleStatus::Pendiente,
        metodo_pago: sale.metodo_pago,
    };

    let mut steps = vec![Step::CreateSale {
        cliente_id: header.cliente_id,
        total: header.total,
    }];
    steps.extend(lines.iter().map(|l| Step::AddSaleLine {
        product_id: l.producto_id.unwrap_or_default(),
        quantity: l.cantidad,
        unit_price: l.precio_unitario,
    }));
    let mut report = WorkflowReport::plan("create_sale", None, steps);

    if !report.run(0, async { sales.create(&header).await.map(|s| s.id) }).await {
        return Ok(report);
    }
    let sale_id = report.steps[0].record_id.unwrap_or_default();
    report.subject_id = Some(sale_id);

    for (i, line) in lines.iter().enumerate() {
        let product_id = line.producto_id.unwrap_or_default();
        let added = report
            .run(i + 1, async {
                sales
                    .add_line(sale_id, product_id, line.cantidad, line.precio_unitario)
                    .await
                    .map(|l| l.id)
            })
            .await;
        if !added {
            warn!(sale = sale_id, "Sale left with {} of {} lines", i, lines.len());
            break;
        }
    }

    Ok(report)
}
