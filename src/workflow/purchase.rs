use tracing::warn;

use super::{Step, WorkflowError, WorkflowReport};
use crate::gateway::Gateway;
use crate::models::{MovementInput, PurchaseStatus, Warehouse};
use crate::services::{CatalogService, InventoryService, PurchaseService};
use crate::types::Id;

/// Mark a pending purchase completed, then receive each line into
/// `destination` with one inbound movement per line.
pub async fn complete_purchase(
    gateway: &Gateway,
    purchase_id: Id,
    destination: Id,
) -> Result<WorkflowReport, WorkflowError> {
    let purchases = PurchaseService::new(gateway.clone());
    let inventory = InventoryService::new(gateway.clone());

    let purchase = purchases.get(purchase_id).await?.ok_or(WorkflowError::NotFound {
        kind: "purchase",
        id: purchase_id,
    })?;
    if !purchase.is_pending() {
        return Err(WorkflowError::NotPending {
            kind: "purchase",
            id: purchase_id,
            status: purchase.estado.to_string(),
        });
    }
    if purchase.detalles.is_empty() {
        return Err(WorkflowError::NoLineItems { kind: "purchase" });
    }
    if CatalogService::new(gateway.clone())
        .get::<Warehouse>(destination)
        .await?
        .is_none()
    {
        return Err(WorkflowError::UnknownWarehouse(destination));
    }

    let notes = format!("Compra #{} completada", purchase_id);
    let movements = purchase
        .detalles
        .iter()
        .map(|line| MovementInput::inbound(line.producto_id, line.cantidad, destination).with_notes(&notes))
        .collect::<Vec<_>>();
    for input in &movements {
        input.validate()?;
    }

    let mut steps = vec![Step::CompletePurchase { purchase_id }];
    steps.extend(movements.iter().map(|input| Step::RegisterMovement {
        movement_type: input.tipo_movimiento,
        product_id: input.producto_id,
        quantity: input.cantidad,
        warehouse_id: destination,
    }));
    let mut report = WorkflowReport::plan("complete_purchase", Some(purchase_id), steps);

    let completed = report
        .run(0, async {
            purchases
                .set_status(purchase_id, PurchaseStatus::Completada)
                .await
                .map(|p| p.id)
        })
        .await;
    if completed {
        for (i, input) in movements.iter().enumerate() {
            if !report.run(i + 1, async { inventory.register(input).await.map(|m| m.id) }).await {
                warn!(
                    purchase = purchase_id,
                    "Purchase left completed with {} of {} lines received",
                    i,
                    movements.len()
                );
                break;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gateway_as, ScriptedTransport};
    use crate::types::Role;
    use crate::workflow::{StepOutcome, WorkflowStatus};
    use serde_json::{json, Value};

    fn purchase(estado: &str) -> Value {
        json!({ "compra": { "compra": {
            "id": 12,
            "proveedorId": 3,
            "total": 150,
            "estado": estado,
            "detalles": [
                { "id": 1, "productoId": 7, "cantidad": 10, "precioUnitario": 5 },
                { "id": 2, "productoId": 8, "cantidad": 4, "precioUnitario": 10 },
                { "id": 3, "productoId": 9, "cantidad": 2, "precioUnitario": 30 }
            ]
        }, "error": null } })
    }

    fn movement(id: i64) -> Value {
        json!({ "registrarMovimiento": { "id": id, "tipoMovimiento": "ENTRADA", "cantidad": 1 } })
    }

    #[tokio::test]
    async fn test_second_movement_failure_leaves_purchase_completed() {
        let transport = ScriptedTransport::new();
        transport.data("GetCompra", purchase("pendiente"));
        transport.data("GetAlmacen", json!({ "almacen": { "id": 2, "nombre": "Central" } }));
        transport.data(
            "ActualizarCompra",
            json!({ "actualizarCompra": { "compra": {
                "id": 12, "proveedorId": 3, "total": 150, "estado": "completada"
            }, "error": null } }),
        );
        transport.data("RegistrarMovimiento", movement(100));
        transport.errors("RegistrarMovimiento", "Producto inactivo", None);

        let gateway = gateway_as(Role::Almacenista, transport.clone());
        let report = complete_purchase(&gateway, 12, 2).await.unwrap();

        assert_eq!(report.status(), WorkflowStatus::Partial);
        assert_eq!(report.movements_registered(), 1);
        assert_eq!(report.steps[0].outcome, StepOutcome::Succeeded);
        assert_eq!(report.steps[2].outcome, StepOutcome::Failed("Producto inactivo".into()));
        assert_eq!(report.steps[3].outcome, StepOutcome::Skipped);
        assert_eq!(transport.calls("RegistrarMovimiento"), 2);
        assert_eq!(transport.calls("ActualizarCompra"), 1);

        let first = &transport.variables("RegistrarMovimiento")[0]["input"];
        assert_eq!(first["productoId"], 7);
        assert_eq!(first["almacenDestinoId"], 2);
        assert_eq!(first["observaciones"], "Compra #12 completada");
    }

    #[tokio::test]
    async fn test_completed_purchase_is_rejected_before_any_mutation() {
        let transport = ScriptedTransport::new();
        transport.data("GetCompra", purchase("completada"));

        let gateway = gateway_as(Role::Almacenista, transport.clone());
        let err = complete_purchase(&gateway, 12, 2).await.unwrap_err();

        assert!(matches!(err, WorkflowError::NotPending { id: 12, .. }));
        assert_eq!(transport.sequence(), vec!["GetCompra"]);
    }

    #[tokio::test]
    async fn test_unknown_destination_is_rejected() {
        let transport = ScriptedTransport::new();
        transport.data("GetCompra", purchase("pendiente"));
        transport.data("GetAlmacen", json!({ "almacen": null }));

        let gateway = gateway_as(Role::Almacenista, transport.clone());
        let err = complete_purchase(&gateway, 12, 99).await.unwrap_err();

        assert!(matches!(err, WorkflowError::UnknownWarehouse(99)));
        assert_eq!(transport.calls("ActualizarCompra"), 0);
    }
}
