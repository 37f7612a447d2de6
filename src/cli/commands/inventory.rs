use clap::Subcommand;
use rust_decimal::Decimal;
use serde_json::json;

use crate::auth::Requirement;
use crate::cli::utils::*;
use crate::cli::{Console, OutputFormat};
use crate::models::{EntityRef, MovementInput, MovementType};
use crate::services::InventoryService;
use crate::types::{Action, Id, Resource};

#[derive(Subcommand)]
pub enum InventoryCommands {
    #[command(about = "List movements, optionally for one product")]
    List {
        #[arg(long, help = "Only movements of this product")]
        product: Option<Id>,
    },

    #[command(about = "Show one movement")]
    Show {
        #[arg(help = "Movement ID")]
        id: Id,
    },

    #[command(about = "Register a movement")]
    Register {
        #[arg(long = "type", help = "ENTRADA, SALIDA, TRASLADO, AJUSTE or DEVOLUCION")]
        movement_type: MovementType,
        #[arg(long, help = "Product ID")]
        product: Id,
        #[arg(long, help = "Quantity")]
        quantity: Decimal,
        #[arg(long, help = "Source warehouse ID")]
        from: Option<Id>,
        #[arg(long, help = "Destination warehouse ID")]
        to: Option<Id>,
        #[arg(long, help = "Notes")]
        notes: Option<String>,
    },

    #[command(about = "Void a movement")]
    Void {
        #[arg(help = "Movement ID")]
        id: Id,
        #[arg(long, help = "Reason for voiding (required)")]
        reason: String,
    },

    #[command(about = "Show a product's stock per warehouse")]
    Stock {
        #[arg(help = "Product ID")]
        product: Id,
    },
}

pub async fn handle(cmd: InventoryCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let console = Console::open()?;
    let inventory = InventoryService::new(console.gateway().clone());
    let view = Requirement::permission(Resource::Inventario, Action::View);

    match cmd {
        InventoryCommands::List { product } => {
            console.authorize(view).await?;
            let movements = match product {
                Some(_) => inventory.list(product).await?,
                None => inventory.list_all().await?,
            };
            output_collection(
                &output_format,
                "movements",
                &movements,
                &format!("{:<6} {:<11} {:<20} {:>10} {:<12} {:<12} {}", "ID", "TYPE", "PRODUCT", "QTY", "FROM", "TO", "STATUS"),
                |m| {
                    format!(
                        "{:<6} {:<11} {:<20} {:>10} {:<12} {:<12} {}",
                        m.id,
                        m.tipo_movimiento.as_str(),
                        label(&m.producto),
                        m.cantidad,
                        label(&m.almacen_origen),
                        label(&m.almacen_destino),
                        m.estado.as_deref().unwrap_or("-")
                    )
                },
            )
        }
        InventoryCommands::Show { id } => {
            console.authorize(view).await?;
            let movement = inventory.get(id).await?;
            output_record(&output_format, "movement", movement.as_ref())
        }
        InventoryCommands::Register {
            movement_type,
            product,
            quantity,
            from,
            to,
            notes,
        } => {
            console
                .authorize(Requirement::permission(Resource::Inventario, Action::Create))
                .await?;
            let input = MovementInput {
                producto_id: product,
                tipo_movimiento: movement_type,
                cantidad: quantity,
                almacen_origen_id: from,
                almacen_destino_id: to,
                observaciones: notes.filter(|n| !n.trim().is_empty()),
            };
            let movement = inventory.register(&input).await?;
            output_success(
                &output_format,
                &format!("Registered {} movement {}", movement.tipo_movimiento, movement.id),
                Some(json!({ "movement": movement })),
            )
        }
        InventoryCommands::Void { id, reason } => {
            console
                .authorize(Requirement::permission(Resource::Inventario, Action::Edit))
                .await?;
            if !inventory.void(id, &reason).await? {
                anyhow::bail!("movement {} was not voided", id);
            }
            output_success(&output_format, &format!("Voided movement {}", id), Some(json!({ "id": id })))
        }
        InventoryCommands::Stock { product: product_id } => {
            console.authorize(view).await?;
            let Some(product) = inventory.product_stock(product_id).await? else {
                anyhow::bail!("product {} not found", product_id);
            };
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json!({ "product": product }))?),
                OutputFormat::Text => {
                    println!("{} (#{})", product.nombre.as_deref().unwrap_or("-"), product.id);
                    for stock in &product.stocks {
                        println!(
                            "  {:<20} {:>10} {}",
                            label(&stock.almacen),
                            stock.cantidad,
                            stock.estado.as_deref().unwrap_or("")
                        );
                    }
                    println!("  {:<20} {:>10}", "TOTAL", product.total_stock());
                }
            }
            Ok(())
        }
    }
}

fn label(reference: &Option<EntityRef>) -> String {
    reference.as_ref().map(EntityRef::label).unwrap_or_else(|| "-".to_string())
}
