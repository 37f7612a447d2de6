use clap::Subcommand;
use serde_json::json;

use crate::auth::Requirement;
use crate::cli::utils::*;
use crate::cli::{Console, OutputFormat};
use crate::models::PurchaseInput;
use crate::services::PurchaseService;
use crate::types::{Action, Id, Resource};
use crate::workflow::complete_purchase;

#[derive(Subcommand)]
pub enum PurchaseCommands {
    #[command(about = "List purchases")]
    List,

    #[command(about = "Show one purchase with its lines")]
    Show {
        #[arg(help = "Purchase ID")]
        id: Id,
    },

    #[command(about = "Create a purchase from JSON on stdin")]
    Create,

    #[command(about = "Complete a pending purchase and receive its goods")]
    Complete {
        #[arg(help = "Purchase ID")]
        id: Id,
        #[arg(long, help = "Warehouse receiving the goods")]
        warehouse: Id,
    },

    #[command(about = "Delete a purchase")]
    Delete {
        #[arg(help = "Purchase ID")]
        id: Id,
    },
}

fn requirement(action: Action) -> Requirement {
    Requirement::permission(Resource::Compras, action)
}

pub async fn handle(cmd: PurchaseCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let console = Console::open()?;
    let purchases = PurchaseService::new(console.gateway().clone());

    match cmd {
        PurchaseCommands::List => {
            console.authorize(requirement(Action::View)).await?;
            let list = purchases.list().await?;
            output_collection(
                &output_format,
                "purchases",
                &list,
                &format!("{:<6} {:<10} {:<12} {:>12} {}", "ID", "SUPPLIER", "STATUS", "TOTAL", "DATE"),
                |p| {
                    format!(
                        "{:<6} {:<10} {:<12} {:>12} {}",
                        p.id,
                        p.proveedor_id,
                        p.estado.to_string(),
                        p.total,
                        p.fecha_compra.as_deref().unwrap_or("-")
                    )
                },
            )
        }
        PurchaseCommands::Show { id } => {
            console.authorize(requirement(Action::View)).await?;
            let purchase = purchases.get(id).await?;
            output_record(&output_format, "purchase", purchase.as_ref())
        }
        PurchaseCommands::Create => {
            console.authorize(requirement(Action::Create)).await?;
            let input: PurchaseInput = read_stdin_json()?;
            let purchase = purchases.create(&input).await?;
            output_success(
                &output_format,
                &format!("Created purchase {} totalling {}", purchase.id, purchase.total),
                Some(json!({ "purchase": purchase })),
            )
        }
        PurchaseCommands::Complete { id, warehouse } => {
            console.authorize(requirement(Action::Edit)).await?;
            let report = complete_purchase(console.gateway(), id, warehouse).await?;
            output_report(&output_format, &report)
        }
        PurchaseCommands::Delete { id } => {
            console.authorize(requirement(Action::Delete)).await?;
            if !purchases.delete(id).await? {
                anyhow::bail!("purchase {} was not deleted", id);
            }
            output_success(&output_format, &format!("Deleted purchase {}", id), Some(json!({ "id": id })))
        }
    }
}
