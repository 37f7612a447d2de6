use clap::Subcommand;

use crate::auth::Requirement;
use crate::cli::utils::*;
use crate::cli::{Console, OutputFormat};
use crate::services::SalesService;
use crate::types::{Action, Id, Resource};

#[derive(Subcommand)]
pub enum InvoiceCommands {
    #[command(about = "List invoices")]
    List,

    #[command(about = "Show one invoice with its sale")]
    Show {
        #[arg(help = "Invoice ID")]
        id: Id,
    },

    #[command(about = "Show the invoice issued for a sale")]
    ForSale {
        #[arg(help = "Sale ID")]
        sale: Id,
    },
}

pub async fn handle(cmd: InvoiceCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let console = Console::open()?;
    console
        .authorize(Requirement::permission(Resource::Ventas, Action::View))
        .await?;
    let sales = SalesService::new(console.gateway().clone());

    match cmd {
        InvoiceCommands::List => {
            let invoices = sales.invoices().await?;
            output_collection(
                &output_format,
                "invoices",
                &invoices,
                &format!("{:<6} {:<12} {:<8} {:>12} {}", "ID", "NUMBER", "SALE", "AMOUNT", "DATE"),
                |i| {
                    format!(
                        "{:<6} {:<12} {:<8} {:>12} {}",
                        i.id,
                        i.numero.as_deref().unwrap_or("-"),
                        i.venta.as_ref().map(|v| v.id.to_string()).unwrap_or_else(|| "-".into()),
                        i.monto_total,
                        i.fecha.as_deref().unwrap_or("-")
                    )
                },
            )
        }
        InvoiceCommands::Show { id } => {
            let invoice = sales.invoice(id).await?;
            output_record(&output_format, "invoice", invoice.as_ref())
        }
        InvoiceCommands::ForSale { sale } => {
            let invoice = sales.invoice_for_sale(sale).await?;
            output_record(&output_format, "invoice", invoice.as_ref())
        }
    }
}
