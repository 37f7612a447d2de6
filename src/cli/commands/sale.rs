use clap::Subcommand;
use rust_decimal::Decimal;
use serde_json::json;

use crate::auth::Requirement;
use crate::cli::utils::*;
use crate::cli::{Console, OutputFormat};
use crate::models::{NewSale, NewSaleLine, PaymentMethod, SaleStatus};
use crate::services::SalesService;
use crate::types::{Action, Id, Resource};
use crate::workflow::{complete_sale, create_sale};

#[derive(Subcommand)]
pub enum SaleCommands {
    #[command(about = "List sales")]
    List,

    #[command(about = "Show one sale with its lines")]
    Show {
        #[arg(help = "Sale ID")]
        id: Id,
    },

    #[command(about = "Open a sale with its lines")]
    Create {
        #[arg(long, help = "Client ID")]
        client: Id,
        #[arg(long, default_value = "EFECTIVO", help = "EFECTIVO, TARJETA or TRANSFERENCIA")]
        payment: PaymentMethod,
        #[arg(long = "line", value_parser = parse_sale_line, help = "PRODUCT:QTY:PRICE, repeatable")]
        lines: Vec<NewSaleLine>,
    },

    #[command(about = "Issue the invoice, complete the sale and dispatch its goods")]
    Invoice {
        #[arg(help = "Sale ID")]
        id: Id,
        #[arg(long, help = "Warehouse for lines that record none")]
        warehouse: Option<Id>,
    },

    #[command(about = "Change a sale's status or payment method")]
    Status {
        #[arg(help = "Sale ID")]
        id: Id,
        #[arg(help = "PENDIENTE, COMPLETADA or CANCELADA")]
        status: Option<SaleStatus>,
        #[arg(long, help = "New payment method")]
        payment: Option<PaymentMethod>,
    },
}

/// `PRODUCT:QTY:PRICE`, e.g. `12:3:45.50`
pub fn parse_sale_line(s: &str) -> Result<NewSaleLine, String> {
    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    let [product, quantity, price] = parts.as_slice() else {
        return Err(format!("expected PRODUCT:QTY:PRICE, got '{}'", s));
    };
    Ok(NewSaleLine {
        producto_id: Some(product.parse().map_err(|_| format!("invalid product id '{}'", product))?),
        cantidad: quantity.parse().map_err(|_| format!("invalid quantity '{}'", quantity))?,
        precio_unitario: price
            .parse::<Decimal>()
            .map_err(|_| format!("invalid price '{}'", price))?,
    })
}

pub async fn handle(cmd: SaleCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let console = Console::open()?;
    let sales = SalesService::new(console.gateway().clone());
    let requirement = |action| Requirement::permission(Resource::Ventas, action);

    match cmd {
        SaleCommands::List => {
            console.authorize(requirement(Action::View)).await?;
            let list = sales.list().await?;
            output_collection(
                &output_format,
                "sales",
                &list,
                &format!("{:<6} {:<24} {:<11} {:>12} {}", "ID", "CLIENT", "STATUS", "TOTAL", "DATE"),
                |s| {
                    format!(
                        "{:<6} {:<24} {:<11} {:>12} {}",
                        s.id,
                        s.cliente.as_ref().map(|c| c.full_name()).unwrap_or_else(|| "-".into()),
                        s.estado.map(|e| e.as_str()).unwrap_or("-"),
                        s.amount_due(),
                        s.fecha.as_deref().unwrap_or("-")
                    )
                },
            )
        }
        SaleCommands::Show { id } => {
            console.authorize(requirement(Action::View)).await?;
            let sale = sales.get(id).await?;
            output_record(&output_format, "sale", sale.as_ref())
        }
        SaleCommands::Create { client, payment, lines } => {
            let seller = console.authorize(requirement(Action::Create)).await?;
            let sale = NewSale {
                cliente_id: client,
                vendedor_id: seller.id,
                metodo_pago: payment,
                lines,
            };
            let report = create_sale(console.gateway(), &sale).await?;
            output_report(&output_format, &report)
        }
        SaleCommands::Invoice { id, warehouse } => {
            console.authorize(requirement(Action::Edit)).await?;
            let report = complete_sale(console.gateway(), id, warehouse).await?;
            output_report(&output_format, &report)?;
            if let Some(invoice_id) = report.steps.first().and_then(|r| r.record_id) {
                if let OutputFormat::Text = output_format {
                    println!("Invoice {} issued for sale {}", invoice_id, id);
                }
            }
            Ok(())
        }
        SaleCommands::Status { id, status, payment } => {
            console.authorize(requirement(Action::Edit)).await?;
            if status.is_none() && payment.is_none() {
                anyhow::bail!("nothing to change; give a status and/or --payment");
            }
            let sale = sales.update(id, status, payment).await?;
            output_success(
                &output_format,
                &format!("Sale {} is {}", sale.id, sale.estado.map(|e| e.as_str()).unwrap_or("updated")),
                Some(json!({ "sale": sale })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sale_line() {
        let line = parse_sale_line("12:3:45.50").unwrap();
        assert_eq!(line.producto_id, Some(12));
        assert_eq!(line.cantidad, 3);
        assert_eq!(line.precio_unitario, Decimal::new(4550, 2));

        assert!(parse_sale_line("12:3").is_err());
        assert!(parse_sale_line("x:3:1").is_err());
        assert!(parse_sale_line("12:3:abc").is_err());
    }
}
