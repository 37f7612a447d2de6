pub mod commands;
pub mod config;
pub mod context;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::workflow::WorkflowError;

pub use context::Console;

/// Shown instead of the server's text whenever the session was rejected
pub const SESSION_EXPIRED_MESSAGE: &str = "session expired, log in again";

#[derive(Parser)]
#[command(name = "ferre")]
#[command(about = "Ferretería admin console - catalog, inventory, purchasing and sales")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in, sign out and inspect the session")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Products, categories, units, warehouses, suppliers and clients")]
    Catalog {
        #[command(subcommand)]
        cmd: commands::catalog::CatalogCommands,
    },

    #[command(about = "Inventory movements and stock")]
    Inventory {
        #[command(subcommand)]
        cmd: commands::inventory::InventoryCommands,
    },

    #[command(about = "Supplier purchases")]
    Purchase {
        #[command(subcommand)]
        cmd: commands::purchase::PurchaseCommands,
    },

    #[command(about = "Sales and their completion")]
    Sale {
        #[command(subcommand)]
        cmd: commands::sale::SaleCommands,
    },

    #[command(about = "Issued invoices")]
    Invoice {
        #[command(subcommand)]
        cmd: commands::invoice::InvoiceCommands,
    },

    #[command(about = "Console user accounts (admin only)")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    let result = match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Catalog { cmd } => commands::catalog::handle(cmd, output_format).await,
        Commands::Inventory { cmd } => commands::inventory::handle(cmd, output_format).await,
        Commands::Purchase { cmd } => commands::purchase::handle(cmd, output_format).await,
        Commands::Sale { cmd } => commands::sale::handle(cmd, output_format).await,
        Commands::Invoice { cmd } => commands::invoice::handle(cmd, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, output_format).await,
    };

    result.map_err(|e| {
        if is_session_expired(&e) {
            anyhow::anyhow!(SESSION_EXPIRED_MESSAGE)
        } else {
            e
        }
    })
}

fn is_session_expired(error: &anyhow::Error) -> bool {
    match error.downcast_ref::<ClientError>() {
        Some(ClientError::SessionExpired) => true,
        Some(_) => false,
        None => matches!(
            error.downcast_ref::<WorkflowError>(),
            Some(WorkflowError::Client(ClientError::SessionExpired))
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expiry_is_recognised_through_layers() {
        assert!(is_session_expired(&anyhow::Error::from(ClientError::SessionExpired)));
        assert!(is_session_expired(&anyhow::Error::from(WorkflowError::Client(
            ClientError::SessionExpired
        ))));
        assert!(!is_session_expired(&anyhow::Error::from(ClientError::Transport("x".into()))));
        assert!(!is_session_expired(&anyhow::anyhow!("other")));
    }

    #[test]
    fn test_cli_parses_global_json_flag() {
        let cli = Cli::try_parse_from(["ferre", "inventory", "list", "--json"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
    }
}
