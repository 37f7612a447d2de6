use clap::{Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde_json::json;

use crate::auth::Requirement;
use crate::cli::utils::*;
use crate::cli::{Console, OutputFormat};
use crate::models::{Category, Client, Product, Supplier, UnitOfMeasure, Warehouse};
use crate::services::{CatalogEntity, CatalogService};
use crate::types::{Action, Id, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityKind {
    Products,
    Categories,
    Units,
    Warehouses,
    Suppliers,
    Clients,
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    #[command(about = "List records of an entity type")]
    List {
        #[arg(value_enum, help = "Entity type")]
        entity: EntityKind,
    },

    #[command(about = "Show one record")]
    Get {
        #[arg(value_enum, help = "Entity type")]
        entity: EntityKind,
        #[arg(help = "Record ID")]
        id: Id,
    },

    #[command(about = "Create a record from JSON on stdin")]
    Create {
        #[arg(value_enum, help = "Entity type")]
        entity: EntityKind,
    },

    #[command(about = "Update a record from JSON on stdin")]
    Update {
        #[arg(value_enum, help = "Entity type")]
        entity: EntityKind,
        #[arg(help = "Record ID")]
        id: Id,
    },

    #[command(about = "Delete a record")]
    Delete {
        #[arg(value_enum, help = "Entity type")]
        entity: EntityKind,
        #[arg(help = "Record ID")]
        id: Id,
    },

    #[command(about = "Change a product's price")]
    Price {
        #[arg(help = "Product ID")]
        id: Id,
        #[arg(help = "New price")]
        price: Decimal,
    },
}

/// Run a generic handler with the model type behind `$kind`
macro_rules! for_entity {
    ($kind:expr, $handler:ident($($arg:expr),*)) => {
        match $kind {
            EntityKind::Products => $handler::<Product>($($arg),*).await,
            EntityKind::Categories => $handler::<Category>($($arg),*).await,
            EntityKind::Units => $handler::<UnitOfMeasure>($($arg),*).await,
            EntityKind::Warehouses => $handler::<Warehouse>($($arg),*).await,
            EntityKind::Suppliers => $handler::<Supplier>($($arg),*).await,
            EntityKind::Clients => $handler::<Client>($($arg),*).await,
        }
    };
}

pub async fn handle(cmd: CatalogCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let console = Console::open()?;
    let fmt = &output_format;

    match cmd {
        CatalogCommands::List { entity } => for_entity!(entity, list(&console, fmt)),
        CatalogCommands::Get { entity, id } => for_entity!(entity, get(&console, fmt, id)),
        CatalogCommands::Create { entity } => for_entity!(entity, create(&console, fmt)),
        CatalogCommands::Update { entity, id } => for_entity!(entity, update(&console, fmt, id)),
        CatalogCommands::Delete { entity, id } => for_entity!(entity, delete(&console, fmt, id)),
        CatalogCommands::Price { id, price } => {
            console
                .authorize(Requirement::permission(Resource::Productos, Action::Edit))
                .await?;
            let change = CatalogService::new(console.gateway().clone())
                .update_product_price(id, price)
                .await?;
            output_success(
                fmt,
                &format!("Product {} now costs {}", change.id, change.precio),
                Some(json!({ "product": change })),
            )
        }
    }
}

async fn list<E: CatalogEntity>(console: &Console, fmt: &OutputFormat) -> anyhow::Result<()> {
    console.authorize(Requirement::permission(E::RESOURCE, Action::View)).await?;
    let items = CatalogService::new(console.gateway().clone()).list::<E>().await?;
    output_collection(fmt, E::LABEL, &items, &format!("{:<8} NAME", "ID"), |item| {
        format!("{:<8} {}", item.id(), item.display_name())
    })
}

async fn get<E: CatalogEntity>(console: &Console, fmt: &OutputFormat, id: Id) -> anyhow::Result<()> {
    console.authorize(Requirement::permission(E::RESOURCE, Action::View)).await?;
    let item = CatalogService::new(console.gateway().clone()).get::<E>(id).await?;
    output_record(fmt, E::LABEL, item.as_ref())
}

async fn create<E: CatalogEntity>(console: &Console, fmt: &OutputFormat) -> anyhow::Result<()> {
    console.authorize(Requirement::permission(E::RESOURCE, Action::Create)).await?;
    let input: E::Input = read_stdin_json()?;
    let created = CatalogService::new(console.gateway().clone()).create::<E>(&input).await?;
    output_success(
        fmt,
        &format!("Created {} {} ({})", E::LABEL, created.id(), created.display_name()),
        Some(json!({ E::LABEL: created })),
    )
}

async fn update<E: CatalogEntity>(console: &Console, fmt: &OutputFormat, id: Id) -> anyhow::Result<()> {
    console.authorize(Requirement::permission(E::RESOURCE, Action::Edit)).await?;
    let input: E::Input = read_stdin_json()?;
    let updated = CatalogService::new(console.gateway().clone()).update::<E>(id, &input).await?;
    output_success(
        fmt,
        &format!("Updated {} {}", E::LABEL, id),
        Some(json!({ E::LABEL: updated })),
    )
}

async fn delete<E: CatalogEntity>(console: &Console, fmt: &OutputFormat, id: Id) -> anyhow::Result<()> {
    console.authorize(Requirement::permission(E::RESOURCE, Action::Delete)).await?;
    if !CatalogService::new(console.gateway().clone()).delete::<E>(id).await? {
        anyhow::bail!("{} {} was not deleted", E::LABEL, id);
    }
    output_success(fmt, &format!("Deleted {} {}", E::LABEL, id), Some(json!({ "id": id })))
}
