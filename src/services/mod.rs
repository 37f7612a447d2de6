pub mod auth_service;
pub mod catalog_service;
pub mod inventory_service;
pub mod purchase_service;
pub mod sales_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use catalog_service::{CatalogEntity, CatalogService, CrudOperations};
pub use inventory_service::InventoryService;
pub use purchase_service::PurchaseService;
pub use sales_service::{SaleHeader, SalesService};
pub use user_service::UserService;
