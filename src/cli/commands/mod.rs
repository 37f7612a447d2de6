pub mod auth;
pub mod catalog;
pub mod inventory;
pub mod invoice;
pub mod purchase;
pub mod sale;
pub mod user;
