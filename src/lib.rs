pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod services;
pub mod types;
pub mod workflow;

#[cfg(test)]
pub mod testing;
