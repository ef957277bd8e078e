//! PostgreSQL persistence adapters using Diesel.
//!
//! Rows (`models.rs`) and table definitions (`schema.rs`) stay private to
//! this module; adapters translate them into domain types and map database
//! failures onto each port's error enum.

mod diesel_basic_error_mapping;
mod diesel_billing_repository;
mod diesel_document_repository;
mod diesel_export_store;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_billing_repository::DieselBillingRepository;
pub use diesel_document_repository::DieselDocumentRepository;
pub use diesel_export_store::DieselExportStore;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
