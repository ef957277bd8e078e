//! Outbound adapters implementing domain ports.
//!
//! - **export**: PDF and DOCX encoders behind `DocumentEncoder`.
//! - **memory**: mutex-guarded store used without a database and in tests.
//! - **persistence**: PostgreSQL repositories using Diesel.

pub mod export;
pub mod memory;
pub mod persistence;
