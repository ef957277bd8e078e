//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod billing_command;
mod billing_repository;
mod document_command;
mod document_encoder;
mod document_export_command;
mod document_query;
mod document_repository;
mod export_store;
mod plan_query;

#[cfg(test)]
pub use billing_command::MockBillingCommand;
pub use billing_command::{BillingCommand, PurchaseRequest, PurchaseResponse};
#[cfg(test)]
pub use billing_repository::MockBillingRepository;
pub use billing_repository::{
    BillingRepository, BillingRepositoryError, FixtureBillingRepository, PurchaseCommit,
    PurchaseEffect, PurchaseReceipt,
};
#[cfg(test)]
pub use document_command::MockDocumentCommand;
pub use document_command::{DocumentCommand, SaveDraftRequest, SaveDraftResponse};
#[cfg(test)]
pub use document_encoder::MockDocumentEncoder;
pub use document_encoder::{DocumentEncoder, EncodeError, EncodeInput};
#[cfg(test)]
pub use document_export_command::MockDocumentExportCommand;
pub use document_export_command::{DocumentExportCommand, ExportRequest};
#[cfg(test)]
pub use document_query::MockDocumentQuery;
pub use document_query::{Dashboard, DocumentQuery};
#[cfg(test)]
pub use document_repository::MockDocumentRepository;
pub use document_repository::{DocumentRepository, DocumentRepositoryError, DraftContent};
#[cfg(test)]
pub use export_store::MockExportStore;
pub use export_store::{
    DailyCap, ExportCommit, ExportReceipt, ExportStore, ExportStoreError, FixtureExportStore,
};
#[cfg(test)]
pub use plan_query::MockPlanQuery;
pub use plan_query::PlanQuery;
