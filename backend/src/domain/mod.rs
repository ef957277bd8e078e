//! Domain primitives, policies and services.
//!
//! Purpose: hold the transport-agnostic core of the formatter. Types here are
//! plain data with documented invariants; services implement the driving
//! ports in [`ports`] on top of the driven ones.
//!
//! Public surface:
//! - Error, ErrorCode, ErrorResponse: the error envelope.
//! - UserAccount, Plan, Document: entities read and written by the services.
//! - export: quota policy, print rendering and the export orchestrator.

pub mod account;
pub mod billing_service;
pub mod document;
pub mod document_service;
pub mod error;
pub mod export;
pub mod ids;
pub mod plan;
pub mod ports;
pub mod preview;
pub mod trace_id;

pub use self::account::UserAccount;
pub use self::billing_service::{BillingService, payment_reference};
pub use self::document::{
    Document, DocumentStatus, DocumentSummary, MAX_TITLE_CHARS, UnknownDocumentStatus,
    truncate_title,
};
pub use self::document_service::DocumentService;
pub use self::error::{Error, ErrorCode, ErrorResponse, ErrorValidationError};
pub use self::export::DocumentExportService;
pub use self::ids::{DocumentId, IdValidationError, PlanId, TransactionId, UserId};
pub use self::plan::{Plan, PlanType, UnknownPlanType};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use assignment_formatter::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
