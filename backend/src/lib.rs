//! Assignment formatter backend library.
//!
//! Hexagonal layout: `domain` holds the export pipeline, drafts and billing
//! rules behind ports; `inbound` adapts HTTP onto the driving ports;
//! `outbound` provides persistence and the PDF/DOCX encoders.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
