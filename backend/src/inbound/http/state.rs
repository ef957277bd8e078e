//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    BillingCommand, DocumentCommand, DocumentExportCommand, DocumentQuery, PlanQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub exports: Arc<dyn DocumentExportCommand>,
    pub documents: Arc<dyn DocumentCommand>,
    pub documents_query: Arc<dyn DocumentQuery>,
    pub billing: Arc<dyn BillingCommand>,
    pub plans: Arc<dyn PlanQuery>,
}

/// Parameter object naming every port [`HttpState`] needs.
pub struct HttpStatePorts {
    pub exports: Arc<dyn DocumentExportCommand>,
    pub documents: Arc<dyn DocumentCommand>,
    pub documents_query: Arc<dyn DocumentQuery>,
    pub billing: Arc<dyn BillingCommand>,
    pub plans: Arc<dyn PlanQuery>,
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            exports,
            documents,
            documents_query,
            billing,
            plans,
        } = ports;
        Self {
            exports,
            documents,
            documents_query,
            billing,
            plans,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
