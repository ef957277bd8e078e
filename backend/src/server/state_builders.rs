//! Builders wiring domain services onto the configured store.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use assignment_formatter::domain::ports::{BillingRepository, DocumentRepository, ExportStore};
use assignment_formatter::domain::{BillingService, DocumentExportService, DocumentService};
use assignment_formatter::inbound::http::state::{HttpState, HttpStatePorts};
use assignment_formatter::outbound::export::default_encoders;
use assignment_formatter::outbound::memory::{InMemoryStore, StoreState, default_plans};
use assignment_formatter::outbound::persistence::{
    DieselBillingRepository, DieselDocumentRepository, DieselExportStore,
};

use super::config::{ServerConfig, StoreBackend};

/// Wire every driving port over one set of driven adapters.
fn wire<S, D, B>(
    export_store: Arc<S>,
    documents: Arc<D>,
    billing: Arc<B>,
    clock: Arc<dyn Clock>,
) -> HttpState
where
    S: ExportStore + 'static,
    D: DocumentRepository + 'static,
    B: BillingRepository + 'static,
{
    let exports = DocumentExportService::new(export_store, default_encoders(), clock.clone());
    let document_service = Arc::new(DocumentService::new(documents, billing.clone(), clock.clone()));
    let billing_service = Arc::new(BillingService::new(billing, clock));
    HttpState::new(HttpStatePorts {
        exports: Arc::new(exports),
        documents: document_service.clone(),
        documents_query: document_service,
        billing: billing_service.clone(),
        plans: billing_service,
    })
}

fn in_memory_store(seed_demo_data: bool, clock: &dyn Clock) -> InMemoryStore {
    if seed_demo_data {
        InMemoryStore::with_demo_data(clock.utc())
    } else {
        InMemoryStore::new(StoreState::with_plans(default_plans()))
    }
}

pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let state = match &config.backend {
        StoreBackend::Postgres(pool) => {
            info!("using PostgreSQL store");
            wire(
                Arc::new(DieselExportStore::new(pool.clone())),
                Arc::new(DieselDocumentRepository::new(pool.clone())),
                Arc::new(DieselBillingRepository::new(pool.clone())),
                clock,
            )
        }
        StoreBackend::InMemory { seed_demo_data } => {
            info!(seed_demo_data, "using in-memory store");
            let store = Arc::new(in_memory_store(*seed_demo_data, clock.as_ref()));
            wire(store.clone(), store.clone(), store, clock)
        }
    };
    web::Data::new(state)
}
