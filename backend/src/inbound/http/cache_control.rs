//! Cache-control policies shared by the handlers.

use actix_web::http::header::{CacheControl, CacheDirective};

/// Per-user payloads: exports, documents and notices.
pub fn private_no_cache() -> CacheControl {
    CacheControl(vec![
        CacheDirective::Private,
        CacheDirective::NoCache,
        CacheDirective::MustRevalidate,
    ])
}

/// Health check responses, which must never be served from a cache.
pub fn no_store() -> CacheControl {
    CacheControl(vec![CacheDirective::NoStore])
}
