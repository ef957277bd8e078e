//! HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use assignment_formatter::outbound::persistence::DbPool;

/// Where the ports read and write.
pub enum StoreBackend {
    /// PostgreSQL through the Diesel adapters.
    Postgres(DbPool),
    /// Process-local store, optionally seeded with demo data.
    InMemory { seed_demo_data: bool },
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) backend: StoreBackend,
}

impl ServerConfig {
    /// Server on the in-memory store with demo data.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            backend: StoreBackend::InMemory {
                seed_demo_data: true,
            },
        }
    }

    /// Use the Diesel adapters over `pool`.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.backend = StoreBackend::Postgres(pool);
        self
    }

    /// Toggle demo seeding. Ignored for PostgreSQL.
    #[must_use]
    pub fn with_demo_data(mut self, enabled: bool) -> Self {
        if let StoreBackend::InMemory { seed_demo_data } = &mut self.backend {
            *seed_demo_data = enabled;
        }
        self
    }
}
