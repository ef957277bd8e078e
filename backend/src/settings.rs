//! Application settings loaded via OrthoConfig.
//!
//! Values come from `FORMATTER_*` environment variables, configuration files
//! and command-line flags, in OrthoConfig's usual precedence.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_CHECKOUT_TIMEOUT_SECS: u64 = 5;

/// Server and persistence settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FORMATTER")]
pub struct AppSettings {
    /// Interface to bind. Defaults to all IPv4 interfaces.
    pub host: Option<IpAddr>,
    pub port: Option<u16>,
    /// PostgreSQL URL. Without one the server runs on the in-memory store.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Seconds a request waits for a pooled connection before failing.
    pub db_checkout_timeout_secs: Option<u64>,
    /// Seed the in-memory store with a demo user, plans and a sample draft.
    pub seed_demo_data: Option<bool>,
}

impl AppSettings {
    /// Socket address the HTTP server binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Demo seeding is on unless explicitly disabled.
    pub fn seed_demo_data(&self) -> bool {
        self.seed_demo_data.unwrap_or(true)
    }

    pub fn db_checkout_timeout(&self) -> Duration {
        Duration::from_secs(
            self.db_checkout_timeout_secs
                .unwrap_or(DEFAULT_DB_CHECKOUT_TIMEOUT_SECS),
        )
    }
}
