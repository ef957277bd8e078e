//! Backend entry-point: loads settings, prepares the store and serves HTTP.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use assignment_formatter::inbound::http::health::HealthState;
use assignment_formatter::inbound::http::session_config::{
    BuildMode, session_settings_from_env,
};
use assignment_formatter::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use assignment_formatter::settings::AppSettings;

use server::ServerConfig;

async fn connect(url: &str, settings: &AppSettings) -> std::io::Result<DbPool> {
    run_migrations(url).await.map_err(std::io::Error::other)?;
    let config = PoolConfig::new(url)
        .with_max_size(settings.db_max_connections())
        .with_checkout_timeout(settings.db_checkout_timeout());
    DbPool::new(config).await.map_err(std::io::Error::other)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| std::io::Error::other(err.to_string()))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        settings.bind_addr(),
    )
    .with_demo_data(settings.seed_demo_data());
    if let Some(url) = settings.database_url() {
        config = config.with_db_pool(connect(url, &settings).await?);
    }

    let health_state = web::Data::new(HealthState::new());
    info!(addr = %settings.bind_addr(), "starting server");
    let server = server::create_server(health_state.clone(), config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
