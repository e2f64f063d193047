//! Model checker entry-point: loads configuration, prepares persistence and
//! starts the HTTP server.

mod server;

use std::ffi::OsString;
use std::io;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use model_checker::inbound::http::health::HealthState;
use model_checker::inbound::http::session_config::fingerprint::key_fingerprint;
use model_checker::inbound::http::session_config::{BuildMode, session_settings_from_env};
use model_checker::inbound::http::views;
use model_checker::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use model_checker::settings::{ServiceSettings, SpeckleSettings};
use server::{ServerConfig, create_server};

/// Settings come from the environment only; command-line flags are ignored.
fn program_args() -> [OsString; 1] {
    [OsString::from(env!("CARGO_PKG_NAME"))]
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|e| io::Error::other(format!("session configuration invalid: {e}")))?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    views::init().map_err(|e| io::Error::other(format!("template setup failed: {e}")))?;

    let service = ServiceSettings::load_from_iter(program_args())
        .map_err(|e| io::Error::other(format!("service configuration invalid: {e}")))?;
    let speckle = SpeckleSettings::load_from_iter(program_args())
        .map_err(|e| io::Error::other(format!("speckle configuration invalid: {e}")))?;

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        service.bind_addr(),
        speckle,
    );
    if let Some(database_url) = service.database_url() {
        run_pending_migrations(database_url)
            .await
            .map_err(io::Error::other)?;
        let pool = DbPool::new(
            PoolConfig::new(database_url).with_max_size(service.pool_max_size()),
        )
        .await
        .map_err(io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    let bind_addr = config.bind_addr();
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "model checker listening");
    server.await
}
