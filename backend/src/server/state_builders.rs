//! Builds the handler state from server configuration.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::warn;

use model_checker::domain::ports::DocumentStore;
use model_checker::domain::{AuthBridge, RulesetService};
use model_checker::inbound::http::state::HttpState;
use model_checker::outbound::persistence::{DieselDocumentStore, MemoryDocumentStore};
use model_checker::outbound::speckle::SpeckleHttpClient;

use super::ServerConfig;

fn build_document_store(config: &ServerConfig) -> Arc<dyn DocumentStore> {
    match &config.db_pool {
        Some(pool) => Arc::new(DieselDocumentStore::new(pool.clone())),
        None => {
            warn!("no database configured; documents are kept in memory and lost on restart");
            Arc::new(MemoryDocumentStore::new())
        }
    }
}

/// Wire the services shared by every worker.
///
/// # Errors
/// Returns [`std::io::Error`] when the Speckle client cannot be built.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let store = build_document_store(config);
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let speckle = Arc::new(
        SpeckleHttpClient::new(
            config.speckle.server_url(),
            config.speckle.request_timeout(),
        )
        .map_err(|e| std::io::Error::other(format!("speckle client setup failed: {e}")))?,
    );

    let credentials = config.speckle.credentials();
    if credentials.is_none() {
        warn!("SPECKLE_APP_ID or SPECKLE_APP_SECRET unset; sign-in is disabled");
    }

    Ok(HttpState::new(
        AuthBridge::new(speckle.clone(), store.clone(), credentials, clock.clone()),
        RulesetService::new(store, clock),
        speckle,
    ))
}
