//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data`. Every adapter is
//! constructed explicitly by the binary, so tests can swap in doubles.

use std::sync::Arc;

use crate::domain::ports::ProjectCatalogue;
use crate::domain::{AuthBridge, RulesetService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: AuthBridge,
    pub rulesets: RulesetService,
    pub catalogue: Arc<dyn ProjectCatalogue>,
}

impl HttpState {
    /// Bundle the services and the project catalogue.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// use mockable::DefaultClock;
    /// use model_checker::domain::{AuthBridge, RulesetService};
    /// use model_checker::inbound::http::state::HttpState;
    /// use model_checker::outbound::persistence::MemoryDocumentStore;
    /// use model_checker::outbound::speckle::SpeckleHttpClient;
    ///
    /// let store = Arc::new(MemoryDocumentStore::new());
    /// let clock = Arc::new(DefaultClock);
    /// let speckle = Arc::new(
    ///     SpeckleHttpClient::new("https://app.speckle.systems", Duration::from_secs(30))
    ///         .expect("client"),
    /// );
    /// let state = HttpState::new(
    ///     AuthBridge::new(speckle.clone(), store.clone(), None, clock.clone()),
    ///     RulesetService::new(store, clock),
    ///     speckle,
    /// );
    /// let _rulesets = state.rulesets.clone();
    /// ```
    pub fn new(
        auth: AuthBridge,
        rulesets: RulesetService,
        catalogue: Arc<dyn ProjectCatalogue>,
    ) -> Self {
        Self {
            auth,
            rulesets,
            catalogue,
        }
    }
}
