use std::sync::Arc;

use x402::Facilitator;

use crate::config::ServerConfig;
use crate::db::Database;

/// Shared application state.
///
/// The facilitator is injected at construction (generic so tests can swap in
/// a mock) — there are no module-load singletons; credentials are validated
/// in the bootstrap before this is built.
pub struct AppState<F: Facilitator> {
    pub config: Arc<ServerConfig>,
    pub db: Arc<Database>,
    pub facilitator: Arc<F>,
}

impl<F: Facilitator> AppState<F> {
    pub fn new(config: ServerConfig, db: Database, facilitator: F) -> Self {
        Self {
            config: Arc::new(config),
            db: Arc::new(db),
            facilitator: Arc::new(facilitator),
        }
    }
}

impl<F: Facilitator> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            db: Arc::clone(&self.db),
            facilitator: Arc::clone(&self.facilitator),
        }
    }
}
