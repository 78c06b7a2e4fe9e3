use std::sync::Arc;

use application::{ChatServices, MessageLedger, PresenceRegistry};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<PresenceRegistry>,
    pub ledger: Arc<MessageLedger>,
}

impl AppState {
    pub fn new(services: &ChatServices) -> Self {
        Self {
            registry: services.registry.clone(),
            ledger: services.ledger.clone(),
        }
    }
}
