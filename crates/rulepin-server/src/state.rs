use rulepin_core::health::HealthState;
use std::sync::Arc;

/// Shared application state passed to the probe handlers.
#[derive(Clone)]
pub struct AppState {
    pub health: Arc<HealthState>,
}

impl AppState {
    pub fn new(health: Arc<HealthState>) -> Self {
        Self { health }
    }
}
