use std::sync::Arc;

use crate::config::Config;
use crate::intake::orchestrator::IntakeOrchestrator;
use crate::repository::ApplicantRepository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Persistence contract; handlers and the orchestrator never see the
    /// storage backend.
    pub repository: Arc<dyn ApplicantRepository>,
    pub intake: Arc<IntakeOrchestrator>,
    pub config: Config,
}
