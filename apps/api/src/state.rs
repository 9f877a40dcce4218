use std::sync::Arc;

use crate::simplify::service::SimplificationService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Stateless pipeline; the Arc only shares the HTTP client behind it.
    pub simplifier: Arc<SimplificationService>,
}
