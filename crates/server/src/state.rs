use std::sync::Arc;

use service::resources::ResourceRepository;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub resources: Arc<dyn ResourceRepository>,
    /// Reject ids that are not integers instead of treating them as
    /// matching nothing.
    pub strict_ids: bool,
}

impl AppState {
    pub fn new(resources: Arc<dyn ResourceRepository>, strict_ids: bool) -> Self {
        Self { resources, strict_ids }
    }
}
