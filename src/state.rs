//! Shared state for the routes of one entity type.

use crate::service::EntityService;
use std::sync::Arc;

pub struct AppState<B> {
    pub service: Arc<EntityService<B>>,
}

// Manual impl: the backend itself need not be Clone.
impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        AppState {
            service: Arc::clone(&self.service),
        }
    }
}
