use std::sync::Arc;

use storefront_core::InteractionController;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) controller: Arc<InteractionController>,
    pub(crate) max_body_bytes: usize,
}
