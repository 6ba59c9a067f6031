use std::sync::Arc;

use crate::config::Config;
use crate::store::DiscussionStore;
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DiscussionStore>,
    pub config: Config,
}

impl FromRef<AppState> for Arc<dyn DiscussionStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
