use std::sync::Arc;

use crate::cache::CacheStore;
use crate::store::PracticeStore;

/// Shared handles threaded through the router. Both sides are traits so the
/// binary wires Postgres + the TTL cache while tests wire in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PracticeStore>,
    pub cache: Arc<dyn CacheStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn PracticeStore>, cache: Arc<dyn CacheStore>) -> Self {
        Self { store, cache }
    }
}
