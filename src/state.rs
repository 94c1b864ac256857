use crate::storage::DocumentStore;
use std::sync::Arc;

/// Handler state. The store is opened once in `main` and shared here.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
}

impl AppState {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}
