use crate::database::manager::StoreManager;
use crate::session::SessionStore;

/// Shared application state handed to handlers and middleware.
///
/// The store manager opens a fresh connection per request; the session store
/// is the only cross-request in-memory state the service keeps.
#[derive(Clone)]
pub struct AppState {
    pub store: StoreManager,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(store: StoreManager) -> Self {
        Self { store, sessions: SessionStore::new() }
    }
}
