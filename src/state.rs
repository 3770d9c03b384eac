use crate::auth::AccessGate;
use crate::session::SessionStore;
use crate::storage::RecordStore;
use std::path::PathBuf;

#[derive(Clone)]
pub struct AppState {
    pub store: RecordStore,
    pub gate: AccessGate,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(data_path: PathBuf, password_hash: Option<String>) -> Self {
        Self {
            store: RecordStore::new(data_path),
            gate: AccessGate::new(password_hash),
            sessions: SessionStore::default(),
        }
    }
}
