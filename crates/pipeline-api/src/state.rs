use broker::Broker;
use registry_store::StorageConnection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub storage: StorageConnection,
    pub broker: Arc<dyn Broker>,
}

impl AppState {
    pub fn new(storage: StorageConnection, broker: Arc<dyn Broker>) -> Self {
        Self { storage, broker }
    }
}
