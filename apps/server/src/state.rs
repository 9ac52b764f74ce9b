//! Shared application state

use std::sync::Arc;

use crate::{
    config::Config,
    db::{MemoryResourceStore, ResourceStore},
    services::{BinaryCreateHandler, BinaryService, CrudService, StoredBinaryHandler},
    Result,
};

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub crud_service: Arc<CrudService>,
    pub binary_service: Arc<BinaryService>,
}

impl AppState {
    /// Initialize the application state with the default stored-binary handler.
    pub fn new(config: Config) -> Result<Self> {
        Self::new_with_binary_handler(config, None)
    }

    /// Initialize the application state, optionally overriding how decoded
    /// Binary payloads are handled (the test harness installs capturing
    /// handlers here).
    pub fn new_with_binary_handler(
        config: Config,
        binary_handler: Option<Arc<dyn BinaryCreateHandler>>,
    ) -> Result<Self> {
        tracing::debug!("Initializing application state");

        let config = Arc::new(config);

        let store: Arc<dyn ResourceStore> = Arc::new(MemoryResourceStore::new());
        let crud_service = Arc::new(CrudService::new_with_policy(
            store,
            config.fhir.allow_update_create,
        ));

        let handler = binary_handler
            .unwrap_or_else(|| Arc::new(StoredBinaryHandler::new(crud_service.clone())));
        let binary_service = Arc::new(BinaryService::new(handler));

        Ok(Self {
            config,
            crud_service,
            binary_service,
        })
    }
}
