use std::sync::Arc;
use std::time::Duration;

use shared::error::AppResult;

use crate::catalog::{MemoryCatalog, ProductCatalog};
use crate::core::Config;
use crate::ingest::IngestService;
use crate::store::{MemoryOrderStore, OrderStore};
use crate::sync::{
    OutboundNotifier, ReconciliationOrchestrator, ReqwestTransport, SyncStateStore,
    WebhookTransport,
};

/// Server state - shared references to every service
///
/// Cheap to clone (everything behind Arc); one instance is handed to the
/// axum router as application state.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration (immutable after startup)
    pub config: Config,
    /// Order store collaborator
    pub store: Arc<dyn OrderStore>,
    /// Product catalog collaborator
    pub catalog: Arc<dyn ProductCatalog>,
    /// Invoice ingest service
    pub ingest: Arc<IngestService>,
    /// Reconciliation engine entry points
    pub orchestrator: Arc<ReconciliationOrchestrator>,
}

impl ServerState {
    /// Build the production state: in-memory collaborators plus the
    /// reqwest webhook transport
    pub fn initialize(config: Config) -> AppResult<Self> {
        let transport: Arc<dyn WebhookTransport> = Arc::new(ReqwestTransport::new(
            Duration::from_secs(config.webhook_timeout_secs),
        )?);
        let store: Arc<dyn OrderStore> = Arc::new(MemoryOrderStore::new());
        let catalog: Arc<dyn ProductCatalog> = Arc::new(MemoryCatalog::new());
        Ok(Self::with_collaborators(config, store, catalog, transport))
    }

    /// Wire the services around injected collaborators (tests swap in a
    /// recording transport here)
    pub fn with_collaborators(
        config: Config,
        store: Arc<dyn OrderStore>,
        catalog: Arc<dyn ProductCatalog>,
        transport: Arc<dyn WebhookTransport>,
    ) -> Self {
        let sync_state = SyncStateStore::new(store.clone());
        let notifier = OutboundNotifier::new(transport, config.crm.clone(), sync_state.clone());
        let orchestrator = Arc::new(ReconciliationOrchestrator::new(
            store.clone(),
            notifier,
            sync_state,
        ));
        let ingest = Arc::new(IngestService::new(store.clone(), catalog.clone()));

        Self {
            config,
            store,
            catalog,
            ingest,
            orchestrator,
        }
    }
}
