//! Application state shared by the command handlers.

use std::sync::Arc;
use tracing::debug;
use crate::backend::Backend;
use crate::core::AppConfig;
use crate::ingest::IngestScheduler;
use crate::preview::{PreviewAllocator, PreviewLifecycle};
use crate::processing::{JobOrchestrator, ModelAvailability};
use crate::store::ItemStore;

/// Owns the store and every component that reads or writes it.
///
/// Cloning is cheap; all clones share the same batch.
#[derive(Clone)]
pub struct AppState {
    store: ItemStore,
    previews: Arc<PreviewLifecycle>,
    scheduler: Arc<IngestScheduler>,
    orchestrator: Arc<JobOrchestrator>,
    models: Arc<ModelAvailability>,
    config: Arc<AppConfig>,
}

impl AppState {
    /// Wires a fresh, empty batch to `backend`.
    pub fn new(backend: Arc<dyn Backend>, allocator: Arc<dyn PreviewAllocator>, config: AppConfig) -> Self {
        let previews = Arc::new(PreviewLifecycle::new(allocator));
        let store = ItemStore::with_previews(Arc::clone(&previews));
        let scheduler = IngestScheduler::new(store.clone(), Arc::clone(&backend), Arc::clone(&previews))
            .with_chunk_size(config.ingest.chunk_size);
        let orchestrator = JobOrchestrator::new(store.clone(), Arc::clone(&backend));
        let models = ModelAvailability::new(backend);
        debug!("App state ready (chunk size {})", config.ingest.chunk_size);

        Self {
            store,
            previews,
            scheduler: Arc::new(scheduler),
            orchestrator: Arc::new(orchestrator),
            models: Arc::new(models),
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    pub fn previews(&self) -> &PreviewLifecycle {
        &self.previews
    }

    pub fn scheduler(&self) -> &IngestScheduler {
        &self.scheduler
    }

    pub fn orchestrator(&self) -> &JobOrchestrator {
        &self.orchestrator
    }

    pub fn models(&self) -> &ModelAvailability {
        &self.models
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
