use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use serde::Serialize;
use tracing::{debug, info, warn};
use crate::backend::Backend;
use crate::core::{DEFAULT_CHUNK_SIZE, DroppedFile, ItemId};
use crate::preview::PreviewLifecycle;
use crate::store::{Action, ItemStore, NewFileItem, NewPathItem};
use crate::utils::is_image_file;

/// What one ingestion call did, for user-facing feedback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    /// Items appended to the store
    pub added: usize,
    /// Dropped files rejected by the local image check
    pub ignored: usize,
    /// Inputs that could not be classified or listed
    pub skipped_sources: Vec<PathBuf>,
    /// Directories that listed fine but held no images
    pub empty_sources: Vec<PathBuf>,
    /// Store dispatches made
    pub chunks: usize,
}

/// Turns user selections into queued items without hogging the executor.
pub struct IngestScheduler {
    store: ItemStore,
    backend: Arc<dyn Backend>,
    previews: Arc<PreviewLifecycle>,
    chunk_size: usize,
}

impl IngestScheduler {
    pub fn new(store: ItemStore, backend: Arc<dyn Backend>, previews: Arc<PreviewLifecycle>) -> Self {
        Self {
            store,
            backend,
            previews,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Sets how many paths go into one dispatch. Zero is treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Queues image paths and every image found below directory paths.
    ///
    /// Paths are de-duplicated in first-seen order and dispatched in chunks, yielding
    /// to the runtime between chunks. Inputs that fail are skipped.
    pub async fn add_paths(&self, inputs: Vec<PathBuf>) -> IngestReport {
        let mut report = IngestReport::default();
        let mut collected = Vec::new();

        for input in inputs {
            match self.backend.classify(&input).await {
                Ok(true) => collected.push(input),
                Ok(false) => match self.backend.expand_directory(&input).await {
                    Ok(found) if found.is_empty() => {
                        debug!("No images under {}", input.display());
                        report.empty_sources.push(input);
                    }
                    Ok(found) => {
                        debug!("{} images under {}", found.len(), input.display());
                        collected.extend(found);
                    }
                    Err(e) => {
                        warn!("Skipping {}: {}", input.display(), e);
                        report.skipped_sources.push(input);
                    }
                },
                Err(e) => {
                    warn!("Could not classify {}: {}", input.display(), e);
                    report.skipped_sources.push(input);
                }
            }
        }

        let mut seen = HashSet::new();
        let unique: Vec<PathBuf> = collected
            .into_iter()
            .filter(|p| seen.insert(p.clone()))
            .collect();

        for (index, chunk) in unique.chunks(self.chunk_size).enumerate() {
            if index > 0 {
                tokio::task::yield_now().await;
            }
            let items: Vec<NewPathItem> = chunk.iter().cloned().map(NewPathItem::new).collect();
            self.store.dispatch(Action::AddPaths(items));
            report.added += chunk.len();
            report.chunks += 1;
        }

        if report.added > 0 {
            info!("Added {} images in {} chunks", report.added, report.chunks);
        }
        report
    }

    /// Queues in-memory files that pass the local image check, in one dispatch.
    pub fn add_files(&self, files: Vec<DroppedFile>) -> IngestReport {
        let total = files.len();
        let items: Vec<NewFileItem> = files
            .into_iter()
            .filter(|f| is_image_file(&f.name, f.mime.as_deref()))
            .map(|file| {
                let id = ItemId::new();
                let preview = self.previews.allocate(id, &file);
                NewFileItem { id, file: Arc::new(file), preview }
            })
            .collect();

        let mut report = IngestReport {
            added: items.len(),
            ignored: total - items.len(),
            ..IngestReport::default()
        };
        if report.ignored > 0 {
            debug!("Ignored {} dropped non-images", report.ignored);
        }
        if !items.is_empty() {
            self.store.dispatch(Action::AddFiles(items));
            report.chunks = 1;
        }
        report
    }
}
