use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use crate::backend::{Backend, Subscription};
use crate::core::{BackendEvent, EventTopic, Item, ItemId, ItemStatus, ProcessingOptions, TransformRequest};
use crate::store::{Action, ItemStore};
use crate::utils::{UpscaleError, UpscaleResult};
use super::Model;

/// Outcome counts of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    /// Items never attempted: removed mid-run or left `Ready` by a stop
    pub skipped: usize,
    pub cancelled: bool,
}

/// Restores the idle state however the run ends.
struct RunGuard {
    store: ItemStore,
    progress: Option<Subscription>,
    /// Item handed to the backend and not yet settled
    in_flight: Option<ItemId>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        // Detach first so no late progress lands after the run is over
        drop(self.progress.take());
        if let Some(id) = self.in_flight.take() {
            warn!(item_id = %id, "Run aborted with an item in flight");
            self.store.dispatch(Action::SetStatus { id, status: ItemStatus::Error });
        }
        self.store.dispatch(Action::SetRunning(false));
    }
}

/// Drives a batch through the backend one item at a time.
pub struct JobOrchestrator {
    store: ItemStore,
    backend: Arc<dyn Backend>,
    stop_requested: Arc<AtomicBool>,
    run_lock: Mutex<()>,
}

impl JobOrchestrator {
    pub fn new(store: ItemStore, backend: Arc<dyn Backend>) -> Self {
        Self {
            store,
            backend,
            stop_requested: Arc::new(AtomicBool::new(false)),
            run_lock: Mutex::new(()),
        }
    }

    /// Processes every queued item in insertion order.
    ///
    /// Terminal items are reset and processed again. Returns [`UpscaleError::Busy`]
    /// when another run holds the queue, and an empty summary when there is nothing
    /// to do.
    pub async fn start_run(
        &self,
        model: &Model,
        target_scale: f64,
        options: &ProcessingOptions,
    ) -> UpscaleResult<RunSummary> {
        let Ok(_active) = self.run_lock.try_lock() else {
            debug!("Run requested while another is active");
            return Err(UpscaleError::Busy);
        };
        if self.store.snapshot().is_empty() {
            debug!("Run requested on an empty batch");
            return Ok(RunSummary::default());
        }

        self.stop_requested.store(false, Ordering::SeqCst);
        self.store.dispatch(Action::ResetAll);
        self.store.dispatch(Action::SetRunning(true));
        let mut guard = RunGuard {
            store: self.store.clone(),
            progress: Some(self.forward_progress()),
            in_flight: None,
        };

        let batch = self.store.snapshot();
        let mut summary = RunSummary {
            total: batch.items.len(),
            ..RunSummary::default()
        };
        info!(
            "Starting run: {} items, model {}, x{}",
            summary.total, model.id, target_scale
        );

        for (index, item) in batch.items.iter().enumerate() {
            if self.stop_requested.load(Ordering::SeqCst) {
                summary.cancelled = true;
                summary.skipped += batch.items.len() - index;
                info!("Run stopped with {} items left", batch.items.len() - index);
                break;
            }
            if !self.store.contains(item.id) {
                debug!("Item {} removed before its turn", item.id);
                summary.skipped += 1;
                continue;
            }

            guard.in_flight = Some(item.id);
            let completed = self.process_item(item, model, target_scale, options).await;
            guard.in_flight = None;
            if completed {
                summary.completed += 1;
            } else {
                summary.failed += 1;
            }
        }

        info!(
            "Run finished: {} completed, {} failed, {} skipped",
            summary.completed, summary.failed, summary.skipped
        );
        Ok(summary)
    }

    /// Requests the active run to stop after the in-flight item settles.
    pub fn stop_run(&self) {
        debug!("Stop requested");
        self.stop_requested.store(true, Ordering::SeqCst);
        self.backend.cancel();
    }

    /// Reads the published running flag; never contends for the run lock.
    pub fn is_active(&self) -> bool {
        self.store.is_running()
    }

    /// Returns whether the item completed.
    async fn process_item(
        &self,
        item: &Item,
        model: &Model,
        target_scale: f64,
        options: &ProcessingOptions,
    ) -> bool {
        let id = item.id;
        self.store.dispatch(Action::SetStatus { id, status: ItemStatus::Processing });

        let outcome = match TransformRequest::for_item(item, model, target_scale, options) {
            Ok(request) => {
                debug!("Transforming {} ({})", id, request.input_path.display());
                self.backend.transform(&request).await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(Some(path)) => {
                debug!("Item {} complete: {}", id, path.display());
                self.store.dispatch(Action::SetResult { id, path });
                true
            }
            Ok(None) => {
                error!(item_id = %id, error = "no output produced", "Item failed");
                self.store.dispatch(Action::SetStatus { id, status: ItemStatus::Error });
                false
            }
            Err(e) => {
                error!(item_id = %id, error = %e, "Item failed");
                self.store.dispatch(Action::SetStatus { id, status: ItemStatus::Error });
                false
            }
        }
    }

    fn forward_progress(&self) -> Subscription {
        let store = self.store.clone();
        self.backend.subscribe(
            EventTopic::ProcessingProgress,
            Arc::new(move |event: &BackendEvent| {
                if let BackendEvent::ProcessingProgress(p) = event {
                    store.dispatch(Action::SetProgress { id: p.item_id, progress: p.progress });
                }
            }),
        )
    }
}
