use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info, warn};
use crate::backend::{Backend, Subscription};
use crate::core::{BackendEvent, EventTopic};
use crate::utils::UpscaleResult;
use super::{MODELS, Model, get_model_by_file_name};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStatus {
    pub available: bool,
    pub downloading: bool,
}

type StatusMap = HashMap<&'static str, ModelStatus>;

/// Which catalog models are installed or being fetched, keyed by model id.
///
/// Kept current from explicit checks and from the backend's download progress.
pub struct ModelAvailability {
    backend: Arc<dyn Backend>,
    statuses: Arc<RwLock<StatusMap>>,
    _downloads: Subscription,
}

impl ModelAvailability {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let statuses: Arc<RwLock<StatusMap>> = Arc::new(RwLock::new(
            MODELS.iter().map(|m| (m.id, ModelStatus::default())).collect(),
        ));

        let sink = Arc::clone(&statuses);
        let downloads = backend.subscribe(
            EventTopic::ModelDownloadProgress,
            Arc::new(move |event: &BackendEvent| {
                let BackendEvent::ModelDownloadProgress(progress) = event else {
                    return;
                };
                let Some(model) = get_model_by_file_name(&progress.model_filename) else {
                    return;
                };
                let mut statuses = sink.write();
                let status = statuses.entry(model.id).or_default();
                if progress.is_finished() {
                    status.available = true;
                    status.downloading = false;
                } else {
                    status.downloading = true;
                }
            }),
        );

        Self {
            backend,
            statuses,
            _downloads: downloads,
        }
    }

    /// Re-checks every catalog model with the backend. Failed checks count as unavailable.
    pub async fn refresh(&self) -> StatusMap {
        for model in MODELS {
            let available = match self.backend.check_model_available(model.file_name).await {
                Ok(available) => available,
                Err(e) => {
                    warn!("Availability check for {} failed: {}", model.id, e);
                    false
                }
            };
            self.statuses.write().entry(model.id).or_default().available = available;
        }
        debug!("Model availability refreshed");
        self.statuses()
    }

    /// Fetches `model` through the backend.
    pub async fn download(&self, model: &'static Model) -> UpscaleResult<PathBuf> {
        self.update(model, |s| s.downloading = true);
        info!("Downloading {}", model.file_name);

        let result = self.backend.download_model(model.file_name).await;
        self.update(model, |s| {
            s.downloading = false;
            if result.is_ok() {
                s.available = true;
            }
        });
        result
    }

    pub fn statuses(&self) -> StatusMap {
        self.statuses.read().clone()
    }

    pub fn is_available(&self, model_id: &str) -> bool {
        self.statuses.read().get(model_id).is_some_and(|s| s.available)
    }

    pub fn is_downloading(&self, model_id: &str) -> bool {
        self.statuses.read().get(model_id).is_some_and(|s| s.downloading)
    }

    fn update(&self, model: &'static Model, f: impl FnOnce(&mut ModelStatus)) {
        f(self.statuses.write().entry(model.id).or_default());
    }
}
