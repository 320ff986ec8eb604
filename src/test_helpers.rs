//! Scripted in-memory backend shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;
use crate::backend::{Backend, EventBus, EventHandler, Subscription};
use crate::core::{BackendEvent, EventTopic, ItemProgress, ModelDownloadProgress, TransformRequest};
use crate::utils::{PathError, UpscaleError, UpscaleResult, upscaled_output_path};

/// Pauses a transform until the test lets it go.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

#[derive(Default)]
pub struct FakeBackend {
    pub events: EventBus,
    images: Mutex<HashSet<PathBuf>>,
    dirs: Mutex<HashMap<PathBuf, Vec<PathBuf>>>,
    unclassifiable: Mutex<HashSet<PathBuf>>,
    failing: Mutex<HashSet<PathBuf>>,
    no_output: Mutex<HashSet<PathBuf>>,
    gates: Mutex<HashMap<PathBuf, Arc<Gate>>>,
    available_models: Mutex<HashSet<String>>,
    downloadable_models: Mutex<HashSet<String>>,
    calls: Mutex<Vec<PathBuf>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    cancels: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_images<I, P>(&self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.images.lock().extend(paths.into_iter().map(Into::into));
    }

    /// A directory whose scan yields `files` verbatim, duplicates included.
    pub fn add_dir<I, P>(&self, dir: impl Into<PathBuf>, files: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let files: Vec<PathBuf> = files.into_iter().map(Into::into).collect();
        self.images.lock().extend(files.iter().cloned());
        self.dirs.lock().insert(dir.into(), files);
    }

    pub fn unclassifiable(&self, path: impl Into<PathBuf>) {
        self.unclassifiable.lock().insert(path.into());
    }

    pub fn fail_on(&self, input: impl Into<PathBuf>) {
        self.failing.lock().insert(input.into());
    }

    pub fn no_output_on(&self, input: impl Into<PathBuf>) {
        self.no_output.lock().insert(input.into());
    }

    pub fn pause_on(&self, input: impl Into<PathBuf>) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.gates.lock().insert(input.into(), Arc::clone(&gate));
        gate
    }

    pub fn with_model(&self, file_name: &str) {
        self.available_models.lock().insert(file_name.to_string());
    }

    pub fn downloadable(&self, file_name: &str) {
        self.downloadable_models.lock().insert(file_name.to_string());
    }

    /// Input paths in the order transform was called.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    pub fn emit_download(&self, file_name: &str, progress: u8) {
        self.events.emit(BackendEvent::ModelDownloadProgress(ModelDownloadProgress {
            model_filename: file_name.to_string(),
            progress: Some(progress),
            downloaded: progress as u64,
            total: Some(100),
        }));
    }

    async fn run_transform(&self, request: &TransformRequest) -> UpscaleResult<Option<PathBuf>> {
        let input = &request.input_path;
        let progress = |value| {
            self.events.emit(BackendEvent::ProcessingProgress(ItemProgress {
                item_id: request.item_id,
                progress: value,
            }));
        };

        progress(10);
        let gate = self.gates.lock().get(input).cloned();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        tokio::task::yield_now().await;
        progress(60);

        if self.failing.lock().contains(input) {
            return Err(UpscaleError::transform(format!("scripted failure for {}", input.display())));
        }
        if self.no_output.lock().contains(input) {
            return Ok(None);
        }
        progress(100);
        Ok(Some(upscaled_output_path(
            input,
            &request.output_dir,
            request.target_scale,
            request.overwrite,
        )))
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn classify(&self, path: &Path) -> UpscaleResult<bool> {
        tokio::task::yield_now().await;
        if self.unclassifiable.lock().contains(path) {
            return Err(UpscaleError::backend(format!("cannot classify {}", path.display())));
        }
        Ok(self.images.lock().contains(path))
    }

    async fn expand_directory(&self, root: &Path) -> UpscaleResult<Vec<PathBuf>> {
        tokio::task::yield_now().await;
        self.dirs
            .lock()
            .get(root)
            .cloned()
            .ok_or_else(|| PathError::NotFound(root.to_path_buf()).into())
    }

    async fn transform(&self, request: &TransformRequest) -> UpscaleResult<Option<PathBuf>> {
        self.calls.lock().push(request.input_path.clone());
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let result = self.run_transform(request).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }

    fn subscribe(&self, topic: EventTopic, handler: EventHandler) -> Subscription {
        self.events.subscribe(topic, handler)
    }

    async fn check_model_available(&self, model_filename: &str) -> UpscaleResult<bool> {
        Ok(self.available_models.lock().contains(model_filename))
    }

    async fn download_model(&self, model_filename: &str) -> UpscaleResult<PathBuf> {
        if !self.downloadable_models.lock().contains(model_filename) {
            return Err(UpscaleError::model(format!("{} unavailable", model_filename)));
        }
        self.emit_download(model_filename, 50);
        tokio::task::yield_now().await;
        self.emit_download(model_filename, 100);
        self.available_models.lock().insert(model_filename.to_string());
        Ok(PathBuf::from("/models").join(model_filename))
    }
}
