//! Boundary to the service doing the heavy lifting.
//!
//! The queue never classifies, scans or upscales images itself; it drives a
//! [`Backend`] through request/response calls and listens to its event streams.
//!
//! - [`Backend`]: the contract the orchestrator and ingestion scheduler are written against
//! - [`EventBus`]: callback registry backends publish progress through
//! - [`LocalBackend`]: filesystem implementation used by the CLI

mod events;
mod local;

pub use events::{EventBus, EventHandler, Subscription};
pub use local::LocalBackend;

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use crate::core::{EventTopic, TransformRequest};
use crate::utils::UpscaleResult;

#[async_trait]
pub trait Backend: Send + Sync {
    /// Whether `path` is an image the backend can transform.
    async fn classify(&self, path: &Path) -> UpscaleResult<bool>;

    /// Every image below `root`, recursively. May contain duplicates.
    async fn expand_directory(&self, root: &Path) -> UpscaleResult<Vec<PathBuf>>;

    /// Upscales one image. `Ok(None)` means no output was produced.
    async fn transform(&self, request: &TransformRequest) -> UpscaleResult<Option<PathBuf>>;

    /// Asks the backend to abandon in-flight work. Returns immediately.
    fn cancel(&self);

    fn subscribe(&self, topic: EventTopic, handler: EventHandler) -> Subscription;

    async fn check_model_available(&self, model_filename: &str) -> UpscaleResult<bool>;

    /// Fetches the model file, returning where it was stored.
    async fn download_model(&self, model_filename: &str) -> UpscaleResult<PathBuf>;
}
