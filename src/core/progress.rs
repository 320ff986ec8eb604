use serde::{Deserialize, Serialize};
use crate::core::ItemId;

/// Named event streams the backend publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTopic {
    /// Per-item transform progress
    ProcessingProgress,
    /// Model asset download progress
    ModelDownloadProgress,
}

impl EventTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProcessingProgress => "processing_progress",
            Self::ModelDownloadProgress => "model_download_progress",
        }
    }
}

/// Progress of the transform currently running for one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemProgress {
    pub item_id: ItemId,
    /// Progress percentage (0-100)
    pub progress: u8,
}

/// Progress of a model file download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDownloadProgress {
    pub model_filename: String,
    /// Percentage when the total size is known
    #[serde(default)]
    pub progress: Option<u8>,
    pub downloaded: u64,
    #[serde(default)]
    pub total: Option<u64>,
}

impl ModelDownloadProgress {
    pub fn is_finished(&self) -> bool {
        self.progress.is_some_and(|p| p >= 100)
    }
}

/// Any event published by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum BackendEvent {
    ProcessingProgress(ItemProgress),
    ModelDownloadProgress(ModelDownloadProgress),
}

impl BackendEvent {
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ProcessingProgress(_) => EventTopic::ProcessingProgress,
            Self::ModelDownloadProgress(_) => EventTopic::ModelDownloadProgress,
        }
    }
}
