//! Core types for queued items and the batch they belong to.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a queued item, stable for the item's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Processing state of a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Ready,
    Processing,
    Complete,
    Error,
}

impl ItemStatus {
    /// Whether a single-item status update may move an item from `self` to `next`.
    ///
    /// Terminal states only go back to `Ready` through the bulk reset at run start.
    pub fn can_transition_to(self, next: ItemStatus) -> bool {
        use ItemStatus::*;
        matches!(
            (self, next),
            (Ready, Processing) | (Ready, Error) | (Processing, Complete) | (Processing, Error)
        )
    }
}

/// An image handed over as bytes, e.g. dropped without a resolvable path.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedFile {
    pub name: String,
    pub mime: Option<String>,
    #[serde(skip)]
    pub bytes: Arc<[u8]>,
}

impl DroppedFile {
    pub fn new(name: impl Into<String>, mime: Option<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            mime,
            bytes: bytes.into(),
        }
    }
}

/// Where an item's pixels come from. Exactly one variant is present.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SourceRef {
    Path { path: PathBuf },
    Memory { file: Arc<DroppedFile> },
}

impl SourceRef {
    /// Native path the backend can read, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Path { path } => Some(path),
            Self::Memory { .. } => None,
        }
    }
}

/// Handle to a locally materialized preview resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviewHandle(pub u64);

impl fmt::Display for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:{}", self.0)
    }
}

/// Something a view can render for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PreviewRef {
    File { path: PathBuf },
    Memory { handle: PreviewHandle },
}

impl PreviewRef {
    pub fn memory_handle(&self) -> Option<PreviewHandle> {
        match self {
            Self::Memory { handle } => Some(*handle),
            Self::File { .. } => None,
        }
    }
}

/// One queued image and its processing state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub source: SourceRef,
    pub display_name: String,
    pub preview: PreviewRef,
    pub status: ItemStatus,
    /// 0-100, only meaningful while `Processing`
    pub progress: u8,
    /// Output path, present only when `Complete`
    pub result: Option<PathBuf>,
}

impl Item {
    /// Preview derived from the source alone, before any result exists.
    pub fn source_preview(&self) -> PreviewRef {
        match &self.source {
            SourceRef::Path { path } => PreviewRef::File { path: path.clone() },
            SourceRef::Memory { .. } => self.preview.clone(),
        }
    }
}

/// The ordered set of items plus the batch-level running flag.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchState {
    pub items: Vec<Item>,
    pub running: bool,
}

impl BatchState {
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
