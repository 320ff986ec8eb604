use std::path::PathBuf;
use std::sync::Arc;
use crate::core::{DroppedFile, ItemId, ItemStatus, PreviewHandle};

/// A path-backed item about to be appended.
#[derive(Debug, Clone)]
pub struct NewPathItem {
    pub id: ItemId,
    pub path: PathBuf,
}

impl NewPathItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            id: ItemId::new(),
            path: path.into(),
        }
    }
}

/// An in-memory item about to be appended, with its already allocated preview.
#[derive(Debug, Clone)]
pub struct NewFileItem {
    pub id: ItemId,
    pub file: Arc<DroppedFile>,
    pub preview: PreviewHandle,
}

/// Every mutation the store accepts.
#[derive(Debug, Clone)]
pub enum Action {
    AddPaths(Vec<NewPathItem>),
    AddFiles(Vec<NewFileItem>),
    Remove(ItemId),
    Clear,
    SetRunning(bool),
    SetStatus { id: ItemId, status: ItemStatus },
    SetProgress { id: ItemId, progress: u8 },
    /// Records the output path, switches the preview to it and completes the item
    SetResult { id: ItemId, path: PathBuf },
    /// Every item back to `Ready` with progress 0, ahead of a new run
    ResetAll,
}

impl Action {
    /// Assigns fresh ids to `paths`.
    pub fn add_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::AddPaths(paths.into_iter().map(NewPathItem::new).collect())
    }

    /// Short name used in trace output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddPaths(_) => "add_paths",
            Self::AddFiles(_) => "add_files",
            Self::Remove(_) => "remove",
            Self::Clear => "clear",
            Self::SetRunning(_) => "set_running",
            Self::SetStatus { .. } => "set_status",
            Self::SetProgress { .. } => "set_progress",
            Self::SetResult { .. } => "set_result",
            Self::ResetAll => "reset_all",
        }
    }
}
