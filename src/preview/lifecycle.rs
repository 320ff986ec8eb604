use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use parking_lot::Mutex;
use tracing::{debug, warn};
use crate::core::{BatchState, DroppedFile, ItemId, PreviewHandle};

/// Creates and frees locally materialized preview resources.
pub trait PreviewAllocator: Send + Sync {
    fn create(&self, file: &DroppedFile) -> PreviewHandle;
    fn release(&self, handle: PreviewHandle);
}

/// Tracks every live memory preview by item id and releases each one exactly once.
///
/// Releases are derived from consecutive store snapshots: a handle referenced by the
/// previous snapshot but not by the next one is released. Handles are never reused,
/// so a handle can drop out of the state only once.
pub struct PreviewLifecycle {
    allocator: Arc<dyn PreviewAllocator>,
    live: Mutex<HashMap<PreviewHandle, ItemId>>,
}

impl PreviewLifecycle {
    pub fn new(allocator: Arc<dyn PreviewAllocator>) -> Self {
        Self {
            allocator,
            live: Mutex::new(HashMap::new()),
        }
    }

    /// Materializes a preview for the item `id` is about to be added under.
    pub fn allocate(&self, id: ItemId, file: &DroppedFile) -> PreviewHandle {
        let handle = self.allocator.create(file);
        if let Some(previous) = self.live.lock().insert(handle, id) {
            warn!("Allocator reused live preview {} (was item {})", handle, previous);
        }
        debug!("Preview {} allocated for item {}", handle, id);
        handle
    }

    /// Releases memory previews present in `previous` but gone from `next`.
    ///
    /// Returns the number of handles released.
    pub fn reconcile(&self, previous: &BatchState, next: &BatchState) -> usize {
        let still_shown: HashSet<PreviewHandle> = next
            .items
            .iter()
            .filter_map(|i| i.preview.memory_handle())
            .collect();

        let dropped: Vec<PreviewHandle> = previous
            .items
            .iter()
            .filter_map(|i| i.preview.memory_handle())
            .filter(|h| !still_shown.contains(h))
            .collect();

        dropped.into_iter().filter(|h| self.release(*h)).count()
    }

    /// Frees `handle` if it is still live. Returns whether a release happened.
    fn release(&self, handle: PreviewHandle) -> bool {
        let owner = self.live.lock().remove(&handle);
        match owner {
            Some(id) => {
                self.allocator.release(handle);
                debug!("Preview {} released (item {})", handle, id);
                true
            }
            None => false,
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }

    pub fn is_live(&self, handle: PreviewHandle) -> bool {
        self.live.lock().contains_key(&handle)
    }
}
