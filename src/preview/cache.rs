use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use parking_lot::RwLock;
use crate::core::{DroppedFile, PreviewHandle};
use super::PreviewAllocator;

/// In-process preview store: keeps the dropped bytes addressable by handle until
/// the item goes away.
#[derive(Default)]
pub struct MemoryPreviews {
    next: AtomicU64,
    entries: RwLock<HashMap<PreviewHandle, Arc<[u8]>>>,
}

impl MemoryPreviews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes behind `handle`, for rendering.
    pub fn get(&self, handle: PreviewHandle) -> Option<Arc<[u8]>> {
        self.entries.read().get(&handle).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl PreviewAllocator for MemoryPreviews {
    fn create(&self, file: &DroppedFile) -> PreviewHandle {
        let handle = PreviewHandle(self.next.fetch_add(1, Ordering::Relaxed) + 1);
        self.entries.write().insert(handle, Arc::clone(&file.bytes));
        handle
    }

    fn release(&self, handle: PreviewHandle) {
        self.entries.write().remove(&handle);
    }
}
