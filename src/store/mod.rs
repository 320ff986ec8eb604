//! Authoritative item state for the batch.
//!
//! - [`ItemStore`]: cheap-to-clone handle owning the current [`BatchState`] snapshot
//! - [`Action`]: every mutation the store accepts
//! - [`reduce`]: the pure transition function behind [`ItemStore::dispatch`]

mod action;
mod reducer;

pub use action::{Action, NewFileItem, NewPathItem};
pub use reducer::reduce;

use std::sync::Arc;
use tokio::sync::watch;
use tracing::trace;
use crate::core::{BatchState, ItemId};
use crate::preview::PreviewLifecycle;

/// Shared handle to the batch state.
///
/// Each dispatch is reduced inside the watch channel's write lock, so readers only
/// ever observe complete snapshots. Memory previews that drop out of the state are
/// released after the snapshot without them has been published.
#[derive(Clone)]
pub struct ItemStore {
    sender: Arc<watch::Sender<Arc<BatchState>>>,
    previews: Option<Arc<PreviewLifecycle>>,
}

impl ItemStore {
    /// Creates an empty store without preview tracking.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Arc::new(BatchState::default()));
        Self {
            sender: Arc::new(sender),
            previews: None,
        }
    }

    /// Creates an empty store that releases previews through `previews`.
    pub fn with_previews(previews: Arc<PreviewLifecycle>) -> Self {
        Self {
            previews: Some(previews),
            ..Self::new()
        }
    }

    /// Applies `action` and returns the resulting snapshot.
    pub fn dispatch(&self, action: Action) -> Arc<BatchState> {
        let mut transition = None;
        self.sender.send_if_modified(|current| {
            let next = reduce(current, &action);
            if Arc::ptr_eq(&next, current) {
                return false;
            }
            let previous = std::mem::replace(current, Arc::clone(&next));
            transition = Some((previous, next));
            true
        });

        match transition {
            Some((previous, next)) => {
                trace!("{} applied ({} items)", action.name(), next.items.len());
                if let Some(previews) = &self.previews {
                    previews.reconcile(&previous, &next);
                }
                next
            }
            None => {
                trace!("{} left state unchanged", action.name());
                self.snapshot()
            }
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<BatchState> {
        self.sender.borrow().clone()
    }

    /// Receiver notified after every state-changing dispatch.
    pub fn subscribe(&self) -> watch::Receiver<Arc<BatchState>> {
        self.sender.subscribe()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.sender.borrow().contains(id)
    }

    pub fn is_running(&self) -> bool {
        self.sender.borrow().running
    }
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}
