//! Command handlers for editing and observing the batch.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;
use crate::core::{AppState, BatchState, DroppedFile, ItemId};
use crate::ingest::IngestReport;
use crate::store::Action;

/// Adds image files and the images inside directories.
///
/// # Arguments
/// * `state` - Application state owning the batch
/// * `paths` - Mixed file and directory paths from a picker or drop
///
/// # Returns
/// Counts of what was added and which sources were skipped or empty.
pub async fn add_paths(state: &AppState, paths: Vec<PathBuf>) -> IngestReport {
    debug!("Received add_paths command for {} inputs", paths.len());
    state.scheduler().add_paths(paths).await
}

/// Adds dropped in-memory files that look like images.
pub fn add_files(state: &AppState, files: Vec<DroppedFile>) -> IngestReport {
    debug!("Received add_files command for {} files", files.len());
    state.scheduler().add_files(files)
}

/// Removes one item. Unknown ids and items being processed are left alone.
pub fn remove_item(state: &AppState, id: ItemId) -> Arc<BatchState> {
    state.store().dispatch(Action::Remove(id))
}

/// Removes every item that is not currently being processed.
pub fn clear_all(state: &AppState) -> Arc<BatchState> {
    state.store().dispatch(Action::Clear)
}

pub fn snapshot(state: &AppState) -> Arc<BatchState> {
    state.store().snapshot()
}

/// Receiver woken after every change to the batch.
pub fn subscribe(state: &AppState) -> watch::Receiver<Arc<BatchState>> {
    state.store().subscribe()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AppConfig, ItemStatus};
    use crate::preview::MemoryPreviews;
    use crate::test_helpers::FakeBackend;

    fn app() -> (Arc<FakeBackend>, Arc<MemoryPreviews>, AppState) {
        let fake = FakeBackend::new();
        let previews = Arc::new(MemoryPreviews::new());
        let state = AppState::new(fake.clone(), previews.clone(), AppConfig::default());
        (fake, previews, state)
    }

    #[tokio::test]
    async fn edits_flow_through_the_store() {
        let (fake, previews, state) = app();
        fake.add_images(["/a.png", "/b.png"]);

        let report = add_paths(&state, vec!["/a.png".into(), "/b.png".into()]).await;
        assert_eq!(report.added, 2);
        add_files(&state, vec![DroppedFile::new("c.png", Some("image/png".into()), vec![1u8])]);
        assert_eq!(previews.len(), 1);

        let first = snapshot(&state).items[0].id;
        let after = remove_item(&state, first);
        assert_eq!(after.items.len(), 2);
        assert!(Arc::ptr_eq(&after, &remove_item(&state, first)));

        let cleared = clear_all(&state);
        assert!(cleared.is_empty());
        assert!(previews.is_empty());
        assert_eq!(state.previews().live_count(), 0);
    }

    #[tokio::test]
    async fn subscribers_observe_status_changes() {
        let (fake, _, state) = app();
        fake.add_images(["/a.png"]);
        let mut rx = subscribe(&state);

        add_paths(&state, vec!["/a.png".into()]).await;
        rx.changed().await.unwrap();
        let item = rx.borrow_and_update().items[0].clone();
        assert_eq!(item.status, ItemStatus::Ready);
        assert_eq!(item.display_name, "a.png");
    }
}
