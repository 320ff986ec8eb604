//! Pure transition function for the batch state.
//!
//! `reduce` never mutates its input. When an action changes nothing (unknown id,
//! illegal transition, value already set) the very same `Arc` is handed back, so
//! callers can detect no-ops with `Arc::ptr_eq`.

use std::collections::HashSet;
use std::sync::Arc;
use crate::core::{BatchState, Item, ItemId, ItemStatus, PreviewRef, SourceRef};
use crate::utils::display_name;
use super::Action;

pub fn reduce(state: &Arc<BatchState>, action: &Action) -> Arc<BatchState> {
    match action {
        Action::AddPaths(new_items) => {
            let items = new_items.iter().map(|n| Item {
                id: n.id,
                source: SourceRef::Path { path: n.path.clone() },
                display_name: display_name(&n.path),
                preview: PreviewRef::File { path: n.path.clone() },
                status: ItemStatus::Ready,
                progress: 0,
                result: None,
            });
            append(state, items)
        }
        Action::AddFiles(new_items) => {
            let items = new_items.iter().map(|n| Item {
                id: n.id,
                source: SourceRef::Memory { file: Arc::clone(&n.file) },
                display_name: if n.file.name.is_empty() {
                    "image".to_string()
                } else {
                    n.file.name.clone()
                },
                preview: PreviewRef::Memory { handle: n.preview },
                status: ItemStatus::Ready,
                progress: 0,
                result: None,
            });
            append(state, items)
        }
        Action::Remove(id) => {
            // An item mid-transform stays until it settles
            match state.get(*id) {
                Some(item) if item.status != ItemStatus::Processing => {
                    let items = state.items.iter().filter(|i| i.id != *id).cloned().collect();
                    Arc::new(BatchState { items, running: state.running })
                }
                _ => Arc::clone(state),
            }
        }
        Action::Clear => {
            let items: Vec<Item> = state
                .items
                .iter()
                .filter(|i| i.status == ItemStatus::Processing)
                .cloned()
                .collect();
            if items.len() == state.items.len() {
                return Arc::clone(state);
            }
            Arc::new(BatchState { items, running: state.running })
        }
        Action::SetRunning(running) => {
            if state.running == *running {
                return Arc::clone(state);
            }
            Arc::new(BatchState { items: state.items.clone(), running: *running })
        }
        Action::SetStatus { id, status } => update_item(state, *id, |item| {
            if !item.status.can_transition_to(*status) {
                return None;
            }
            let mut next = item.clone();
            next.status = *status;
            if *status == ItemStatus::Processing {
                next.progress = 0;
            }
            Some(next)
        }),
        Action::SetProgress { id, progress } => update_item(state, *id, |item| {
            let progress = (*progress).min(100);
            if item.status != ItemStatus::Processing || item.progress == progress {
                return None;
            }
            let mut next = item.clone();
            next.progress = progress;
            Some(next)
        }),
        Action::SetResult { id, path } => update_item(state, *id, |item| {
            if item.status != ItemStatus::Processing {
                return None;
            }
            let mut next = item.clone();
            next.preview = PreviewRef::File { path: path.clone() };
            next.result = Some(path.clone());
            next.status = ItemStatus::Complete;
            Some(next)
        }),
        Action::ResetAll => {
            let needs_reset = |i: &Item| {
                i.status != ItemStatus::Ready || i.progress != 0 || i.result.is_some()
            };
            if !state.items.iter().any(needs_reset) {
                return Arc::clone(state);
            }
            let items = state
                .items
                .iter()
                .map(|i| {
                    if !needs_reset(i) {
                        return i.clone();
                    }
                    let mut next = i.clone();
                    if next.result.take().is_some() {
                        next.preview = i.source_preview();
                    }
                    next.status = ItemStatus::Ready;
                    next.progress = 0;
                    next
                })
                .collect();
            Arc::new(BatchState { items, running: state.running })
        }
    }
}

/// Appends items whose ids are not yet taken.
fn append(state: &Arc<BatchState>, new_items: impl Iterator<Item = Item>) -> Arc<BatchState> {
    let mut seen: HashSet<ItemId> = state.items.iter().map(|i| i.id).collect();
    let fresh: Vec<Item> = new_items.filter(|i| seen.insert(i.id)).collect();
    if fresh.is_empty() {
        return Arc::clone(state);
    }
    let mut items = Vec::with_capacity(state.items.len() + fresh.len());
    items.extend(state.items.iter().cloned());
    items.extend(fresh);
    Arc::new(BatchState { items, running: state.running })
}

/// Replaces the item with `id` when `f` returns a new version of it.
fn update_item<F>(state: &Arc<BatchState>, id: ItemId, f: F) -> Arc<BatchState>
where
    F: FnOnce(&Item) -> Option<Item>,
{
    let Some(index) = state.items.iter().position(|i| i.id == id) else {
        return Arc::clone(state);
    };
    let Some(updated) = f(&state.items[index]) else {
        return Arc::clone(state);
    };
    let mut items = state.items.clone();
    items[index] = updated;
    Arc::new(BatchState { items, running: state.running })
}
