//! Lifecycle of previews materialized from in-memory files.
//!
//! Path-backed items render straight from disk and need no bookkeeping; dropped
//! files get a handle from a [`PreviewAllocator`] that [`PreviewLifecycle`] frees
//! once no snapshot shows it any more.

mod cache;
mod lifecycle;

pub use cache::MemoryPreviews;
pub use lifecycle::{PreviewAllocator, PreviewLifecycle};
