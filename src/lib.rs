// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod store;
pub mod preview;
pub mod backend;
pub mod ingest;
pub mod processing;
pub mod commands;

#[cfg(test)]
mod test_helpers;

// Public exports for external consumers
pub use crate::backend::{Backend, EventBus, LocalBackend, Subscription};
pub use crate::core::{AppConfig, AppState, BatchState, DroppedFile, Item, ItemId, ItemStatus, ProcessingOptions};
pub use crate::ingest::IngestReport;
pub use crate::preview::MemoryPreviews;
pub use crate::processing::{MODELS, Model, ModelStatus, RunSummary};
pub use crate::store::{Action, ItemStore};
pub use crate::utils::{UpscaleError, UpscaleResult};

// This library file is the public API; the command-line entry point is in main.rs.
