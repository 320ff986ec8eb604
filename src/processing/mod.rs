//! Running batches through the backend.
//!
//! - [`JobOrchestrator`]: sequential run loop with cooperative stop
//! - [`ModelAvailability`]: installed/downloading state of catalog models
//! - [`MODELS`]: the selectable model catalog

mod availability;
mod models;
mod orchestrator;

pub use availability::{ModelAvailability, ModelStatus};
pub use models::{MODELS, Model, Scene, get_model_by_file_name, get_model_by_id};
pub use orchestrator::{JobOrchestrator, RunSummary};
