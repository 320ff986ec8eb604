//! Feeding user selections into the store.

mod scheduler;

pub use scheduler::{IngestReport, IngestScheduler};
