//! Command handlers forming the queue's public surface.
//!
//! - [`add_paths`], [`add_files`], [`remove_item`], [`clear_all`]: editing the batch
//! - [`snapshot`], [`subscribe`]: reading it
//! - [`start_run`], [`stop_run`]: processing it
//! - [`check_models`], [`download_model`]: model assets

mod queue;
mod run;

pub use queue::*;
pub use run::*;
