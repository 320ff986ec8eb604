//! Core application types and state management.
//!
//! This module contains the fundamental types used throughout the queue:
//! - [`AppState`]: owns and wires the store, scheduler and orchestrator
//! - [`Item`] and [`BatchState`]: the queued images and the batch around them
//! - [`TransformRequest`]: one backend upscale call
//! - [`BackendEvent`]: progress published by the backend
//! - [`AppConfig`]: persisted settings

mod config;
mod progress;
mod state;
mod task;
mod types;

pub use config::{AppConfig, DEFAULT_CHUNK_SIZE, IngestConfig, OutputMode, OutputSettings};
pub use progress::{BackendEvent, EventTopic, ItemProgress, ModelDownloadProgress};
pub use state::AppState;
pub use task::{ProcessingOptions, TransformRequest};
pub use types::{BatchState, DroppedFile, Item, ItemId, ItemStatus, PreviewHandle, PreviewRef, SourceRef};
