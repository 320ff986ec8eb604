//! Transform task definition and creation.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::core::{Item, ItemId};
use crate::processing::Model;
use crate::utils::{UpscaleResult, ValidationError, parent_dir};

/// Caller-supplied options for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOptions {
    /// Explicit destination; the source's parent directory when absent
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Replace existing outputs instead of picking a fresh name
    #[serde(default)]
    pub overwrite: bool,
}

impl ProcessingOptions {
    /// Output directory for one input: explicit override, else the input's parent.
    pub fn resolve_output_dir(&self, input_path: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) if !dir.as_os_str().is_empty() => dir.clone(),
            _ => parent_dir(input_path),
        }
    }
}

/// Represents a single backend transform call.
///
/// Contains everything the backend needs to upscale one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformRequest {
    /// Item the backend tags its progress events with
    pub item_id: ItemId,
    pub input_path: PathBuf,
    pub model_filename: String,
    /// Native scale factor of the model
    pub base_scale: f64,
    /// User-selected output scale
    pub target_scale: f64,
    pub output_dir: PathBuf,
    pub overwrite: bool,
}

impl TransformRequest {
    /// Builds the request for `item`.
    ///
    /// Fails when the item has no native path, i.e. it was added from memory.
    pub fn for_item(
        item: &Item,
        model: &Model,
        target_scale: f64,
        options: &ProcessingOptions,
    ) -> UpscaleResult<Self> {
        let input_path = item
            .source
            .path()
            .ok_or_else(|| ValidationError::UnresolvableSource(item.display_name.clone()))?;

        Ok(Self {
            item_id: item.id,
            input_path: input_path.to_path_buf(),
            model_filename: model.file_name.to_string(),
            base_scale: model.base_scale,
            target_scale,
            output_dir: options.resolve_output_dir(input_path),
            overwrite: options.overwrite,
        })
    }
}
