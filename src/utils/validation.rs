use std::path::Path;
use crate::core::ProcessingOptions;
use crate::processing::{Model, get_model_by_id};
use crate::utils::{UpscaleResult, ValidationError};

/// Validates a run request before anything is touched.
pub fn validate_run_request(
    model_id: &str,
    target_scale: f64,
    options: &ProcessingOptions,
) -> UpscaleResult<&'static Model> {
    let model = validate_model_id(model_id)?;
    validate_scale(target_scale)?;
    if let Some(dir) = &options.output_dir {
        validate_output_dir(dir)?;
    }
    Ok(model)
}

/// Resolves a catalog model id
pub fn validate_model_id(model_id: &str) -> UpscaleResult<&'static Model> {
    get_model_by_id(model_id)
        .ok_or_else(|| ValidationError::UnknownModel(model_id.to_string()).into())
}

/// Largest accepted target scale factor.
pub const MAX_TARGET_SCALE: f64 = 16.0;

/// Target scale must lie in `1..=MAX_TARGET_SCALE`
pub fn validate_scale(target_scale: f64) -> UpscaleResult<()> {
    if !(1.0..=MAX_TARGET_SCALE).contains(&target_scale) {
        return Err(ValidationError::scale(format!(
            "{}. Must be between 1 and {}",
            target_scale, MAX_TARGET_SCALE
        ))
        .into());
    }
    Ok(())
}

/// An explicit output directory may be missing (it is created) but not a file
pub fn validate_output_dir(dir: &Path) -> UpscaleResult<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(ValidationError::not_a_directory(dir).into());
    }
    Ok(())
}
