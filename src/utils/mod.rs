pub mod error;
pub mod formats;
pub mod fs;
pub mod validation;

pub use error::{PathError, UpscaleError, UpscaleResult, ValidationError};
pub use formats::{ImageFormat, format_from_extension, is_image_file};
pub use fs::{display_name, parent_dir, upscaled_output_path};
pub use validation::{MAX_TARGET_SCALE, validate_model_id, validate_run_request, validate_scale};
