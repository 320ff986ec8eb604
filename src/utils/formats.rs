use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use crate::utils::UpscaleError;

/// Image formats the queue accepts from local (drag and drop) sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    JPEG,
    PNG,
    WebP,
    TIFF,
    BMP,
    GIF,
}

impl FromStr for ImageFormat {
    type Err = UpscaleError;

    fn from_str(ext: &str) -> Result<Self, Self::Err> {
        let ext = ext.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Ok(Self::JPEG),
            "png" => Ok(Self::PNG),
            "webp" => Ok(Self::WebP),
            "tif" | "tiff" => Ok(Self::TIFF),
            "bmp" => Ok(Self::BMP),
            "gif" => Ok(Self::GIF),
            _ => Err(UpscaleError::format(format!(
                "Unsupported image format: {}", ext
            ))),
        }
    }
}

/// Get format from file extension
pub fn format_from_extension(path: &str) -> Result<ImageFormat, UpscaleError> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| UpscaleError::format(
            format!("File has no extension: {}", path)
        ))?;

    ImageFormat::from_str(ext)
}

/// Local image check for in-memory files that never reach the backend.
///
/// Any `image/*` MIME type is accepted; without one the file name's extension decides.
pub fn is_image_file(name: &str, mime: Option<&str>) -> bool {
    match mime.map(str::trim).filter(|m| !m.is_empty()) {
        Some(mime) => mime.to_lowercase().starts_with("image/"),
        None => format_from_extension(name).is_ok(),
    }
}
