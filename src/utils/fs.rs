use std::path::{Path, PathBuf};

/// Final path segment used as an item's display name.
pub fn display_name(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "image".to_string())
}

/// Directory results go to when no explicit output directory is set.
///
/// Falls back to `"."` for bare file names.
pub fn parent_dir(path: impl AsRef<Path>) -> PathBuf {
    match path.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Get file extension as lowercase string, `png` when there is none
pub fn output_extension(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "png".to_string())
}

/// Output path for an upscaled image: `{stem}_x{scale}.{ext}` inside `output_dir`.
///
/// Without `overwrite`, an existing file is never replaced; `{stem}_x{scale} (n).{ext}`
/// is used with the first free `n`.
pub fn upscaled_output_path(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    target_scale: f64,
    overwrite: bool,
) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let ext = output_extension(input);
    let base = format!("{}_x{}", stem, format_scale(target_scale));

    let candidate = output_dir.as_ref().join(format!("{base}.{ext}"));
    if overwrite || !candidate.exists() {
        return candidate;
    }

    (1..)
        .map(|n| output_dir.as_ref().join(format!("{base} ({n}).{ext}")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

fn format_scale(scale: f64) -> String {
    if scale.fract() == 0.0 {
        format!("{}", scale as i64)
    } else {
        format!("{}", scale)
    }
}
