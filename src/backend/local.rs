use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use async_trait::async_trait;
use image::imageops::FilterType;
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;
use crate::core::{BackendEvent, EventTopic, ItemId, ItemProgress, ModelDownloadProgress, TransformRequest};
use crate::utils::{PathError, UpscaleError, UpscaleResult, upscaled_output_path};
use super::{Backend, EventBus, EventHandler, Subscription};

/// Bytes read from the head of a file to sniff its type.
const SNIFF_LEN: u64 = 16 * 1024;

/// Largest output the resampler will allocate, in pixels.
const MAX_OUTPUT_PIXELS: u64 = 1 << 28;

/// Filesystem backend.
///
/// Classification sniffs magic bytes, expansion walks directories, and transforms
/// resample with Lanczos3 on the blocking pool. Model weights are looked up in
/// `models_dir`; nothing is ever fetched over the network.
pub struct LocalBackend {
    models_dir: Option<PathBuf>,
    events: EventBus,
    cancelled: Arc<AtomicBool>,
}

impl LocalBackend {
    pub fn new(models_dir: Option<PathBuf>) -> Self {
        Self {
            models_dir,
            events: EventBus::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    fn model_path(&self, model_filename: &str) -> Option<PathBuf> {
        self.models_dir.as_ref().map(|dir| dir.join(model_filename))
    }

    fn emit_progress(&self, item_id: ItemId, progress: u8) {
        self.events
            .emit(BackendEvent::ProcessingProgress(ItemProgress { item_id, progress }));
    }

    fn ensure_not_cancelled(&self, item_id: ItemId) -> UpscaleResult<()> {
        if self.cancelled.load(Ordering::SeqCst) {
            debug!("Transform of {} abandoned after cancel", item_id);
            return Err(UpscaleError::transform("Transform cancelled"));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn classify(&self, path: &Path) -> UpscaleResult<bool> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || -> UpscaleResult<bool> {
            let metadata = std::fs::metadata(&path).map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => PathError::NotFound(path.clone()),
                _ => PathError::from(e),
            })?;
            if !metadata.is_file() {
                return Ok(false);
            }
            Ok(sniff_image(&path)?)
        })
        .await
        .map_err(|e| UpscaleError::backend(format!("Classification task failed: {}", e)))?
    }

    async fn expand_directory(&self, root: &Path) -> UpscaleResult<Vec<PathBuf>> {
        let root = root.to_path_buf();
        let images = tokio::task::spawn_blocking(move || -> UpscaleResult<Vec<PathBuf>> {
            // Surface an unlistable root instead of quietly yielding nothing
            std::fs::read_dir(&root).map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => PathError::NotFound(root.clone()),
                _ if !root.is_dir() => PathError::NotDirectory(root.clone()),
                _ => PathError::from(e),
            })?;

            let mut images = Vec::new();
            for entry in WalkDir::new(&root).follow_links(false).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                match sniff_image(entry.path()) {
                    Ok(true) => images.push(entry.into_path()),
                    Ok(false) => trace!("Not an image: {}", entry.path().display()),
                    Err(e) => warn!("Could not read {}: {}", entry.path().display(), e),
                }
            }
            Ok(images)
        })
        .await
        .map_err(|e| UpscaleError::backend(format!("Directory scan failed: {}", e)))??;

        debug!("Found {} images", images.len());
        Ok(images)
    }

    async fn transform(&self, request: &TransformRequest) -> UpscaleResult<Option<PathBuf>> {
        let id = request.item_id;
        self.cancelled.store(false, Ordering::SeqCst);
        debug!(
            "Upscaling {} with {} (base x{}, target x{})",
            request.input_path.display(),
            request.model_filename,
            request.base_scale,
            request.target_scale
        );

        self.emit_progress(id, 0);
        self.ensure_not_cancelled(id)?;

        let input = request.input_path.clone();
        let decoded = tokio::task::spawn_blocking(move || image::open(&input))
            .await
            .map_err(|e| UpscaleError::backend(format!("Decode task failed: {}", e)))??;
        self.emit_progress(id, 30);
        self.ensure_not_cancelled(id)?;

        let (width, height) =
            scaled_dimensions(decoded.width(), decoded.height(), request.target_scale)?;
        let resized = tokio::task::spawn_blocking(move || {
            decoded.resize_exact(width, height, FilterType::Lanczos3)
        })
        .await
        .map_err(|e| UpscaleError::backend(format!("Resize task failed: {}", e)))?;
        self.emit_progress(id, 80);
        self.ensure_not_cancelled(id)?;

        tokio::fs::create_dir_all(&request.output_dir).await?;
        let output = upscaled_output_path(
            &request.input_path,
            &request.output_dir,
            request.target_scale,
            request.overwrite,
        );
        let target = output.clone();
        tokio::task::spawn_blocking(move || resized.save(&target))
            .await
            .map_err(|e| UpscaleError::backend(format!("Encode task failed: {}", e)))??;

        self.emit_progress(id, 100);
        info!("Wrote {} ({}x{})", output.display(), width, height);
        Ok(Some(output))
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn subscribe(&self, topic: EventTopic, handler: EventHandler) -> Subscription {
        self.events.subscribe(topic, handler)
    }

    async fn check_model_available(&self, model_filename: &str) -> UpscaleResult<bool> {
        match self.model_path(model_filename) {
            Some(path) => Ok(tokio::fs::try_exists(&path).await?),
            None => Ok(false),
        }
    }

    async fn download_model(&self, model_filename: &str) -> UpscaleResult<PathBuf> {
        let path = self
            .model_path(model_filename)
            .ok_or_else(|| UpscaleError::model("No models directory configured"))?;

        if !tokio::fs::try_exists(&path).await? {
            return Err(UpscaleError::model(format!(
                "{} is not present in {} and cannot be downloaded by the local backend",
                model_filename,
                parent_display(&path)
            )));
        }

        let size = tokio::fs::metadata(&path).await?.len();
        self.events
            .emit(BackendEvent::ModelDownloadProgress(ModelDownloadProgress {
                model_filename: model_filename.to_string(),
                progress: Some(100),
                downloaded: size,
                total: Some(size),
            }));
        Ok(path)
    }
}

/// Output size for `scale`, refusing anything the resampler could not allocate.
fn scaled_dimensions(width: u32, height: u32, scale: f64) -> UpscaleResult<(u32, u32)> {
    let scale_side = |side: u32| -> Option<u32> {
        let scaled = (side as f64 * scale).round();
        (scaled.is_finite() && scaled <= u32::MAX as f64).then_some(scaled.max(1.0) as u32)
    };
    let too_large = || {
        UpscaleError::transform(format!(
            "{}x{} at x{} exceeds the {} pixel output limit",
            width, height, scale, MAX_OUTPUT_PIXELS
        ))
    };

    let (w, h) = match (scale_side(width), scale_side(height)) {
        (Some(w), Some(h)) => (w, h),
        _ => return Err(too_large()),
    };
    match (w as u64).checked_mul(h as u64) {
        Some(pixels) if pixels <= MAX_OUTPUT_PIXELS => Ok((w, h)),
        _ => Err(too_large()),
    }
}

/// Whether the file's leading bytes identify an image.
fn sniff_image(path: &Path) -> std::io::Result<bool> {
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut head)?;
    Ok(infer::get(&head).is_some_and(|kind| kind.mime_type().starts_with("image/")))
}

fn parent_display(path: &Path) -> String {
    path.parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tempfile::TempDir;

    fn write_png(path: &Path, width: u32, height: u32) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 90]))
            .save(path)
            .unwrap();
    }

    fn request(input: &Path, output_dir: &Path, target_scale: f64) -> TransformRequest {
        TransformRequest {
            item_id: ItemId::new(),
            input_path: input.to_path_buf(),
            model_filename: "realesrgan_x4plus.onnx".into(),
            base_scale: 4.0,
            target_scale,
            output_dir: output_dir.to_path_buf(),
            overwrite: false,
        }
    }

    #[tokio::test]
    async fn classifies_by_content_not_extension() {
        let dir = TempDir::new().unwrap();
        let png = dir.path().join("photo.png");
        write_png(&png, 2, 2);
        let disguised = dir.path().join("notes.png");
        std::fs::write(&disguised, b"just some text").unwrap();
        let renamed = dir.path().join("picture.dat");
        std::fs::copy(&png, &renamed).unwrap();

        let backend = LocalBackend::new(None);
        assert!(backend.classify(&png).await.unwrap());
        assert!(!backend.classify(&disguised).await.unwrap());
        assert!(backend.classify(&renamed).await.unwrap());
        assert!(!backend.classify(dir.path()).await.unwrap());
        assert!(backend.classify(&dir.path().join("missing.png")).await.is_err());
    }

    #[tokio::test]
    async fn expands_nested_directories_to_images_only() {
        let dir = TempDir::new().unwrap();
        write_png(&dir.path().join("a.png"), 1, 1);
        write_png(&dir.path().join("nested/deeper/b.png"), 1, 1);
        std::fs::write(dir.path().join("nested/readme.txt"), b"hi").unwrap();

        let backend = LocalBackend::new(None);
        let found = backend.expand_directory(dir.path()).await.unwrap();
        assert_eq!(found, vec![
            dir.path().join("a.png"),
            dir.path().join("nested/deeper/b.png"),
        ]);
    }

    #[tokio::test]
    async fn unlistable_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let backend = LocalBackend::new(None);
        assert!(backend.expand_directory(&dir.path().join("gone")).await.is_err());

        let file = dir.path().join("a.png");
        write_png(&file, 1, 1);
        assert!(backend.expand_directory(&file).await.is_err());
    }

    #[tokio::test]
    async fn transform_scales_and_reports_progress() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in/a.png");
        write_png(&input, 4, 3);
        let out_dir = dir.path().join("out");

        let backend = LocalBackend::new(None);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = backend.subscribe(
            EventTopic::ProcessingProgress,
            Arc::new(move |event: &BackendEvent| {
                if let BackendEvent::ProcessingProgress(p) = event {
                    sink.lock().push(p.progress);
                }
            }),
        );

        let req = request(&input, &out_dir, 2.0);
        let output = backend.transform(&req).await.unwrap().unwrap();
        assert_eq!(output, out_dir.join("a_x2.png"));
        let written = image::open(&output).unwrap();
        assert_eq!((written.width(), written.height()), (8, 6));
        assert_eq!(*seen.lock(), vec![0, 30, 80, 100]);

        // A second run never clobbers the first output
        let again = backend.transform(&req).await.unwrap().unwrap();
        assert_eq!(again, out_dir.join("a_x2 (1).png"));
    }

    #[tokio::test]
    async fn cancel_stops_between_stages() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("a.png");
        write_png(&input, 2, 2);

        let backend = Arc::new(LocalBackend::new(None));
        let canceller = Arc::clone(&backend);
        let sub = backend.subscribe(
            EventTopic::ProcessingProgress,
            Arc::new(move |event: &BackendEvent| {
                if matches!(event, BackendEvent::ProcessingProgress(p) if p.progress == 30) {
                    canceller.cancel();
                }
            }),
        );

        let result = backend.transform(&request(&input, dir.path(), 2.0)).await;
        drop(sub);
        assert!(result.is_err());
        assert!(!dir.path().join("a_x2.png").exists());
    }

    #[test]
    fn output_size_is_bounded() {
        assert_eq!(scaled_dimensions(4, 3, 2.0).unwrap(), (8, 6));
        assert_eq!(scaled_dimensions(3, 3, 1.5).unwrap(), (5, 5));
        assert_eq!(scaled_dimensions(1024, 1024, 16.0).unwrap(), (16384, 16384));
        assert!(scaled_dimensions(4096, 4096, 16.0).is_err());
        assert!(scaled_dimensions(2, 2, 1e9).is_err());
        assert!(scaled_dimensions(2, 2, f64::INFINITY).is_err());
        assert!(scaled_dimensions(2, 2, f64::NAN).is_err());
    }

    #[tokio::test]
    async fn oversized_transform_fails_instead_of_allocating() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("a.png");
        write_png(&input, 2, 2);

        let backend = LocalBackend::new(None);
        let result = backend.transform(&request(&input, dir.path(), 1e9)).await;

        assert!(matches!(result, Err(UpscaleError::Transform(_))));
        assert!(!dir.path().join("a_x1000000000.png").exists());
    }

    #[tokio::test]
    async fn models_are_looked_up_in_models_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("realesrgan_x4plus.onnx"), b"weights").unwrap();
        let backend = LocalBackend::new(Some(dir.path().to_path_buf()));

        assert!(backend.check_model_available("realesrgan_x4plus.onnx").await.unwrap());
        assert!(!backend.check_model_available("realesrgan_x4plus_anime.onnx").await.unwrap());
        assert!(backend.download_model("realesrgan_x4plus.onnx").await.is_ok());
        assert!(matches!(
            backend.download_model("realesrgan_x4plus_anime.onnx").await,
            Err(UpscaleError::Model(_))
        ));

        let bare = LocalBackend::new(None);
        assert!(!bare.check_model_available("realesrgan_x4plus.onnx").await.unwrap());
    }
}
