//! Command handlers for processing runs and model assets.

use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};
use crate::core::{AppState, ProcessingOptions};
use crate::processing::{ModelStatus, RunSummary};
use crate::utils::{UpscaleResult, validate_model_id, validate_run_request};

/// Upscales every queued item with one model.
///
/// # Arguments
/// * `state` - Application state owning the batch
/// * `model_id` - Catalog id, e.g. `real-esrgan-x4`
/// * `target_scale` - Output scale factor, 1 to 16
/// * `options` - Destination and overwrite policy; the configured output settings when `None`
///
/// # Returns
/// Per-run counts. Item failures are recorded on the items, not returned as errors.
///
/// # Errors
/// Unknown model, invalid scale or output directory, or a run already active.
pub async fn start_run(
    state: &AppState,
    model_id: &str,
    target_scale: f64,
    options: Option<ProcessingOptions>,
) -> UpscaleResult<RunSummary> {
    let options = options.unwrap_or_else(|| state.config().output.processing_options());
    let model = validate_run_request(model_id, target_scale, &options)?;
    debug!("Received start_run command: {} x{}", model.id, target_scale);

    let summary = state.orchestrator().start_run(model, target_scale, &options).await?;
    info!(
        "Run summary: {}/{} completed, {} failed",
        summary.completed, summary.total, summary.failed
    );
    Ok(summary)
}

/// Stops the active run once its in-flight item settles.
pub fn stop_run(state: &AppState) {
    state.orchestrator().stop_run();
}

/// Re-checks which catalog models are installed.
pub async fn check_models(state: &AppState) -> HashMap<&'static str, ModelStatus> {
    state.models().refresh().await
}

pub async fn download_model(state: &AppState, model_id: &str) -> UpscaleResult<PathBuf> {
    let model = validate_model_id(model_id)?;
    state.models().download(model).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::commands::{add_paths, snapshot};
    use crate::core::{AppConfig, ItemStatus, OutputMode, OutputSettings};
    use crate::preview::MemoryPreviews;
    use crate::test_helpers::FakeBackend;
    use crate::utils::{UpscaleError, ValidationError};

    fn app(config: AppConfig) -> (Arc<FakeBackend>, AppState) {
        let fake = FakeBackend::new();
        let state = AppState::new(fake.clone(), Arc::new(MemoryPreviews::new()), config);
        (fake, state)
    }

    #[tokio::test]
    async fn scenario_with_one_failing_item() {
        let (fake, state) = app(AppConfig::default());
        fake.add_images(["/in/A.png", "/in/B.png", "/in/C.png"]);
        fake.fail_on("/in/B.png");
        add_paths(&state, vec!["/in/A.png".into(), "/in/B.png".into(), "/in/C.png".into()]).await;

        let summary = start_run(&state, "real-esrgan-x4", 4.0, None).await.unwrap();

        let batch = snapshot(&state);
        let statuses: Vec<(String, ItemStatus)> = batch
            .items
            .iter()
            .map(|i| (i.display_name.clone(), i.status))
            .collect();
        assert_eq!(statuses, vec![
            ("A.png".to_string(), ItemStatus::Complete),
            ("B.png".to_string(), ItemStatus::Error),
            ("C.png".to_string(), ItemStatus::Complete),
        ]);
        assert!(!batch.running);
        assert_eq!(summary.completed, 2);
    }

    #[tokio::test]
    async fn invalid_requests_touch_nothing() {
        let (fake, state) = app(AppConfig::default());
        fake.add_images(["/in/a.png"]);
        add_paths(&state, vec!["/in/a.png".into()]).await;
        let before = snapshot(&state);

        let unknown = start_run(&state, "waifu2x", 2.0, None).await;
        assert!(matches!(
            unknown,
            Err(UpscaleError::Validation(ValidationError::UnknownModel(_)))
        ));
        let tiny = start_run(&state, "real-esrgan-x4", 0.5, None).await;
        assert!(matches!(tiny, Err(UpscaleError::Validation(ValidationError::Scale(_)))));
        let huge = start_run(&state, "real-esrgan-x4", 1e9, None).await;
        assert!(matches!(huge, Err(UpscaleError::Validation(ValidationError::Scale(_)))));

        assert!(Arc::ptr_eq(&before, &snapshot(&state)));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn configured_output_dir_is_the_default() {
        let config = AppConfig {
            output: OutputSettings {
                mode: OutputMode::Custom,
                dir: Some("/exports".into()),
                overwrite: false,
            },
            ..AppConfig::default()
        };
        let (fake, state) = app(config);
        fake.add_images(["/in/a.png"]);
        add_paths(&state, vec!["/in/a.png".into()]).await;

        start_run(&state, "real-esrgan-x4", 2.0, None).await.unwrap();
        assert_eq!(snapshot(&state).items[0].result, Some(PathBuf::from("/exports/a_x2.png")));

        let explicit = ProcessingOptions { output_dir: None, overwrite: false };
        start_run(&state, "real-esrgan-x4", 2.0, Some(explicit)).await.unwrap();
        assert_eq!(snapshot(&state).items[0].result, Some(PathBuf::from("/in/a_x2.png")));
    }

    #[tokio::test]
    async fn stop_without_run_is_harmless() {
        let (fake, state) = app(AppConfig::default());
        stop_run(&state);
        assert_eq!(fake.cancel_count(), 1);
        assert!(!snapshot(&state).running);
    }

    #[tokio::test]
    async fn model_commands_go_through_availability() {
        let (fake, state) = app(AppConfig::default());
        fake.with_model("realesrgan_x4plus.onnx");
        fake.downloadable("realesrgan_x4plus_anime.onnx");

        let statuses = check_models(&state).await;
        assert!(statuses["real-esrgan-x4"].available);
        assert!(!statuses["real-esrgan-anime-x4"].available);

        download_model(&state, "real-esrgan-anime-x4").await.unwrap();
        assert!(state.models().is_available("real-esrgan-anime-x4"));
        assert!(download_model(&state, "waifu2x").await.is_err());
    }
}
