// Command-line entry point. Queue logic lives in the library crate.

use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use upscale_queue_lib::commands::{add_paths, check_models, snapshot, start_run, stop_run};
use upscale_queue_lib::core::OutputMode;
use upscale_queue_lib::{AppConfig, AppState, LocalBackend, MODELS, MemoryPreviews};

#[derive(Debug, Parser)]
#[command(name = "upscale-queue", version, about = "Queue images and folders, then upscale them one by one")]
struct Cli {
    /// Image files and directories to queue
    #[arg(required_unless_present = "list_models")]
    inputs: Vec<PathBuf>,

    /// Model id from the catalog
    #[arg(short, long, default_value = "real-esrgan-x4")]
    model: String,

    /// Target scale factor, 1 to 16
    #[arg(short, long, default_value_t = 4.0)]
    scale: f64,

    /// Write results here instead of next to each source
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Replace existing outputs instead of numbering new ones
    #[arg(long)]
    overwrite: bool,

    /// Settings file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding model weight files
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Paths dispatched per ingestion chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Print the final batch as JSON
    #[arg(long)]
    json: bool,

    /// List catalog models and whether they are installed, then exit
    #[arg(long)]
    list_models: bool,
}

impl Cli {
    fn config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        if let Some(dir) = &self.output_dir {
            config.output.mode = OutputMode::Custom;
            config.output.dir = Some(dir.clone());
        }
        if self.overwrite {
            config.output.overwrite = true;
        }
        if let Some(dir) = &self.models_dir {
            config.models_dir = Some(dir.clone());
        }
        if let Some(size) = self.chunk_size {
            config.ingest.chunk_size = size;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = cli.config().context("invalid settings")?;

    let backend = Arc::new(LocalBackend::new(config.models_dir.clone()));
    let state = AppState::new(backend, Arc::new(MemoryPreviews::new()), config);

    if cli.list_models {
        let statuses = check_models(&state).await;
        for model in MODELS {
            let installed = statuses.get(model.id).is_some_and(|s| s.available);
            println!(
                "{:<22} x{:<3} {:<32} {}",
                model.id,
                model.base_scale,
                model.file_name,
                if installed { "installed" } else { "missing" }
            );
        }
        return Ok(());
    }

    let report = add_paths(&state, cli.inputs.clone()).await;
    for source in &report.skipped_sources {
        warn!("Could not import {}", source.display());
    }
    for source in &report.empty_sources {
        warn!("No supported images in {}", source.display());
    }
    if report.added == 0 {
        warn!("Nothing to upscale");
        return Ok(());
    }
    info!("{} images queued", report.added);

    let stopper = state.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, finishing the current image");
            stop_run(&stopper);
        }
    });

    let summary = start_run(&state, &cli.model, cli.scale, None).await?;

    let batch = snapshot(&state);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&*batch)?);
    } else {
        for item in &batch.items {
            match &item.result {
                Some(path) => println!("{:<10} {} -> {}", "complete", item.display_name, path.display()),
                None => println!("{:<10} {}", format!("{:?}", item.status).to_lowercase(), item.display_name),
            }
        }
    }

    if summary.cancelled {
        info!("Stopped early; {} images left untouched", summary.skipped);
    }
    if summary.failed > 0 {
        anyhow::bail!("{} of {} images failed", summary.failed, summary.total);
    }
    Ok(())
}
