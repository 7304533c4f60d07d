//! Story composition worker.
//!
//! This crate provides:
//! - Environment configuration for one composition run
//! - Structured run logging
//! - The run entry point used by the binary

pub mod config;
pub mod error;
pub mod logging;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::RunLogger;

use reel_media::{check_ffmpeg, run_rng, Composer};
use reel_models::OutputManifest;

/// Compose the configured story once.
pub async fn run(config: &WorkerConfig) -> WorkerResult<OutputManifest> {
    let logger = RunLogger::new(uuid::Uuid::new_v4().to_string(), "compose");
    logger.log_start(&format!("story {}", config.story_dir.display()));

    match compose(config, &logger).await {
        Ok(manifest) => {
            logger.log_completion(&format!(
                "{} ({:.1}s, {} pages, {} cues)",
                manifest.video_path.display(),
                manifest.duration_secs,
                manifest.pages,
                manifest.cues
            ));
            Ok(manifest)
        }
        Err(e) => {
            if e.is_retryable() {
                logger.log_warning(&format!("{} (retryable)", e));
            } else {
                logger.log_error(&e.to_string());
            }
            Err(e)
        }
    }
}

async fn compose(config: &WorkerConfig, logger: &RunLogger) -> WorkerResult<OutputManifest> {
    let composer = Composer::new(config.load_compose_config()?)?;
    let request = config.request();

    check_ffmpeg()?;
    let plan = composer.prepare(&request.story_dir, &mut run_rng(request.seed))?;
    let duration = plan.timeline.video_duration();
    logger.log_progress(&format!(
        "{} pages, {} cues, {:.1}s",
        plan.assets.pages.len(),
        plan.cues.len(),
        duration
    ));

    let manifest = composer
        .render_plan(&plan, &request, logger.progress_callback(duration))
        .await?;
    Ok(manifest)
}
