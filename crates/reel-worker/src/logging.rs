//! Structured run logging.
//!
//! Every lifecycle message of a composition run carries the same `run_id`
//! and `operation` fields, so one run can be followed through JSON logs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reel_media::{FfmpegProgress, ProgressCallback};
use tracing::{error, info, warn};

/// Percentage step between encode progress messages.
const PROGRESS_STEP: u64 = 10;

/// Run logger with consistent contextual fields.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    operation: String,
}

impl RunLogger {
    pub fn new(run_id: impl Into<String>, operation: &str) -> Self {
        Self {
            run_id: run_id.into(),
            operation: operation.to_string(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn log_start(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            "Run started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            "Run progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            run_id = %self.run_id,
            operation = %self.operation,
            "Run warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            run_id = %self.run_id,
            operation = %self.operation,
            "Run error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            "Run completed: {}", message
        );
    }

    /// Encode progress callback that logs every 10%.
    pub fn progress_callback(&self, total_secs: f64) -> ProgressCallback {
        let logger = self.clone();
        let last_step = Arc::new(AtomicU64::new(0));

        Box::new(move |progress: FfmpegProgress| {
            let step = progress_step(&progress, total_secs);
            if step > last_step.fetch_max(step, Ordering::Relaxed) {
                logger.log_progress(&progress_message(&progress, step, total_secs));
            }
        })
    }
}

/// Completed 10% steps, 0 through 10.
fn progress_step(progress: &FfmpegProgress, total_secs: f64) -> u64 {
    (progress.percentage(total_secs) as u64) / PROGRESS_STEP
}

fn progress_message(progress: &FfmpegProgress, step: u64, total_secs: f64) -> String {
    match progress.eta_seconds(total_secs) {
        Some(eta) if !progress.is_complete => {
            format!("encoding {}%, ~{:.0}s left", step * PROGRESS_STEP, eta)
        }
        _ => format!("encoding {}%", step * PROGRESS_STEP),
    }
}
