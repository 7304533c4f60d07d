//! Story composition worker binary.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reel_worker::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive(
        "reel=info"
            .parse()
            .context("invalid default log directive")?,
    );

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting reel-worker");

    let config = WorkerConfig::from_env().context("failed to load worker configuration")?;
    info!("Worker config: {:?}", config);

    let manifest = reel_worker::run(&config)
        .await
        .with_context(|| format!("failed to compose {}", config.story_dir.display()))?;

    info!(
        video = %manifest.video_path.display(),
        subtitles = %manifest.subtitle_path.display(),
        manifest = %manifest.sidecar_path().display(),
        "Worker finished"
    );

    Ok(())
}
