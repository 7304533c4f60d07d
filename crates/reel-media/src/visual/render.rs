//! Page clip rendering and final assembly through FFmpeg.

use std::path::{Path, PathBuf};

use reel_models::{ComposeConfig, Page, PageSpan, Timeline, VisualEffect, VisualPlan};
use tracing::{debug, info};

use super::filters::{assembly_filter, page_clip_filter, CaptionStyle, VIDEO_OUT_LABEL};
use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::progress::FfmpegProgress;

/// Silent video clip for one page: the still image with its effect and fades.
pub fn page_clip_command(
    page: &Page,
    span: &PageSpan,
    effect: &VisualEffect,
    config: &ComposeConfig,
    output: impl AsRef<Path>,
) -> FfmpegCommand {
    let filter = page_clip_filter(
        effect,
        &config.slideshow,
        config.width,
        config.height,
        config.fps,
        span.clip_duration,
    );

    FfmpegCommand::new(output)
        .looped_image(&page.image, config.fps, span.clip_duration)
        .video_filter(filter)
        .frame_rate(config.fps)
        .no_audio()
        .output_args(config.encoding.video_args())
        .duration(span.clip_duration)
}

/// Join page clips, draw the caption strip, burn subtitles and mux audio.
///
/// Inputs are the clips in page order followed by the mixed WAV.
pub fn assembly_command(
    clips: &[PathBuf],
    timeline: &Timeline,
    plan: &VisualPlan,
    subtitles: &Path,
    audio: &Path,
    config: &ComposeConfig,
    output: impl AsRef<Path>,
) -> FfmpegCommand {
    let offsets: Vec<f64> = timeline.pages.iter().skip(1).map(|p| p.clip_start).collect();
    let style = CaptionStyle::from_config(config);
    let graph = assembly_filter(
        &offsets,
        &plan.transitions.sides,
        plan.transitions.slide_duration,
        &subtitles.to_string_lossy(),
        &style,
    );

    let cmd = clips
        .iter()
        .fold(FfmpegCommand::new(output), |cmd, clip| cmd.input(clip))
        .input(audio);
    let audio_input = cmd.input_count() - 1;

    cmd.filter_complex(graph)
        .map(format!("[{}]", VIDEO_OUT_LABEL))
        .map(format!("{}:a", audio_input))
        .frame_rate(config.fps)
        .audio_rate(config.audio_sample_rate)
        .output_args(config.encoding.to_ffmpeg_args())
        .duration(timeline.video_duration())
}

/// Runs the FFmpeg stages of a composition.
#[derive(Debug, Default)]
pub struct Renderer {
    runner: FfmpegRunner,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            runner: FfmpegRunner::new(),
        }
    }

    pub fn runner(&self) -> &FfmpegRunner {
        &self.runner
    }

    /// Render every page clip into `work_dir`, in page order.
    pub async fn render_clips(
        &self,
        pages: &[Page],
        timeline: &Timeline,
        plan: &VisualPlan,
        config: &ComposeConfig,
        work_dir: &Path,
    ) -> MediaResult<Vec<PathBuf>> {
        if pages.len() != plan.effects.len() || pages.len() != timeline.pages.len() {
            return Err(MediaError::invalid_input(format!(
                "{} pages, {} effects, {} timeline spans",
                pages.len(),
                plan.effects.len(),
                timeline.pages.len()
            )));
        }

        let mut clips = Vec::with_capacity(pages.len());
        for ((page, span), effect) in pages.iter().zip(&timeline.pages).zip(&plan.effects) {
            let output = work_dir.join(format!("clip_p{}.{}", page.index, config.encoding.container));
            let cmd = page_clip_command(page, span, effect, config, &output);

            debug!(
                page = page.index,
                effect = %effect,
                duration = span.clip_duration,
                "Rendering page clip"
            );
            self.runner.run(&cmd).await?;
            clips.push(output);
        }

        Ok(clips)
    }

    /// Final encode into `output`.
    pub async fn assemble<F>(
        &self,
        cmd: &FfmpegCommand,
        total_secs: f64,
        progress: F,
    ) -> MediaResult<()>
    where
        F: Fn(FfmpegProgress) + Send + 'static,
    {
        info!(
            output = %cmd.output_path().display(),
            duration = total_secs,
            "Assembling video"
        );
        self.runner.run_with_progress(cmd, progress).await
    }
}
