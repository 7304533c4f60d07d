//! End-to-end composition of a story directory into a captioned video.
//!
//! Data flows forward through the stages:
//!
//! 1. Load pages and durations from the story directory
//! 2. Compute the timeline
//! 3. Segment captions and time them against the timeline
//! 4. Draw the visual plan from one random source
//! 5. Conform and mix the audio into a temporary WAV
//! 6. Render page clips, then encode the final video into a staged file
//! 7. Stage the subtitles and manifest, then commit all three together

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reel_models::{CaptionChunk, ComposeConfig, OutputManifest, Timeline, VisualPlan};
use tracing::{debug, info};

use crate::assets::{load_captions, load_story, StoryAssets};
use crate::audio::{conform_story_audio, mix_story, write_wav, MixSettings, StoryMix};
use crate::captions::{build_cues, render_srt, segment, write_srt, SubtitleCue};
use crate::command::check_ffmpeg;
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::{commit_all, StagedOutput};
use crate::progress::FfmpegProgress;
use crate::timeline;
use crate::visual::{assembly_command, plan_visuals, Renderer};

/// File name of the mixed soundtrack inside the work directory.
const MIX_FILE: &str = "mix.wav";

/// One composition run.
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    pub story_dir: PathBuf,
    /// Destination video; the subtitle file is written beside it
    pub output: PathBuf,
    /// Seed for effect selection, OS entropy when `None`
    pub seed: Option<u64>,
}

impl ComposeRequest {
    pub fn new(story_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            story_dir: story_dir.into(),
            output: output.into(),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Subtitle file that accompanies the video.
    pub fn subtitle_path(&self) -> PathBuf {
        self.output.with_extension("srt")
    }
}

/// Everything decided before any media is written.
#[derive(Debug, Clone)]
pub struct CompositionPlan {
    pub assets: StoryAssets,
    pub timeline: Timeline,
    /// Caption chunks per page, in page order
    pub captions: Vec<Vec<CaptionChunk>>,
    pub cues: Vec<SubtitleCue>,
    pub visual: VisualPlan,
}

/// Random source for one run.
pub fn run_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Composes narrated slideshows with a fixed configuration.
#[derive(Debug)]
pub struct Composer {
    config: ComposeConfig,
    renderer: Renderer,
}

impl Composer {
    /// Create a composer, rejecting invalid configuration up front.
    pub fn new(config: ComposeConfig) -> MediaResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            renderer: Renderer::new(),
        })
    }

    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// Load a story and compute its timeline, captions and visual plan.
    pub fn prepare<R: Rng + ?Sized>(
        &self,
        story_dir: &Path,
        rng: &mut R,
    ) -> MediaResult<CompositionPlan> {
        let texts = load_captions(story_dir)?;
        let assets = load_story(story_dir, texts)?;

        let slideshow = &self.config.slideshow;
        let timeline = timeline::compute(
            &assets.pages,
            slideshow.fade_duration,
            slideshow.slide_duration,
        )?;

        let captions = assets
            .pages
            .iter()
            .map(|page| segment(&page.caption, self.config.caption.max_length))
            .collect::<MediaResult<Vec<_>>>()?;
        let cues = build_cues(&timeline, &captions)?;

        let visual = plan_visuals(assets.pages.len(), slideshow, rng);

        debug!(
            pages = assets.pages.len(),
            entries = timeline.entries.len(),
            cues = cues.len(),
            duration = timeline.video_duration(),
            "Prepared composition"
        );

        Ok(CompositionPlan {
            assets,
            timeline,
            captions,
            cues,
            visual,
        })
    }

    /// Conform the plan's audio into `work_dir`, then mix it on a blocking
    /// thread.
    pub async fn mix(&self, plan: &CompositionPlan, work_dir: &Path) -> MediaResult<StoryMix> {
        let conformed = conform_story_audio(
            self.renderer.runner(),
            &plan.assets.pages,
            &plan.assets.music,
            self.config.audio_sample_rate,
            work_dir,
        )
        .await?;
        let timeline = plan.timeline.clone();
        let settings = MixSettings::from_config(&self.config);

        tokio::task::spawn_blocking(move || {
            mix_story(&conformed.pages, &timeline, &conformed.music, &settings)
        })
            .await
            .map_err(|e| MediaError::Io(std::io::Error::other(format!("Mixing task failed: {}", e))))?
    }

    /// Run a full composition.
    pub async fn compose(&self, request: &ComposeRequest) -> MediaResult<OutputManifest> {
        self.compose_with_progress(request, |_| {}).await
    }

    /// Run a full composition, reporting final-encode progress.
    ///
    /// On failure the destination video, subtitle file and manifest are left
    /// as they were before the run.
    pub async fn compose_with_progress<F>(
        &self,
        request: &ComposeRequest,
        progress: F,
    ) -> MediaResult<OutputManifest>
    where
        F: Fn(FfmpegProgress) + Send + 'static,
    {
        check_ffmpeg()?;

        info!(
            story = %request.story_dir.display(),
            output = %request.output.display(),
            seed = ?request.seed,
            "Starting composition"
        );

        let mut rng = run_rng(request.seed);
        let plan = self.prepare(&request.story_dir, &mut rng)?;
        self.render_plan(&plan, request, progress).await
    }

    /// Mix, render and commit an already prepared plan.
    pub async fn render_plan<F>(
        &self,
        plan: &CompositionPlan,
        request: &ComposeRequest,
        progress: F,
    ) -> MediaResult<OutputManifest>
    where
        F: Fn(FfmpegProgress) + Send + 'static,
    {
        let duration = plan.timeline.video_duration();

        let work_dir = tempfile::Builder::new().prefix("storyreel-").tempdir()?;

        let mix = self.mix(plan, work_dir.path()).await?;
        let mix_path = work_dir.path().join(MIX_FILE);
        write_wav(&mix_path, &mix.track.samples, mix.track.sample_rate)?;

        // Burned from the work copy; the public file is committed with the video
        let work_srt = work_dir.path().join("captions.srt");
        write_srt(&work_srt, &plan.cues)?;

        let clips = self
            .renderer
            .render_clips(
                &plan.assets.pages,
                &plan.timeline,
                &plan.visual,
                &self.config,
                work_dir.path(),
            )
            .await?;

        let staged = StagedOutput::new(&request.output)?;
        let cmd = assembly_command(
            &clips,
            &plan.timeline,
            &plan.visual,
            &work_srt,
            &mix_path,
            &self.config,
            staged.path(),
        );
        self.renderer
            .assemble(&cmd, duration, progress)
            .await
            .map_err(|e| assembly_error(&request.output, e))?;

        let manifest = OutputManifest {
            subtitle_path: request.subtitle_path(),
            video_path: request.output.clone(),
            duration_secs: duration,
            pages: plan.assets.pages.len(),
            cues: plan.cues.len(),
            entries: plan.timeline.entries.clone(),
            visual_plan: plan.visual.clone(),
        };
        let mut stages = stage_sidecars(&manifest, &plan.cues)?;
        stages.push(staged);
        commit_all(stages)?;

        info!(
            output = %manifest.video_path.display(),
            duration = manifest.duration_secs,
            pages = manifest.pages,
            cues = manifest.cues,
            "Composition complete"
        );

        Ok(manifest)
    }
}

/// Stage the subtitle file and the pretty-printed manifest for `manifest`.
pub fn stage_sidecars(
    manifest: &OutputManifest,
    cues: &[SubtitleCue],
) -> MediaResult<Vec<StagedOutput>> {
    let srt = StagedOutput::with_contents(&manifest.subtitle_path, render_srt(cues).as_bytes())?;
    let json = serde_json::to_vec_pretty(manifest)?;
    let sidecar = StagedOutput::with_contents(manifest.sidecar_path(), &json)?;
    Ok(vec![srt, sidecar])
}

/// Final encode failures are reported against the destination path.
fn assembly_error(output: &Path, err: MediaError) -> MediaError {
    match err {
        MediaError::FfmpegFailed {
            message,
            stderr: Some(stderr),
            ..
        } => MediaError::assembly_write(output, format!("{}\n{}", message, stderr)),
        MediaError::FfmpegFailed { message, .. } => MediaError::assembly_write(output, message),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_rejected() {
        let config = ComposeConfig::default().with_durations(0.0, 0.4);
        let err = Composer::new(config).unwrap_err();
        assert!(matches!(
            err,
            MediaError::InvalidConfiguration { parameter: "fade_duration", .. }
        ));
    }

    #[test]
    fn test_subtitle_path_beside_video() {
        let request = ComposeRequest::new("/story", "/out/video.mp4").with_seed(9);
        assert_eq!(request.subtitle_path(), PathBuf::from("/out/video.srt"));
        assert_eq!(request.seed, Some(9));
    }

    #[test]
    fn test_seeded_rng_repeats() {
        let a: u64 = run_rng(Some(5)).random();
        let b: u64 = run_rng(Some(5)).random();
        assert_eq!(a, b);
    }

    #[test]
    fn test_assembly_error_keeps_stderr() {
        let err = assembly_error(
            Path::new("/out/video.mp4"),
            MediaError::ffmpeg_failed("exit 1", Some("Invalid argument".into()), Some(1)),
        );
        match err {
            MediaError::AssemblyWrite { path, message } => {
                assert_eq!(path, PathBuf::from("/out/video.mp4"));
                assert!(message.contains("Invalid argument"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    fn manifest_in(dir: &Path, stem: &str) -> OutputManifest {
        OutputManifest {
            subtitle_path: dir.join(format!("{stem}.srt")),
            video_path: dir.join(format!("{stem}.mp4")),
            duration_secs: 7.4,
            pages: 1,
            cues: 1,
            entries: Vec::new(),
            visual_plan: VisualPlan::default(),
        }
    }

    fn cue() -> SubtitleCue {
        SubtitleCue {
            index: 1,
            start: 1.0,
            end: 6.0,
            text: "Once upon a time".to_string(),
        }
    }

    #[test]
    fn test_sidecars_appear_only_on_commit() {
        let dir = tempfile::TempDir::new().unwrap();
        let manifest = manifest_in(dir.path(), "video");

        let stages = stage_sidecars(&manifest, &[cue()]).unwrap();
        assert!(!manifest.subtitle_path.exists());
        assert!(!manifest.sidecar_path().exists());

        commit_all(stages).unwrap();
        let parsed: OutputManifest =
            serde_json::from_str(&std::fs::read_to_string(manifest.sidecar_path()).unwrap())
                .unwrap();
        assert_eq!(parsed, manifest);
        let srt = std::fs::read_to_string(&manifest.subtitle_path).unwrap();
        assert!(srt.contains("00:00:01,000 --> 00:00:06,000"));
    }

    #[test]
    fn test_failed_encode_leaves_previous_outputs() {
        let dir = tempfile::TempDir::new().unwrap();
        let manifest = manifest_in(dir.path(), "video");
        std::fs::write(&manifest.video_path, b"previous video").unwrap();
        std::fs::write(&manifest.subtitle_path, b"previous srt").unwrap();

        let mut stages = stage_sidecars(&manifest, &[cue()]).unwrap();
        stages.push(StagedOutput::new(&manifest.video_path).unwrap());

        assert!(commit_all(stages).is_err());
        assert_eq!(std::fs::read(&manifest.video_path).unwrap(), b"previous video");
        assert_eq!(std::fs::read(&manifest.subtitle_path).unwrap(), b"previous srt");
        assert!(!manifest.sidecar_path().exists());
    }

    #[test]
    fn test_outputs_in_one_directory_keep_separate_manifests() {
        let dir = tempfile::TempDir::new().unwrap();
        let a = manifest_in(dir.path(), "a");
        let b = manifest_in(dir.path(), "b");

        commit_all(stage_sidecars(&a, &[cue()]).unwrap()).unwrap();
        commit_all(stage_sidecars(&b, &[]).unwrap()).unwrap();

        let parsed_a: OutputManifest =
            serde_json::from_str(&std::fs::read_to_string(a.sidecar_path()).unwrap()).unwrap();
        assert_eq!(parsed_a.video_path, a.video_path);
        assert_eq!(std::fs::read_to_string(&b.subtitle_path).unwrap(), "");
    }
}
