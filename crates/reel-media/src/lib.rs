#![deny(unreachable_patterns)]
//! Narrated slideshow composition.
//!
//! This crate provides:
//! - Story asset loading from the generator's directory layout
//! - The timestamp calculator (speech intervals and page clip spans)
//! - Script-aware caption segmentation and SRT writing
//! - Energy-balanced mixing of speech, sound effects and music
//! - Ken-Burns effects and slide transitions rendered through FFmpeg
//! - Atomic assembly of the final captioned video

pub mod assets;
pub mod audio;
pub mod captions;
pub mod command;
pub mod compose;
pub mod error;
pub mod fs_utils;
pub mod progress;
pub mod timeline;
pub mod visual;

pub use assets::{load_captions, load_story, wav_duration, StoryAssets, MUSIC_FILE, SCRIPT_FILE};
pub use audio::{conform_story_audio, mix_story, relative_gain, AudioTrack, MixSettings, StoryMix};
pub use captions::{build_cues, render_srt, segment, write_srt, SubtitleCue};
pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
pub use compose::{run_rng, ComposeRequest, Composer, CompositionPlan};
pub use error::{AssetKind, MediaError, MediaResult, TrackKind};
pub use fs_utils::{commit_all, write_atomic, StagedOutput};
pub use progress::{FfmpegProgress, ProgressCallback};
pub use timeline::compute as compute_timeline;
pub use visual::{plan_visuals, Renderer};
