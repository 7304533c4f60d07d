//! Output manifest written after assembly.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::effect::VisualPlan;
use crate::timeline::TimelineEntry;

/// Artifacts of a successful composition run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputManifest {
    /// Subtitle file burned into the video
    pub subtitle_path: PathBuf,
    /// Muxed video file
    pub video_path: PathBuf,
    /// Duration of the composited video in seconds
    pub duration_secs: f64,
    /// Number of pages composed
    pub pages: usize,
    /// Number of subtitle cues written
    pub cues: usize,
    /// Speech intervals the captions were timed against
    pub entries: Vec<TimelineEntry>,
    /// Effects and transitions that were drawn for this run
    pub visual_plan: VisualPlan,
}

const MANIFEST_EXTENSION: &str = "manifest.json";

impl OutputManifest {
    /// Manifest location next to the video: `/out/a.mp4` has
    /// `/out/a.manifest.json`.
    pub fn sidecar_path(&self) -> PathBuf {
        self.video_path.with_extension(MANIFEST_EXTENSION)
    }
}
