//! Story pages and their speech layouts.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One narrated utterance belonging to a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechSegment {
    /// WAV file holding the utterance
    pub path: PathBuf,
    /// Natural duration in seconds, read from the file header
    pub duration: f64,
}

impl SpeechSegment {
    pub fn new(path: impl Into<PathBuf>, duration: f64) -> Self {
        Self {
            path: path.into(),
            duration,
        }
    }
}

/// How a page's narration is split across files.
///
/// Resolved once when the page is loaded; timing code never probes the
/// filesystem to tell the two apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpeechLayout {
    /// `speech/p{N}.wav`
    SingleUtterance { segment: SpeechSegment },
    /// `speech/p{N}_{i}.wav`, ordered by ascending `i`
    MultiUtterance { segments: Vec<SpeechSegment> },
}

impl SpeechLayout {
    /// Segments in playback order.
    pub fn segments(&self) -> &[SpeechSegment] {
        match self {
            SpeechLayout::SingleUtterance { segment } => std::slice::from_ref(segment),
            SpeechLayout::MultiUtterance { segments } => segments,
        }
    }

    pub fn segments_mut(&mut self) -> &mut [SpeechSegment] {
        match self {
            SpeechLayout::SingleUtterance { segment } => std::slice::from_mut(segment),
            SpeechLayout::MultiUtterance { segments } => segments,
        }
    }

    /// Natural durations in playback order.
    pub fn durations(&self) -> Vec<f64> {
        self.segments().iter().map(|s| s.duration).collect()
    }

    /// Sum of all natural durations.
    pub fn total_speech(&self) -> f64 {
        self.segments().iter().map(|s| s.duration).sum()
    }

    pub fn is_single(&self) -> bool {
        matches!(self, SpeechLayout::SingleUtterance { .. })
    }

    pub fn len(&self) -> usize {
        self.segments().len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments().is_empty()
    }
}

/// A single page of the story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page index
    pub index: usize,
    /// Still image shown for the page
    pub image: PathBuf,
    /// Narration for the page
    pub speech: SpeechLayout,
    /// Optional ambient sound effect
    pub sound: Option<PathBuf>,
    /// Raw caption text
    pub caption: String,
}
