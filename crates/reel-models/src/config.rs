//! Composition configuration.
//!
//! Everything outside this surface (story generation, prompts, which agents
//! run) is configured elsewhere. All fields have defaults so a partial JSON
//! document deserializes cleanly.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::effect::ZoomOrigin;
use crate::encoding::EncodingConfig;

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid configuration for `{parameter}`: {message}")]
pub struct ConfigError {
    pub parameter: &'static str,
    pub message: String,
}

impl ConfigError {
    pub fn new(parameter: &'static str, message: impl Into<String>) -> Self {
        Self {
            parameter,
            message: message.into(),
        }
    }
}

/// Which speech loudness the music gain is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MusicLoudnessReference {
    /// RMS of the last processed page's speech
    #[default]
    LastPage,
    /// Mean of every page's speech RMS
    Mean,
}

/// Timing and loudness parameters of the slideshow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SlideshowEffectConfig {
    /// Silence bracketing each page's speech (seconds)
    pub fade_duration: f64,
    /// Overlap between consecutive page clips (seconds)
    pub slide_duration: f64,
    /// Zoom speed; the scale travels `0.1 * zoom_speed` over a clip
    pub zoom_speed: f64,
    /// Pan crop ratio; the image is up-scaled by `1 / move_ratio`
    pub move_ratio: f64,
    /// Anchor kept fixed while zooming
    pub zoom_origin: ZoomOrigin,
    /// Sound-effect volume multiplier
    pub sound_volume: f64,
    /// Music volume multiplier
    pub music_volume: f64,
    /// Background-to-speech loudness ratio
    pub bg_speech_ratio: f64,
}

impl Default for SlideshowEffectConfig {
    fn default() -> Self {
        Self {
            fade_duration: 1.0,
            slide_duration: 0.4,
            zoom_speed: 0.5,
            move_ratio: 0.95,
            zoom_origin: ZoomOrigin::Center,
            sound_volume: 0.2,
            music_volume: 0.2,
            bg_speech_ratio: 0.4,
        }
    }
}

/// Caption appearance and segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CaptionConfig {
    /// Maximum characters per caption line
    pub max_length: usize,
    /// Font family passed to the subtitle renderer
    pub font: Option<String>,
    /// Text colour as `RRGGBB`
    pub color: String,
    /// Explicit font size; derived from the frame size when unset
    pub font_size: Option<u32>,
    /// Explicit caption strip height; derived from the frame height when unset
    pub strip_height: Option<u32>,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            max_length: 30,
            font: None,
            color: "FFFFFF".to_string(),
            font_size: None,
            strip_height: None,
        }
    }
}

/// Full configuration surface consumed by a composition run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ComposeConfig {
    /// Output frame rate
    pub fps: u32,
    /// Sample rate every audio track is resampled to
    pub audio_sample_rate: u32,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    pub encoding: EncodingConfig,
    pub slideshow: SlideshowEffectConfig,
    pub caption: CaptionConfig,
    pub music_reference: MusicLoudnessReference,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            fps: 10,
            audio_sample_rate: 16000,
            width: 1280,
            height: 720,
            encoding: EncodingConfig::default(),
            slideshow: SlideshowEffectConfig::default(),
            caption: CaptionConfig::default(),
            music_reference: MusicLoudnessReference::default(),
        }
    }
}

impl ComposeConfig {
    /// Height of the black caption strip: `0.06 * height`.
    pub fn caption_strip_height(&self) -> u32 {
        self.caption
            .strip_height
            .unwrap_or_else(|| (self.height as f64 * 0.06) as u32)
    }

    /// Caption font size: `0.025 * (width + height) / 2`.
    pub fn caption_font_size(&self) -> u32 {
        self.caption
            .font_size
            .unwrap_or_else(|| ((self.width + self.height) as f64 / 2.0 * 0.025) as u32)
    }

    /// Builder-style setter for output dimensions.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Builder-style setter for fade and slide durations.
    pub fn with_durations(mut self, fade: f64, slide: f64) -> Self {
        self.slideshow.fade_duration = fade;
        self.slideshow.slide_duration = slide;
        self
    }

    /// Reject values the composition cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_int("fps", self.fps)?;
        positive_int("audio_sample_rate", self.audio_sample_rate)?;
        positive_int("width", self.width)?;
        positive_int("height", self.height)?;

        let s = &self.slideshow;
        positive("fade_duration", s.fade_duration)?;
        positive("slide_duration", s.slide_duration)?;
        positive("zoom_speed", s.zoom_speed)?;
        positive("move_ratio", s.move_ratio)?;
        if s.move_ratio > 1.0 {
            return Err(ConfigError::new(
                "move_ratio",
                format!("must be at most 1.0, got {}", s.move_ratio),
            ));
        }
        positive("bg_speech_ratio", s.bg_speech_ratio)?;
        non_negative("sound_volume", s.sound_volume)?;
        non_negative("music_volume", s.music_volume)?;

        if self.caption.max_length < 1 {
            return Err(ConfigError::new("max_length", "must be at least 1"));
        }
        if self.caption_strip_height() >= self.height {
            return Err(ConfigError::new(
                "strip_height",
                "caption strip must be shorter than the frame",
            ));
        }
        if self.caption.color.len() != 6
            || !self.caption.color.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(ConfigError::new(
                "color",
                format!("expected RRGGBB, got {:?}", self.caption.color),
            ));
        }

        Ok(())
    }
}

fn positive(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::new(
            parameter,
            format!("must be positive, got {}", value),
        ))
    }
}

fn non_negative(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::new(
            parameter,
            format!("must not be negative, got {}", value),
        ))
    }
}

fn positive_int(parameter: &'static str, value: u32) -> Result<(), ConfigError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::new(parameter, "must be positive, got 0"))
    }
}
