//! Shared data models for StoryReel.
//!
//! This crate provides Serde-serializable types for:
//! - Story pages and their speech layouts
//! - Timeline entries produced by the timestamp calculator
//! - Caption chunks and subtitle timestamps
//! - Visual effect and transition plans
//! - Composition and encoding configuration
//! - The output manifest written after assembly

pub mod caption;
pub mod config;
pub mod effect;
pub mod encoding;
pub mod manifest;
pub mod page;
pub mod timeline;
pub mod timestamp;

// Re-export common types
pub use caption::CaptionChunk;
pub use config::{
    CaptionConfig, ComposeConfig, ConfigError, MusicLoudnessReference, SlideshowEffectConfig,
};
pub use effect::{PanDirection, SlideSide, TransitionPlan, VisualEffect, VisualPlan, ZoomMode, ZoomOrigin};
pub use encoding::EncodingConfig;
pub use manifest::OutputManifest;
pub use page::{Page, SpeechLayout, SpeechSegment};
pub use timeline::{PageSpan, Timeline, TimelineEntry};
pub use timestamp::{format_srt_timestamp, parse_srt_timestamp, TimestampError};
