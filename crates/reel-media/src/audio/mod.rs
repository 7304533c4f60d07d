//! Audio mixing.
//!
//! Tracks are conformed by FFmpeg to mono float PCM at the configured sample
//! rate, decoded with hound, mixed in memory, and written back as one float
//! WAV for the final mux.

pub mod conform;
mod decode;
mod mixer;
pub mod signal;

pub use conform::{conform_story_audio, ConformedAudio};
pub use decode::{decode_wav, downmix, write_wav};
pub use mixer::{
    build_page_audio, mix_story, reference_rms, relative_gain, AudioTrack, MixSettings, PageAudio,
    StoryMix,
};
