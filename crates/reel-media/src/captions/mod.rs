//! Caption segmentation and subtitle files.

mod segmenter;
mod srt;

pub use segmenter::{is_cjk_punctuation, segment, CJK_PUNCTUATION};
pub use srt::{build_cues, parse_srt, render_srt, write_srt, SubtitleCue};
