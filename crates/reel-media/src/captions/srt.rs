//! Timed subtitle cues and the SRT file format.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use reel_models::{format_srt_timestamp, parse_srt_timestamp, CaptionChunk, Timeline};
use tracing::debug;

use crate::error::{MediaError, MediaResult};
use crate::fs_utils::write_atomic;

/// One numbered subtitle cue.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    /// 1-based, sequential across the file
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Spread each page's chunks evenly across its speech span.
///
/// With `k` chunks over a span of `T` seconds, chunk `i` covers
/// `[T·i/k, T·(i+1)/k]` after the page's first utterance starts. Blank
/// chunks keep their slot but emit no cue, and pages without speech time
/// emit nothing.
pub fn build_cues(timeline: &Timeline, captions: &[Vec<CaptionChunk>]) -> MediaResult<Vec<SubtitleCue>> {
    if timeline.pages.len() != captions.len() {
        return Err(MediaError::invalid_input(format!(
            "{} pages on the timeline but {} caption sets",
            timeline.pages.len(),
            captions.len()
        )));
    }

    let mut cues = Vec::new();

    for (span, chunks) in timeline.pages.iter().zip(captions) {
        let total = span.speech_span();
        if chunks.is_empty() || total <= 0.0 {
            debug!(page = span.page_index, "No caption time for page, skipping");
            continue;
        }

        let k = chunks.len() as f64;
        for (i, chunk) in chunks.iter().enumerate() {
            if chunk.is_blank() {
                continue;
            }
            let start = span.speech_start + total * i as f64 / k;
            let end = span.speech_start + total * (i + 1) as f64 / k;
            cues.push(SubtitleCue {
                index: cues.len() + 1,
                start,
                end,
                text: chunk.text.clone(),
            });
        }
    }

    Ok(cues)
}

/// Render cues as SRT text with LF line endings.
pub fn render_srt(cues: &[SubtitleCue]) -> String {
    let mut out = String::new();
    for cue in cues {
        // Writing to a String cannot fail
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            cue.index,
            format_srt_timestamp(cue.start),
            format_srt_timestamp(cue.end),
            cue.text
        );
    }
    out
}

/// Write cues to `path`, replacing any previous file atomically.
pub fn write_srt(path: impl AsRef<Path>, cues: &[SubtitleCue]) -> MediaResult<PathBuf> {
    let path = path.as_ref();
    let written = write_atomic(path, render_srt(cues).as_bytes())?;
    debug!(path = %path.display(), cues = cues.len(), "Wrote subtitles");
    Ok(written)
}

/// Parse SRT text back into cues.
pub fn parse_srt(content: &str) -> MediaResult<Vec<SubtitleCue>> {
    let mut cues = Vec::new();
    let normalized = content.replace("\r\n", "\n");

    for block in normalized.split("\n\n").filter(|b| !b.trim().is_empty()) {
        let mut lines = block.lines();
        let index = lines
            .next()
            .and_then(|l| l.trim().parse::<usize>().ok())
            .ok_or_else(|| MediaError::invalid_input(format!("cue without index: {:?}", block)))?;

        let timing = lines
            .next()
            .ok_or_else(|| MediaError::invalid_input(format!("cue {} has no timing", index)))?;
        let (start, end) = timing
            .split_once("-->")
            .ok_or_else(|| MediaError::invalid_input(format!("cue {} timing: {:?}", index, timing)))?;
        let start = parse_srt_timestamp(start)
            .map_err(|e| MediaError::invalid_input(format!("cue {}: {}", index, e)))?;
        let end = parse_srt_timestamp(end)
            .map_err(|e| MediaError::invalid_input(format!("cue {}: {}", index, e)))?;

        cues.push(SubtitleCue {
            index,
            start,
            end,
            text: lines.collect::<Vec<_>>().join("\n"),
        });
    }

    Ok(cues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_models::PageSpan;

    fn span(page: usize, speech_start: f64, speech_end: f64) -> PageSpan {
        PageSpan {
            page_index: page,
            clip_start: 0.0,
            clip_duration: speech_end + 1.4,
            lead: 1.0,
            tail: 1.4,
            speech_start,
            speech_end,
        }
    }

    fn chunks(texts: &[&str]) -> Vec<CaptionChunk> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| CaptionChunk::new(i, *t))
            .collect()
    }

    #[test]
    fn test_even_distribution() {
        let timeline = Timeline {
            pages: vec![span(1, 1.0, 7.0)],
            ..Default::default()
        };
        let cues = build_cues(&timeline, &[chunks(&["a", "b", "c"])]).unwrap();

        assert_eq!(cues.len(), 3);
        assert!((cues[0].start - 1.0).abs() < 1e-9);
        assert!((cues[0].end - 3.0).abs() < 1e-9);
        assert!((cues[2].start - 5.0).abs() < 1e-9);
        assert!((cues[2].end - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_indices_continue_across_pages() {
        let timeline = Timeline {
            pages: vec![span(1, 1.0, 6.0), span(2, 8.4, 13.4)],
            ..Default::default()
        };
        let cues = build_cues(&timeline, &[chunks(&["one", "two"]), chunks(&["three"])]).unwrap();

        let indices: Vec<usize> = cues.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert!((cues[2].start - 8.4).abs() < 1e-9);
    }

    #[test]
    fn test_blank_chunk_emits_no_cue() {
        let timeline = Timeline {
            pages: vec![span(1, 1.0, 6.0)],
            ..Default::default()
        };
        let cues = build_cues(&timeline, &[chunks(&[""])]).unwrap();
        assert!(cues.is_empty());
    }

    #[test]
    fn test_mismatched_pages_rejected() {
        let timeline = Timeline {
            pages: vec![span(1, 1.0, 6.0)],
            ..Default::default()
        };
        assert!(build_cues(&timeline, &[]).is_err());
    }

    #[test]
    fn test_render_format() {
        let cues = vec![SubtitleCue {
            index: 1,
            start: 75.125,
            end: 78.0,
            text: "Hello".to_string(),
        }];
        assert_eq!(
            render_srt(&cues),
            "1\n00:01:15,125 --> 00:01:18,000\nHello\n\n"
        );
        assert!(!render_srt(&cues).contains('\r'));
    }

    #[test]
    fn test_write_and_parse_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("captions.srt");
        let cues = vec![
            SubtitleCue {
                index: 1,
                start: 1.0,
                end: 3.5,
                text: "小狐狸".to_string(),
            },
            SubtitleCue {
                index: 2,
                start: 3.5,
                end: 6.0,
                text: "river".to_string(),
            },
        ];

        write_srt(&path, &cues).unwrap();
        let parsed = parse_srt(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(parsed, cues);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_srt("one\n00:00:01,000 --> 00:00:02,000\nx\n\n").is_err());
        assert!(parse_srt("1\nno timing here\nx\n\n").is_err());
    }
}
