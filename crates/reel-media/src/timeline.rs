//! Timestamp calculator.
//!
//! Each page becomes one padded clip:
//!
//! ```text
//!  first page:   | fade | speech ... | fade | slide |
//!  other pages:  | slide | fade | speech ... | fade | slide |
//!                 \_____/                          \_____/
//!            overlaps previous clip          overlaps next clip
//! ```
//!
//! Consecutive clips overlap by `slide_duration`, so the cursor (start of the
//! next clip) advances by the padded duration minus one slide. The speech
//! intervals of a multi-utterance page are contiguous inside the clip.
//!
//! The calculation is a pure fold over the pages: the same pages and
//! durations always produce the same timeline.

use reel_models::{Page, PageSpan, SpeechLayout, Timeline, TimelineEntry};

use crate::error::{MediaError, MediaResult};

/// Tolerance for the per-page bookkeeping check.
const DRIFT_EPSILON: f64 = 1e-9;

/// Padding around one page's speech.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePadding {
    /// Silence before the first utterance
    pub lead: f64,
    /// Silence after the last utterance
    pub tail: f64,
}

impl PagePadding {
    /// Padding of the page at `position` (0-based order in the story).
    pub fn for_position(position: usize, fade_duration: f64, slide_duration: f64) -> Self {
        let leading_slide = if position == 0 { 0.0 } else { slide_duration };
        Self {
            lead: leading_slide + fade_duration,
            tail: fade_duration + slide_duration,
        }
    }

    /// Padded clip duration for `speech` seconds of narration.
    pub fn clip_duration(&self, speech: f64) -> f64 {
        self.lead + speech + self.tail
    }
}

/// Running state threaded through the fold.
#[derive(Debug, Default)]
struct Accumulator {
    cursor: f64,
    entries: Vec<TimelineEntry>,
    pages: Vec<PageSpan>,
}

/// Compute absolute speech intervals for every page.
pub fn compute(pages: &[Page], fade_duration: f64, slide_duration: f64) -> MediaResult<Timeline> {
    check_duration("fade_duration", fade_duration)?;
    check_duration("slide_duration", slide_duration)?;

    let acc = pages
        .iter()
        .enumerate()
        .try_fold(Accumulator::default(), |acc, (position, page)| {
            place_page(acc, position, page, fade_duration, slide_duration)
        })?;

    Ok(Timeline {
        entries: acc.entries,
        pages: acc.pages,
        final_cursor: acc.cursor,
    })
}

fn place_page(
    mut acc: Accumulator,
    position: usize,
    page: &Page,
    fade_duration: f64,
    slide_duration: f64,
) -> MediaResult<Accumulator> {
    let durations = page.speech.durations();
    if durations.is_empty() {
        return Err(MediaError::invalid_input(format!(
            "page {} has no speech segments",
            page.index
        )));
    }
    if let Some((i, d)) = durations
        .iter()
        .enumerate()
        .find(|(_, d)| !(d.is_finite() && **d > 0.0))
    {
        return Err(MediaError::invalid_input(format!(
            "page {} segment {} has non-positive duration {}",
            page.index, i, d
        )));
    }

    let padding = PagePadding::for_position(position, fade_duration, slide_duration);
    let clip_start = acc.cursor;
    let clip_duration = padding.clip_duration(durations.iter().sum());

    match &page.speech {
        SpeechLayout::SingleUtterance { segment } => {
            let start = acc.cursor + padding.lead;
            acc.entries.push(TimelineEntry {
                page_index: page.index,
                segment_index: 0,
                start_time: start,
                end_time: start + segment.duration,
            });
            acc.cursor += clip_duration - slide_duration;
        }
        SpeechLayout::MultiUtterance { .. } => {
            let last = durations.len() - 1;
            for (i, d) in durations.iter().enumerate() {
                let start = if i == 0 {
                    acc.cursor + padding.lead
                } else {
                    acc.cursor
                };
                acc.entries.push(TimelineEntry {
                    page_index: page.index,
                    segment_index: i,
                    start_time: start,
                    end_time: start + d,
                });

                if i == 0 {
                    acc.cursor += padding.lead;
                }
                acc.cursor += d;
                if i == last {
                    // Trailing fade; the trailing slide is shared with the next clip
                    acc.cursor += padding.tail - slide_duration;
                }
            }
        }
    }

    let consumed = acc.cursor - clip_start;
    debug_assert!(
        (consumed - (clip_duration - slide_duration)).abs() < DRIFT_EPSILON,
        "page {} cursor drift: consumed {} for clip {}",
        page.index,
        consumed,
        clip_duration
    );

    let first = acc.entries.len() - durations.len();
    let speech_start = acc.entries[first].start_time;
    let speech_end = acc.entries[acc.entries.len() - 1].end_time;

    acc.pages.push(PageSpan {
        page_index: page.index,
        clip_start,
        clip_duration,
        lead: padding.lead,
        tail: padding.tail,
        speech_start,
        speech_end,
    });

    Ok(acc)
}

fn check_duration(parameter: &'static str, value: f64) -> MediaResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MediaError::InvalidConfiguration {
            parameter,
            message: format!("must be positive, got {}", value),
        })
    }
}
