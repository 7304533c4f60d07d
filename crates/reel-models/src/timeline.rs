//! Timeline types produced by the timestamp calculator.

use serde::{Deserialize, Serialize};

/// Absolute interval of one speech segment, in seconds from video start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// 1-based page index
    pub page_index: usize,
    /// 0-based segment index within the page
    pub segment_index: usize,
    pub start_time: f64,
    pub end_time: f64,
}

impl TimelineEntry {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Placement of a whole page clip on the timeline.
///
/// The clip covers the padded audio of the page: leading slide silence
/// (all pages but the first), a fade, the speech, a fade, and trailing
/// slide silence. Consecutive clips overlap by the slide duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSpan {
    /// 1-based page index
    pub page_index: usize,
    /// Where the clip starts in the final video
    pub clip_start: f64,
    /// Padded clip duration
    pub clip_duration: f64,
    /// Silence before the first utterance, relative to `clip_start`
    pub lead: f64,
    /// Silence after the last utterance
    pub tail: f64,
    /// Start of the first utterance (absolute)
    pub speech_start: f64,
    /// End of the last utterance (absolute)
    pub speech_end: f64,
}

impl PageSpan {
    pub fn clip_end(&self) -> f64 {
        self.clip_start + self.clip_duration
    }

    /// Total synchronized speech span of the page.
    pub fn speech_span(&self) -> f64 {
        self.speech_end - self.speech_start
    }
}

/// Result of running the timestamp calculator over a story.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// One entry per speech segment, in playback order
    pub entries: Vec<TimelineEntry>,
    /// One span per page, in page order
    pub pages: Vec<PageSpan>,
    /// Cursor value after the last page
    pub final_cursor: f64,
}

impl Timeline {
    /// Entries belonging to one page.
    pub fn entries_for(&self, page_index: usize) -> impl Iterator<Item = &TimelineEntry> {
        self.entries
            .iter()
            .filter(move |e| e.page_index == page_index)
    }

    pub fn page(&self, page_index: usize) -> Option<&PageSpan> {
        self.pages.iter().find(|p| p.page_index == page_index)
    }

    /// Length of the composited video.
    ///
    /// The last clip keeps its trailing slide padding, so this is the end of
    /// the last page clip rather than the final cursor.
    pub fn video_duration(&self) -> f64 {
        self.pages.last().map(PageSpan::clip_end).unwrap_or(0.0)
    }

    /// Whether entries are non-overlapping, start-monotonic and non-empty.
    pub fn is_well_ordered(&self) -> bool {
        self.entries.iter().all(|e| e.end_time > e.start_time)
            && self
                .entries
                .windows(2)
                .all(|w| w[1].start_time >= w[0].end_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(page: usize, seg: usize, start: f64, end: f64) -> TimelineEntry {
        TimelineEntry {
            page_index: page,
            segment_index: seg,
            start_time: start,
            end_time: end,
        }
    }

    #[test]
    fn test_well_ordered() {
        let timeline = Timeline {
            entries: vec![entry(1, 0, 1.0, 6.0), entry(2, 0, 8.4, 13.4)],
            ..Default::default()
        };
        assert!(timeline.is_well_ordered());
    }

    #[test]
    fn test_overlap_detected() {
        let timeline = Timeline {
            entries: vec![entry(1, 0, 1.0, 6.0), entry(2, 0, 5.0, 9.0)],
            ..Default::default()
        };
        assert!(!timeline.is_well_ordered());
    }

    #[test]
    fn test_entries_for_page() {
        let timeline = Timeline {
            entries: vec![
                entry(1, 0, 1.0, 2.0),
                entry(2, 0, 3.0, 4.0),
                entry(2, 1, 4.0, 5.0),
            ],
            ..Default::default()
        };
        assert_eq!(timeline.entries_for(2).count(), 2);
        assert_eq!(timeline.entries_for(3).count(), 0);
    }
}
