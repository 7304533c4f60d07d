//! Caption chunks.

use serde::{Deserialize, Serialize};

/// One display line of a page caption.
///
/// Chunks have no duration of their own; the subtitle writer divides the
/// page's speech span evenly between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionChunk {
    /// 0-based position within the page
    pub index: usize,
    pub text: String,
}

impl CaptionChunk {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Length in characters (not bytes).
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl AsRef<str> for CaptionChunk {
    fn as_ref(&self) -> &str {
        &self.text
    }
}
