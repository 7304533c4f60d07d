//! Splitting page text into display lines.
//!
//! Latin text wraps on whitespace. Anything else (CJK or mixed script) wraps
//! on CJK punctuation, and a punctuation mark that would overflow a line is
//! attached to the line it ends rather than opening the next one.

use reel_models::CaptionChunk;

use crate::error::{MediaError, MediaResult};

/// CJK punctuation marks recognised as break points.
pub const CJK_PUNCTUATION: &str = concat!(
    "＂＃＄％＆＇（）＊＋，－／：；＜＝＞＠［＼］＾＿｀｛｜｝～｟｠｢｣､",
    "\u{3000}、〃〈〉《》「」『』【】〔〕〖〗〘〙〚〛〜〝〞〟〰〾〿–—‘’‛“”„‟…‧﹏﹑﹔·",
    "！？｡。",
);

pub fn is_cjk_punctuation(c: char) -> bool {
    CJK_PUNCTUATION.contains(c)
}

/// Split `text` into chunks of at most `max_length` characters.
///
/// Blank input yields a single empty chunk. A word or content run longer
/// than `max_length` becomes its own chunk unmodified.
pub fn segment(text: &str, max_length: usize) -> MediaResult<Vec<CaptionChunk>> {
    if max_length < 1 {
        return Err(MediaError::invalid_input(format!(
            "caption max_length must be at least 1, got {}",
            max_length
        )));
    }

    if text.trim().is_empty() {
        return Ok(vec![CaptionChunk::new(0, "")]);
    }

    let lines = if starts_with_latin(text) {
        wrap_words(text, max_length)
    } else {
        wrap_punctuated(text, max_length)
    };

    Ok(lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| CaptionChunk::new(i, line))
        .collect())
}

fn starts_with_latin(text: &str) -> bool {
    text.chars()
        .next()
        .map(|c| c.is_ascii_alphabetic())
        .unwrap_or(false)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn wrap_words(text: &str, max_length: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let joined = if current.is_empty() {
            char_len(word)
        } else {
            char_len(&current) + 1 + char_len(word)
        };

        if joined <= max_length {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Content runs and single punctuation marks, in order.
fn split_keep_punctuation(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut run = String::new();

    for c in text.chars() {
        if is_cjk_punctuation(c) {
            if !run.is_empty() {
                pieces.push(std::mem::take(&mut run));
            }
            pieces.push(c.to_string());
        } else {
            run.push(c);
        }
    }
    if !run.is_empty() {
        pieces.push(run);
    }

    pieces
}

fn wrap_punctuated(text: &str, max_length: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for piece in split_keep_punctuation(text) {
        if char_len(&current) + char_len(&piece) <= max_length {
            current.push_str(&piece);
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        let is_mark = piece.chars().all(is_cjk_punctuation);
        match lines.last_mut() {
            Some(last) if is_mark => last.push_str(&piece),
            _ => current = piece,
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        lines.push(tail.to_string());
    }

    lines
}
