//! Story directory loading.
//!
//! Resolves the generator's file layout once, up front:
//!
//! ```text
//! <story>/
//!   script_data.json        {"pages": [{"story": "..."}, ...]}
//!   image/p{N}.png
//!   speech/p{N}.wav | speech/p{N}_{i}.wav
//!   sound/p{N}.wav          (optional)
//!   music/music.wav
//! ```

use std::path::{Path, PathBuf};

use reel_models::{Page, SpeechLayout, SpeechSegment};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{AssetKind, MediaError, MediaResult};

/// Story script written by the text generator.
pub const SCRIPT_FILE: &str = "script_data.json";

/// Background music, relative to the story directory.
pub const MUSIC_FILE: &str = "music/music.wav";

const IMAGE_DIR: &str = "image";
const SPEECH_DIR: &str = "speech";
const SOUND_DIR: &str = "sound";

/// Everything composition reads from a story directory.
#[derive(Debug, Clone)]
pub struct StoryAssets {
    pub root: PathBuf,
    /// Pages in index order
    pub pages: Vec<Page>,
    pub music: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ScriptData {
    pages: Vec<ScriptPage>,
}

#[derive(Debug, Deserialize)]
struct ScriptPage {
    #[serde(default)]
    story: String,
}

/// Read page texts from `script_data.json`.
pub fn load_captions(story_dir: impl AsRef<Path>) -> MediaResult<Vec<String>> {
    let path = story_dir.as_ref().join(SCRIPT_FILE);
    if !path.is_file() {
        return Err(MediaError::missing_asset(0, AssetKind::Captions, path));
    }

    let content = std::fs::read_to_string(&path)?;
    let script: ScriptData = serde_json::from_str(&content)?;
    Ok(script.pages.into_iter().map(|p| p.story).collect())
}

/// Resolve every page's assets. One page is created per caption.
pub fn load_story(story_dir: impl AsRef<Path>, captions: Vec<String>) -> MediaResult<StoryAssets> {
    let root = story_dir.as_ref().to_path_buf();

    let pages = captions
        .into_iter()
        .enumerate()
        .map(|(i, caption)| load_page(&root, i + 1, caption))
        .collect::<MediaResult<Vec<_>>>()?;

    let music = root.join(MUSIC_FILE);
    if !music.is_file() {
        return Err(MediaError::missing_asset(0, AssetKind::Music, music));
    }

    info!(
        story = %root.display(),
        pages = pages.len(),
        "Loaded story assets"
    );

    Ok(StoryAssets { root, pages, music })
}

fn load_page(root: &Path, index: usize, caption: String) -> MediaResult<Page> {
    let image = root.join(IMAGE_DIR).join(format!("p{}.png", index));
    if !image.is_file() {
        return Err(MediaError::missing_asset(index, AssetKind::Image, image));
    }

    let speech = speech_layout(&root.join(SPEECH_DIR), index)?;

    let sound = Some(root.join(SOUND_DIR).join(format!("p{}.wav", index))).filter(|p| p.is_file());

    debug!(
        page = index,
        segments = speech.len(),
        speech_secs = speech.total_speech(),
        has_sound = sound.is_some(),
        "Resolved page"
    );

    Ok(Page {
        index,
        image,
        speech,
        sound,
        caption,
    })
}

/// Decide between `p{N}.wav` and the numbered `p{N}_{i}.wav` files.
fn speech_layout(speech_dir: &Path, page: usize) -> MediaResult<SpeechLayout> {
    let single = speech_dir.join(format!("p{}.wav", page));
    if single.is_file() {
        let duration = wav_duration(&single)?;
        return Ok(SpeechLayout::SingleUtterance {
            segment: SpeechSegment::new(single, duration),
        });
    }

    let mut numbered: Vec<(u32, PathBuf)> = match std::fs::read_dir(speech_dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter_map(|path| {
                let n = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .and_then(|name| utterance_number(name, page))?;
                Some((n, path))
            })
            .collect(),
        Err(_) => Vec::new(),
    };

    if numbered.is_empty() {
        return Err(MediaError::missing_asset(page, AssetKind::Speech, single));
    }
    numbered.sort_by_key(|(n, _)| *n);

    let segments = numbered
        .into_iter()
        .map(|(_, path)| wav_duration(&path).map(|d| SpeechSegment::new(path, d)))
        .collect::<MediaResult<Vec<_>>>()?;

    Ok(SpeechLayout::MultiUtterance { segments })
}

/// `p3_12.wav` is utterance 12 of page 3.
fn utterance_number(file_name: &str, page: usize) -> Option<u32> {
    let stem = file_name.strip_suffix(".wav")?;
    let (prefix, number) = stem.rsplit_once('_')?;
    if prefix != format!("p{}", page) {
        return None;
    }
    number.parse().ok()
}

/// Duration in seconds from a WAV header.
pub fn wav_duration(path: impl AsRef<Path>) -> MediaResult<f64> {
    let path = path.as_ref();
    let reader = hound::WavReader::open(path).map_err(|e| MediaError::wav(path, e))?;
    let spec = reader.spec();
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}
