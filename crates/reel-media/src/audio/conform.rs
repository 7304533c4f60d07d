//! Conversion of story audio to the mixer's sample format.
//!
//! Generators write speech, effects and music at whatever rate and channel
//! layout they like. FFmpeg converts each file to mono float PCM at the
//! configured rate in the work directory; files already mono at that rate
//! are used in place.

use std::path::{Path, PathBuf};

use hound::WavReader;
use reel_models::Page;
use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Story audio in the mixer's format.
#[derive(Debug, Clone)]
pub struct ConformedAudio {
    /// Pages with speech and sound paths pointing at conformed files
    pub pages: Vec<Page>,
    pub music: PathBuf,
}

/// Convert `input` to mono 32-bit float WAV at `sample_rate`.
pub fn conform_command(input: &Path, output: &Path, sample_rate: u32) -> FfmpegCommand {
    FfmpegCommand::new(output)
        .input(input)
        .output_arg("-vn")
        .output_args(["-ac", "1"])
        .audio_rate(sample_rate)
        .audio_codec("pcm_f32le")
}

/// Whether `path` is a WAV the mixer can read as is.
///
/// Anything hound cannot open is left to FFmpeg.
pub fn is_conformed(path: &Path, sample_rate: u32) -> bool {
    match WavReader::open(path) {
        Ok(reader) => {
            let spec = reader.spec();
            spec.channels == 1 && spec.sample_rate == sample_rate
        }
        Err(_) => false,
    }
}

/// Conform every speech segment, sound effect and the music track.
pub async fn conform_story_audio(
    runner: &FfmpegRunner,
    pages: &[Page],
    music: &Path,
    sample_rate: u32,
    work_dir: &Path,
) -> MediaResult<ConformedAudio> {
    let mut conformed = Vec::with_capacity(pages.len());

    for page in pages {
        let mut page = page.clone();

        for (i, segment) in page.speech.segments_mut().iter_mut().enumerate() {
            let output = work_dir.join(format!("speech_p{}_{}.wav", page.index, i + 1));
            segment.path = conform_file(runner, &segment.path, output, sample_rate).await?;
        }

        if let Some(sound) = page.sound.take() {
            let output = work_dir.join(format!("sound_p{}.wav", page.index));
            page.sound = Some(conform_file(runner, &sound, output, sample_rate).await?);
        }

        conformed.push(page);
    }

    let music = conform_file(runner, music, work_dir.join("music.wav"), sample_rate).await?;

    Ok(ConformedAudio {
        pages: conformed,
        music,
    })
}

async fn conform_file(
    runner: &FfmpegRunner,
    input: &Path,
    output: PathBuf,
    sample_rate: u32,
) -> MediaResult<PathBuf> {
    if is_conformed(input, sample_rate) {
        return Ok(input.to_path_buf());
    }

    debug!(
        input = %input.display(),
        output = %output.display(),
        sample_rate = sample_rate,
        "Conforming audio"
    );
    runner.run(&conform_command(input, &output, sample_rate)).await?;
    Ok(output)
}
