//! Loudness-balanced mixing of speech, sound effects and music.
//!
//! Background tracks are scaled relative to measured speech energy:
//! `gain = volume · (speech_rms / track_rms) · bg_speech_ratio`. A track
//! with zero energy has no meaningful ratio; it is reported as
//! [`MediaError::DegenerateSignal`] and left out of the mix.

use std::path::Path;

use reel_models::{ComposeConfig, MusicLoudnessReference, Page, PageSpan, Timeline};
use tracing::{debug, info, warn};

use super::decode::decode_wav;
use super::signal::{apply_gain, fade_in, fade_out, fit_length, mix_into, rms, samples_for};
use crate::error::{MediaError, MediaResult, TrackKind};

/// A mono audio channel with its measured energy.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTrack {
    pub kind: TrackKind,
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// RMS of `samples`
    pub rms: f64,
}

impl AudioTrack {
    pub fn new(kind: TrackKind, samples: Vec<f32>, sample_rate: u32) -> Self {
        let rms = rms(&samples);
        Self {
            kind,
            samples,
            sample_rate,
            rms,
        }
    }

    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Gain that puts a background track at `ratio` of the reference loudness.
pub fn relative_gain(
    kind: TrackKind,
    reference_rms: f64,
    track_rms: f64,
    volume: f64,
    ratio: f64,
) -> MediaResult<f64> {
    if !(track_rms.is_finite() && track_rms > 0.0) {
        return Err(MediaError::DegenerateSignal { track: kind });
    }
    Ok(volume * (reference_rms / track_rms) * ratio)
}

/// Mixing parameters taken from [`ComposeConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixSettings {
    pub sample_rate: u32,
    pub fade_duration: f64,
    pub sound_volume: f64,
    pub music_volume: f64,
    pub bg_speech_ratio: f64,
    pub music_reference: MusicLoudnessReference,
}

impl MixSettings {
    pub fn from_config(config: &ComposeConfig) -> Self {
        Self {
            sample_rate: config.audio_sample_rate,
            fade_duration: config.slideshow.fade_duration,
            sound_volume: config.slideshow.sound_volume,
            music_volume: config.slideshow.music_volume,
            bg_speech_ratio: config.slideshow.bg_speech_ratio,
            music_reference: config.music_reference,
        }
    }
}

/// Padded audio for one page clip.
#[derive(Debug, Clone)]
pub struct PageAudio {
    pub page_index: usize,
    /// Speech plus effect, exactly the clip's length
    pub track: AudioTrack,
    /// Energy of the unpadded speech
    pub speech_rms: f64,
    /// `None` when the page has no effect or it was skipped
    pub effect_gain: Option<f64>,
}

/// The whole-video mix.
#[derive(Debug, Clone)]
pub struct StoryMix {
    pub track: AudioTrack,
    pub pages: Vec<PageAudio>,
    /// Speech loudness the music was balanced against
    pub reference_rms: f64,
    pub music_gain: Option<f64>,
}

/// Build one page's clip audio.
///
/// Each segment is placed at its timeline offset inside a silent buffer of
/// the clip's length, so the leading and trailing padding come from the
/// same layout the timeline used.
pub fn build_page_audio(
    page: &Page,
    span: &PageSpan,
    timeline: &Timeline,
    settings: &MixSettings,
) -> MediaResult<PageAudio> {
    let rate = settings.sample_rate;
    let entries: Vec<_> = timeline.entries_for(page.index).collect();
    if entries.len() != page.speech.len() {
        return Err(MediaError::invalid_input(format!(
            "page {} has {} speech segments but {} timeline entries",
            page.index,
            page.speech.len(),
            entries.len()
        )));
    }

    let clip_len = samples_for(span.clip_duration, rate);
    let mut clip = vec![0.0f32; clip_len];
    let mut raw_speech = Vec::new();

    for (segment, entry) in page.speech.segments().iter().zip(entries) {
        let samples = decode_wav(&segment.path, rate)?;
        let offset = samples_for(entry.start_time - span.clip_start, rate);
        mix_into(&mut clip, &samples, offset);
        raw_speech.extend_from_slice(&samples);
    }
    let speech_rms = rms(&raw_speech);

    let effect_gain = match &page.sound {
        Some(sound) => mix_effect(&mut clip, sound, speech_rms, settings, page.index)?,
        None => None,
    };

    debug!(
        page = page.index,
        clip_secs = span.clip_duration,
        speech_rms = speech_rms,
        effect_gain = ?effect_gain,
        "Built page audio"
    );

    Ok(PageAudio {
        page_index: page.index,
        track: AudioTrack::new(TrackKind::Speech, clip, rate),
        speech_rms,
        effect_gain,
    })
}

/// Loop or cut the effect to the clip, fade both ends, scale and add it.
fn mix_effect(
    clip: &mut [f32],
    sound: &Path,
    speech_rms: f64,
    settings: &MixSettings,
    page: usize,
) -> MediaResult<Option<f64>> {
    let raw = decode_wav(sound, settings.sample_rate)?;
    let effect = AudioTrack::new(TrackKind::Effect, raw, settings.sample_rate);

    let gain = match relative_gain(
        TrackKind::Effect,
        speech_rms,
        effect.rms,
        settings.sound_volume,
        settings.bg_speech_ratio,
    ) {
        Ok(gain) => gain,
        Err(MediaError::DegenerateSignal { track }) => {
            warn!(page = page, path = %sound.display(), track = %track, "Silent sound effect, skipping");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let fade = samples_for(settings.fade_duration, settings.sample_rate);
    let mut fitted = fit_length(&effect.samples, clip.len());
    fade_in(&mut fitted, fade);
    fade_out(&mut fitted, fade);
    apply_gain(&mut fitted, gain);
    mix_into(clip, &fitted, 0);

    Ok(Some(gain))
}

/// Speech loudness the music is balanced against.
pub fn reference_rms(reference: MusicLoudnessReference, page_rms: &[f64]) -> f64 {
    match reference {
        MusicLoudnessReference::LastPage => page_rms.last().copied().unwrap_or(0.0),
        MusicLoudnessReference::Mean if page_rms.is_empty() => 0.0,
        MusicLoudnessReference::Mean => page_rms.iter().sum::<f64>() / page_rms.len() as f64,
    }
}

/// Mix every page clip at its timeline position, then lay music under the
/// whole video.
pub fn mix_story(
    pages: &[Page],
    timeline: &Timeline,
    music: &Path,
    settings: &MixSettings,
) -> MediaResult<StoryMix> {
    if pages.len() != timeline.pages.len() {
        return Err(MediaError::invalid_input(format!(
            "{} pages but {} timeline spans",
            pages.len(),
            timeline.pages.len()
        )));
    }

    let rate = settings.sample_rate;
    let total = samples_for(timeline.video_duration(), rate);
    let mut master = vec![0.0f32; total];

    let page_audio = pages
        .iter()
        .zip(&timeline.pages)
        .map(|(page, span)| build_page_audio(page, span, timeline, settings))
        .collect::<MediaResult<Vec<_>>>()?;

    for (audio, span) in page_audio.iter().zip(&timeline.pages) {
        mix_into(&mut master, &audio.track.samples, samples_for(span.clip_start, rate));
    }

    let page_rms: Vec<f64> = page_audio.iter().map(|p| p.speech_rms).collect();
    let reference = reference_rms(settings.music_reference, &page_rms);

    let music_track = AudioTrack::new(TrackKind::Music, decode_wav(music, rate)?, rate);
    let music_gain = match relative_gain(
        TrackKind::Music,
        reference,
        music_track.rms,
        settings.music_volume,
        settings.bg_speech_ratio,
    ) {
        Ok(gain) => {
            let mut fitted = fit_length(&music_track.samples, total);
            apply_gain(&mut fitted, gain);
            mix_into(&mut master, &fitted, 0);
            Some(gain)
        }
        Err(MediaError::DegenerateSignal { track }) => {
            warn!(path = %music.display(), track = %track, "Silent music track, skipping");
            None
        }
        Err(e) => return Err(e),
    };

    let track = AudioTrack::new(TrackKind::Speech, master, rate);
    info!(
        duration = track.duration(),
        reference_rms = reference,
        music_gain = ?music_gain,
        "Mixed story audio"
    );

    Ok(StoryMix {
        track,
        pages: page_audio,
        reference_rms: reference,
        music_gain,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_gain() {
        let gain = relative_gain(TrackKind::Effect, 0.10, 0.05, 0.2, 0.4).unwrap();
        assert!((gain - 0.16).abs() < 1e-12);
    }

    #[test]
    fn test_zero_rms_is_degenerate() {
        for kind in [TrackKind::Effect, TrackKind::Music] {
            let err = relative_gain(kind, 0.1, 0.0, 0.2, 0.4).unwrap_err();
            assert!(matches!(err, MediaError::DegenerateSignal { track } if track == kind));
        }
    }

    #[test]
    fn test_reference_rms() {
        let rms = [0.1, 0.3];
        assert_eq!(reference_rms(MusicLoudnessReference::LastPage, &rms), 0.3);
        assert!((reference_rms(MusicLoudnessReference::Mean, &rms) - 0.2).abs() < 1e-12);
        assert_eq!(reference_rms(MusicLoudnessReference::Mean, &[]), 0.0);
        assert_eq!(reference_rms(MusicLoudnessReference::LastPage, &[]), 0.0);
    }

    #[test]
    fn test_track_duration() {
        let track = AudioTrack::new(TrackKind::Music, vec![0.5; 8000], 16000);
        assert_eq!(track.duration(), 0.5);
        assert!((track.rms - 0.5).abs() < 1e-9);
    }
}
