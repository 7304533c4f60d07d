//! Story pipeline integration tests.
//!
//! Everything up to the FFmpeg stages runs against generated fixtures; the
//! full composition test needs FFmpeg on PATH.

use std::f32::consts::PI;
use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use reel_media::audio::signal::samples_for;
use reel_media::captions::parse_srt;
use reel_media::{ComposeRequest, Composer, MediaError, SCRIPT_FILE};
use reel_models::{ComposeConfig, OutputManifest};
use tempfile::TempDir;

const RATE: u32 = 8000;

/// 1×1 RGBA PNG.
const PIXEL_PNG: [u8; 70] = [
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0x64,
    0x60, 0xf8, 0x5f, 0x0f, 0x00, 0x02, 0x87, 0x01, 0x80, 0xeb, 0x47, 0xba, 0x92, 0x00, 0x00,
    0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

fn write_tone(path: &Path, secs: f64, amplitude: f32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    let n = (secs * RATE as f64) as usize;
    for i in 0..n {
        let t = i as f32 / RATE as f32;
        let sample = amplitude * (2.0 * PI * 440.0 * t).sin();
        writer.write_sample((sample * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

fn write_image(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, PIXEL_PNG).unwrap();
}

/// Two pages: a single utterance, then two utterances with a sound effect.
fn story() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write_image(&root.join("image/p1.png"));
    write_image(&root.join("image/p2.png"));
    write_tone(&root.join("speech/p1.wav"), 2.0, 0.5);
    write_tone(&root.join("speech/p2_1.wav"), 1.0, 0.5);
    write_tone(&root.join("speech/p2_2.wav"), 1.5, 0.5);
    write_tone(&root.join("sound/p2.wav"), 0.7, 0.25);
    write_tone(&root.join("music/music.wav"), 3.0, 0.25);

    std::fs::write(
        root.join(SCRIPT_FILE),
        r#"{"pages": [
            {"story": "Once upon a time a small fox lived by the river"},
            {"story": "小狐狸每天都去河边钓鱼，晚上才回家。"}
        ]}"#,
    )
    .unwrap();

    dir
}

fn config() -> ComposeConfig {
    let mut config = ComposeConfig::default()
        .with_size(320, 180)
        .with_durations(0.5, 0.2);
    config.audio_sample_rate = RATE;
    config.caption.max_length = 12;
    config
}

#[test]
fn test_prepare_builds_consistent_plan() {
    let dir = story();
    let composer = Composer::new(config()).unwrap();

    let plan = composer
        .prepare(dir.path(), &mut StdRng::seed_from_u64(11))
        .unwrap();

    assert_eq!(plan.assets.pages.len(), 2);
    assert_eq!(plan.timeline.entries.len(), 3);
    assert!(plan.timeline.is_well_ordered());
    assert_eq!(plan.visual.effects.len(), 2);
    assert_eq!(plan.visual.transitions.boundaries(), 1);

    // Page 2 clip starts one slide before page 1's clip ends
    let spans = &plan.timeline.pages;
    assert!((spans[1].clip_start - (spans[0].clip_end() - 0.2)).abs() < 1e-9);

    // Cue indices run across pages, and every cue sits inside its page's speech
    let indices: Vec<usize> = plan.cues.iter().map(|c| c.index).collect();
    assert_eq!(indices, (1..=plan.cues.len()).collect::<Vec<_>>());
    let page_two_start = spans[1].speech_start;
    let page_two_cues: Vec<_> = plan.cues.iter().filter(|c| c.start >= page_two_start).collect();
    assert_eq!(page_two_cues.len(), plan.captions[1].len());
    assert!((page_two_cues.last().unwrap().end - spans[1].speech_end).abs() < 1e-9);
}

#[test]
fn test_same_seed_same_effects() {
    let dir = story();
    let composer = Composer::new(config()).unwrap();

    let a = composer.prepare(dir.path(), &mut StdRng::seed_from_u64(3)).unwrap();
    let b = composer.prepare(dir.path(), &mut StdRng::seed_from_u64(3)).unwrap();

    assert_eq!(a.visual, b.visual);
    assert_eq!(a.timeline, b.timeline);
}

#[tokio::test]
async fn test_mix_places_speech_and_balances_effect() {
    let dir = story();
    let composer = Composer::new(config()).unwrap();
    let plan = composer
        .prepare(dir.path(), &mut StdRng::seed_from_u64(1))
        .unwrap();

    let work = TempDir::new().unwrap();
    let mix = composer.mix(&plan, work.path()).await.unwrap();

    let expected_len = samples_for(plan.timeline.video_duration(), RATE);
    assert_eq!(mix.track.samples.len(), expected_len);
    assert_eq!(mix.pages.len(), 2);

    // Page 1 is silent until its lead (one fade) has passed
    let first = &mix.pages[0];
    let lead = samples_for(plan.timeline.pages[0].lead, RATE);
    assert!(first.track.samples[..lead].iter().all(|s| *s == 0.0));
    assert!(first.track.samples[lead..lead + 100].iter().any(|s| s.abs() > 0.1));
    assert!(first.effect_gain.is_none());

    // Effect is half as loud as the speech: 0.2 * 2 * 0.4
    let gain = mix.pages[1].effect_gain.unwrap();
    assert!((gain - 0.16).abs() < 0.01);

    // Music balanced against the last page's speech
    assert!((mix.reference_rms - mix.pages[1].speech_rms).abs() < 1e-12);
    assert!(mix.music_gain.is_some());
}

#[tokio::test]
async fn test_silent_background_tracks_are_skipped() {
    let dir = story();
    write_tone(&dir.path().join("sound/p2.wav"), 0.7, 0.0);
    write_tone(&dir.path().join("music/music.wav"), 3.0, 0.0);

    let composer = Composer::new(config()).unwrap();
    let plan = composer
        .prepare(dir.path(), &mut StdRng::seed_from_u64(1))
        .unwrap();
    let work = TempDir::new().unwrap();
    let mix = composer.mix(&plan, work.path()).await.unwrap();

    assert!(mix.pages[1].effect_gain.is_none());
    assert!(mix.music_gain.is_none());
    assert!(mix.track.samples.iter().all(|s| s.is_finite()));
}

#[test]
fn test_missing_page_image_aborts() {
    let dir = story();
    std::fs::remove_file(dir.path().join("image/p2.png")).unwrap();

    let composer = Composer::new(config()).unwrap();
    let err = composer
        .prepare(dir.path(), &mut StdRng::seed_from_u64(1))
        .unwrap_err();

    assert!(matches!(err, MediaError::MissingAsset { page: 2, .. }));
}

#[tokio::test]
#[ignore = "requires FFmpeg"]
async fn test_compose_writes_all_outputs() {
    let dir = story();
    let output = dir.path().join("out/story.mp4");
    std::fs::create_dir_all(output.parent().unwrap()).unwrap();

    let composer = Composer::new(config()).unwrap();
    let request = ComposeRequest::new(dir.path(), &output).with_seed(7);
    let manifest = composer.compose(&request).await.unwrap();

    assert!(output.is_file());
    assert_eq!(manifest.video_path, output);

    let srt = std::fs::read_to_string(&manifest.subtitle_path).unwrap();
    let cues = parse_srt(&srt).unwrap();
    assert_eq!(cues.len(), manifest.cues);

    let sidecar: OutputManifest =
        serde_json::from_str(&std::fs::read_to_string(manifest.sidecar_path()).unwrap()).unwrap();
    assert_eq!(sidecar, manifest);
    assert_eq!(manifest.sidecar_path(), dir.path().join("out/story.manifest.json"));

    // No staged leftovers next to the output
    let leftovers = std::fs::read_dir(output.parent().unwrap())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(".staged-"))
        .count();
    assert_eq!(leftovers, 0);
}
