//! FFmpeg filter strings for page clips and final assembly.

use reel_models::{
    ComposeConfig, PanDirection, SlideSide, SlideshowEffectConfig, VisualEffect, ZoomMode, ZoomOrigin,
};

/// Script height libass assumes for SRT input; style sizes are in these units.
const ASS_PLAY_RES_Y: f64 = 288.0;

/// Label of the joined page clips in the assembly graph.
pub const JOINED_LABEL: &str = "joined";

/// Label of the final video stream in the assembly graph.
pub const VIDEO_OUT_LABEL: &str = "vout";

/// Escape a path for use inside a quoted filter option.
pub fn escape_filter_path(path: &str) -> String {
    path.replace('\\', "\\\\").replace('\'', "\\'").replace(':', "\\:")
}

/// Scale to cover `width`×`height` and crop the overflow.
pub fn cover_filter(width: u32, height: u32) -> String {
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h},setsar=1",
        w = width,
        h = height
    )
}

/// Linear zoom over `frames` frames.
///
/// `in` grows from 1 to `1 + 0.1·speed`, `out` shrinks back to 1. The
/// visible window stays pinned to `origin`.
pub fn zoom_filter(
    mode: ZoomMode,
    origin: ZoomOrigin,
    speed: f64,
    frames: u64,
    width: u32,
    height: u32,
    fps: u32,
) -> String {
    let frames = frames.max(1);
    let progress = match mode {
        ZoomMode::In => format!("on/{}", frames),
        ZoomMode::Out => format!("({}-on)/{}", frames, frames),
    };
    format!(
        "zoompan=z='1+{:.4}*{}':x='(iw-iw/zoom)*{}':y='(ih-ih/zoom)*{}':d=1:s={}x{}:fps={}",
        0.1 * speed,
        progress,
        origin.x_anchor(),
        origin.y_anchor(),
        width,
        height,
        fps
    )
}

/// Horizontal pan across the image enlarged by `1/move_ratio`.
pub fn move_filter(
    direction: PanDirection,
    move_ratio: f64,
    width: u32,
    height: u32,
    duration: f64,
) -> String {
    let big_w = even((width as f64 / move_ratio).ceil() as u32);
    let big_h = even((height as f64 / move_ratio).ceil() as u32);
    let x = match direction {
        PanDirection::Left => format!("(iw-ow)*min(t/{:.3},1)", duration),
        PanDirection::Right => format!("(iw-ow)*(1-min(t/{:.3},1))", duration),
    };
    format!(
        "{},crop={}:{}:x='{}':y='(ih-oh)/2'",
        cover_filter(big_w, big_h),
        width,
        height,
        x
    )
}

/// Fade in from and out to black.
pub fn fade_filter(duration: f64, fade: f64) -> String {
    let fade = fade.min(duration / 2.0);
    format!(
        "fade=t=in:st=0:d={:.3},fade=t=out:st={:.3}:d={:.3}",
        fade,
        (duration - fade).max(0.0),
        fade
    )
}

/// Complete single-input filter for one page clip of `duration` seconds.
pub fn page_clip_filter(
    effect: &VisualEffect,
    slideshow: &SlideshowEffectConfig,
    width: u32,
    height: u32,
    fps: u32,
    duration: f64,
) -> String {
    let motion = match effect {
        VisualEffect::Zoom { mode, origin } => {
            let frames = (duration * fps as f64).round() as u64;
            format!(
                "{},{}",
                cover_filter(width, height),
                zoom_filter(*mode, *origin, slideshow.zoom_speed, frames, width, height, fps)
            )
        }
        VisualEffect::Move { direction } => {
            move_filter(*direction, slideshow.move_ratio, width, height, duration)
        }
    };

    format!(
        "{},{},fps={},format=yuv420p",
        motion,
        fade_filter(duration, slideshow.fade_duration),
        fps
    )
}

/// Chain `xfade` slides over the clips in inputs `0..offsets.len()`.
///
/// `offsets[k]` is where clip `k + 1` starts on the timeline, which is also
/// the start of its overlap with everything before it. The result ends in
/// the `[joined]` label.
pub fn slide_chain(offsets: &[f64], sides: &[SlideSide], slide_duration: f64) -> String {
    if offsets.is_empty() {
        return format!("[0:v]null[{}]", JOINED_LABEL);
    }

    let mut parts = Vec::with_capacity(offsets.len());
    let mut previous = "0:v".to_string();

    for (k, (offset, side)) in offsets.iter().zip(sides).enumerate() {
        let label = if k + 1 == offsets.len() {
            JOINED_LABEL.to_string()
        } else {
            format!("x{}", k + 1)
        };
        parts.push(format!(
            "[{}][{}:v]xfade=transition={}:duration={:.3}:offset={:.3}[{}]",
            previous,
            k + 1,
            side.xfade_transition(),
            slide_duration,
            offset,
            label
        ));
        previous = label;
    }

    parts.join(";")
}

/// Solid black band across the bottom of the frame.
pub fn caption_strip_filter(strip_height: u32) -> String {
    format!(
        "drawbox=x=0:y=ih-{h}:w=iw:h={h}:color=black:t=fill",
        h = strip_height
    )
}

/// Caption appearance in output pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionStyle {
    pub font: Option<String>,
    pub font_size: u32,
    /// `RRGGBB`
    pub color: String,
    pub strip_height: u32,
    pub width: u32,
    pub height: u32,
}

impl CaptionStyle {
    pub fn from_config(config: &ComposeConfig) -> Self {
        Self {
            font: config.caption.font.clone(),
            font_size: config.caption_font_size(),
            color: config.caption.color.clone(),
            strip_height: config.caption_strip_height(),
            width: config.width,
            height: config.height,
        }
    }

    /// ASS `force_style` value: bottom-centred inside the strip.
    pub fn force_style(&self) -> String {
        let scale = ASS_PLAY_RES_Y / self.height as f64;
        let font_size = (self.font_size as f64 * scale).round() as u32;
        let margin = (self.strip_height.saturating_sub(self.font_size) as f64 / 2.0 * scale).round() as u32;

        let mut style = vec![
            format!("FontSize={}", font_size.max(1)),
            format!("PrimaryColour=&H00{}", bgr_hex(&self.color)),
            "BorderStyle=1".to_string(),
            "Outline=0".to_string(),
            "Shadow=0".to_string(),
            "Alignment=2".to_string(),
            format!("MarginV={}", margin),
        ];
        if let Some(font) = &self.font {
            style.insert(0, format!("FontName={}", font));
        }
        style.join(",")
    }
}

/// Burn an SRT file into the video.
pub fn subtitles_filter(srt_path: &str, style: &CaptionStyle) -> String {
    format!(
        "subtitles=filename='{}':original_size={}x{}:force_style='{}'",
        escape_filter_path(srt_path),
        style.width,
        style.height,
        style.force_style()
    )
}

/// Full `-filter_complex` graph for assembly: slides, strip, captions.
pub fn assembly_filter(
    offsets: &[f64],
    sides: &[SlideSide],
    slide_duration: f64,
    srt_path: &str,
    style: &CaptionStyle,
) -> String {
    format!(
        "{};[{}]{},{},format=yuv420p[{}]",
        slide_chain(offsets, sides, slide_duration),
        JOINED_LABEL,
        caption_strip_filter(style.strip_height),
        subtitles_filter(srt_path, style),
        VIDEO_OUT_LABEL
    )
}

fn even(value: u32) -> u32 {
    value + value % 2
}

/// `RRGGBB` to ASS `BBGGRR`.
fn bgr_hex(rgb: &str) -> String {
    if rgb.len() != 6 || !rgb.is_ascii() {
        return "FFFFFF".to_string();
    }
    format!("{}{}{}", &rgb[4..6], &rgb[2..4], &rgb[0..2]).to_uppercase()
}
