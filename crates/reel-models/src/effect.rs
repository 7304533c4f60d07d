//! Ken-Burns effects and slide transitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a zoom effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ZoomMode {
    /// Scale grows from 1.0 to `1 + 0.1·speed`
    In,
    /// Scale shrinks from `1 + 0.1·speed` to 1.0
    Out,
}

/// Point of the frame that stays fixed while zooming.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ZoomOrigin {
    #[default]
    Center,
    Left,
    Right,
    Top,
    TopLeft,
    TopRight,
    Bottom,
    BottomLeft,
    BottomRight,
}

impl ZoomOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoomOrigin::Center => "center",
            ZoomOrigin::Left => "left",
            ZoomOrigin::Right => "right",
            ZoomOrigin::Top => "top",
            ZoomOrigin::TopLeft => "top_left",
            ZoomOrigin::TopRight => "top_right",
            ZoomOrigin::Bottom => "bottom",
            ZoomOrigin::BottomLeft => "bottom_left",
            ZoomOrigin::BottomRight => "bottom_right",
        }
    }

    /// Horizontal anchor as a fraction of the free space (0 = left edge).
    pub fn x_anchor(&self) -> f64 {
        match self {
            ZoomOrigin::Left | ZoomOrigin::TopLeft | ZoomOrigin::BottomLeft => 0.0,
            ZoomOrigin::Right | ZoomOrigin::TopRight | ZoomOrigin::BottomRight => 1.0,
            ZoomOrigin::Center | ZoomOrigin::Top | ZoomOrigin::Bottom => 0.5,
        }
    }

    /// Vertical anchor as a fraction of the free space (0 = top edge).
    pub fn y_anchor(&self) -> f64 {
        match self {
            ZoomOrigin::Top | ZoomOrigin::TopLeft | ZoomOrigin::TopRight => 0.0,
            ZoomOrigin::Bottom | ZoomOrigin::BottomLeft | ZoomOrigin::BottomRight => 1.0,
            ZoomOrigin::Center | ZoomOrigin::Left | ZoomOrigin::Right => 0.5,
        }
    }
}

impl fmt::Display for ZoomOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction the image travels during a pan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PanDirection {
    Left,
    Right,
}

/// Ken-Burns effect applied to one page image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum VisualEffect {
    Zoom { mode: ZoomMode, origin: ZoomOrigin },
    Move { direction: PanDirection },
}

impl fmt::Display for VisualEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisualEffect::Zoom { mode: ZoomMode::In, origin } => write!(f, "zoom_in@{}", origin),
            VisualEffect::Zoom { mode: ZoomMode::Out, origin } => write!(f, "zoom_out@{}", origin),
            VisualEffect::Move { direction: PanDirection::Left } => write!(f, "move_left"),
            VisualEffect::Move { direction: PanDirection::Right } => write!(f, "move_right"),
        }
    }
}

/// Side an outgoing clip leaves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SlideSide {
    Left,
    Right,
}

impl SlideSide {
    /// FFmpeg `xfade` transition name for this exit side.
    pub fn xfade_transition(&self) -> &'static str {
        match self {
            SlideSide::Left => "slideleft",
            SlideSide::Right => "slideright",
        }
    }
}

/// Slide transitions between consecutive page clips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionPlan {
    /// Exit side for the boundary after page `k` (index `k - 1`)
    pub sides: Vec<SlideSide>,
    /// Overlap between consecutive clips in seconds
    pub slide_duration: f64,
}

impl TransitionPlan {
    pub fn boundaries(&self) -> usize {
        self.sides.len()
    }
}

/// All randomized visual decisions of one composition run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualPlan {
    /// One effect per page, in page order
    pub effects: Vec<VisualEffect>,
    pub transitions: TransitionPlan,
}
