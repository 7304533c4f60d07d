//! Visual effects compositor.
//!
//! Each page still becomes a clip with a Ken-Burns zoom or pan; clips are
//! joined with overlapping slide transitions under a caption strip.

mod effects;
pub mod filters;
mod render;

pub use effects::{choose_effect, plan_visuals};
pub use filters::CaptionStyle;
pub use render::{assembly_command, page_clip_command, Renderer};
