//! Random effect and transition selection.

use rand::Rng;
use reel_models::{
    PanDirection, SlideSide, SlideshowEffectConfig, TransitionPlan, VisualEffect, VisualPlan, ZoomMode,
};
use tracing::debug;

/// Draw one Ken-Burns effect per page and one slide side per boundary.
///
/// Draws happen in page order from the single `rng`, so a seeded generator
/// reproduces the same plan.
pub fn plan_visuals<R: Rng + ?Sized>(
    page_count: usize,
    config: &SlideshowEffectConfig,
    rng: &mut R,
) -> VisualPlan {
    let mut effects = Vec::with_capacity(page_count);
    let mut sides = Vec::with_capacity(page_count.saturating_sub(1));

    for page in 0..page_count {
        if page > 0 {
            sides.push(choose_side(rng));
        }
        let effect = choose_effect(config, rng);
        debug!(page = page + 1, effect = %effect, "Chose page effect");
        effects.push(effect);
    }

    VisualPlan {
        effects,
        transitions: TransitionPlan {
            sides,
            slide_duration: config.slide_duration,
        },
    }
}

/// Zoom or move with equal odds, then an equally likely mode or direction.
pub fn choose_effect<R: Rng + ?Sized>(config: &SlideshowEffectConfig, rng: &mut R) -> VisualEffect {
    if rng.random_bool(0.5) {
        let mode = if rng.random_bool(0.5) {
            ZoomMode::In
        } else {
            ZoomMode::Out
        };
        VisualEffect::Zoom {
            mode,
            origin: config.zoom_origin,
        }
    } else {
        let direction = if rng.random_bool(0.5) {
            PanDirection::Left
        } else {
            PanDirection::Right
        };
        VisualEffect::Move { direction }
    }
}

fn choose_side<R: Rng + ?Sized>(rng: &mut R) -> SlideSide {
    if rng.random_bool(0.5) {
        SlideSide::Left
    } else {
        SlideSide::Right
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use reel_models::ZoomOrigin;

    #[test]
    fn test_plan_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let plan = plan_visuals(5, &SlideshowEffectConfig::default(), &mut rng);

        assert_eq!(plan.effects.len(), 5);
        assert_eq!(plan.transitions.boundaries(), 4);
        assert_eq!(plan.transitions.slide_duration, 0.4);
    }

    #[test]
    fn test_same_seed_same_plan() {
        let config = SlideshowEffectConfig::default();
        let a = plan_visuals(12, &config, &mut StdRng::seed_from_u64(42));
        let b = plan_visuals(12, &config, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_all_effects_reachable() {
        let config = SlideshowEffectConfig {
            zoom_origin: ZoomOrigin::TopRight,
            ..Default::default()
        };
        let plan = plan_visuals(200, &config, &mut StdRng::seed_from_u64(1));

        let labels: std::collections::HashSet<String> =
            plan.effects.iter().map(|e| e.to_string()).collect();
        assert!(labels.contains("zoom_in@top_right"));
        assert!(labels.contains("zoom_out@top_right"));
        assert!(labels.contains("move_left"));
        assert!(labels.contains("move_right"));
        assert!(plan.transitions.sides.contains(&SlideSide::Left));
        assert!(plan.transitions.sides.contains(&SlideSide::Right));
    }

    #[test]
    fn test_single_page_has_no_transitions() {
        let plan = plan_visuals(1, &SlideshowEffectConfig::default(), &mut StdRng::seed_from_u64(3));
        assert_eq!(plan.effects.len(), 1);
        assert!(plan.transitions.sides.is_empty());
    }
}
