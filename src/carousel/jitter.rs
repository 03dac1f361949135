/// Random "messy stack" jitter for cards
///
/// Each value is the mean of three uniform samples, remapped to [-1, 1)
/// and scaled by its magnitude. The mean of three uniforms is roughly
/// bell-shaped, so most cards sit close to straight and very few end up
/// at the extremes.

use cgmath::{Deg, Vector2};
use rand::Rng;

use super::card::Transform;
use crate::config::CarouselConfig;

/// Maximum jitter per field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterMagnitudes {
    pub rotate_deg: f32,
    pub translate_x_px: f32,
    pub translate_y_px: f32,
}

impl Default for JitterMagnitudes {
    fn default() -> Self {
        Self {
            rotate_deg: 8.0,
            translate_x_px: 10.0,
            translate_y_px: 10.0,
        }
    }
}

impl From<&CarouselConfig> for JitterMagnitudes {
    fn from(config: &CarouselConfig) -> Self {
        Self {
            rotate_deg: config.jitter_rotate_deg,
            translate_x_px: config.jitter_translate_px,
            translate_y_px: config.jitter_translate_px,
        }
    }
}

/// One bell-ish sample in [-magnitude, magnitude)
pub fn sample<R: Rng + ?Sized>(rng: &mut R, magnitude: f32) -> f32 {
    let mean = (rng.random::<f32>() + rng.random::<f32>() + rng.random::<f32>()) / 3.0;
    (mean * 2.0 - 1.0) * magnitude
}

/// Generate a transform for a card entering the window.
///
/// Called once per insertion, never per frame: the card keeps this
/// transform until it leaves the window.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, magnitudes: &JitterMagnitudes) -> Transform {
    let rotate = sample(rng, magnitudes.rotate_deg);
    let x = sample(rng, magnitudes.translate_x_px);
    let y = sample(rng, magnitudes.translate_y_px);

    Transform {
        rotate: Deg(rotate),
        translate: Vector2::new(x, y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_values_stay_within_magnitude() {
        let mut rng = StdRng::seed_from_u64(7);
        let magnitudes = JitterMagnitudes::default();

        for _ in 0..5_000 {
            let t = generate(&mut rng, &magnitudes);
            assert!(t.rotate.0.abs() <= magnitudes.rotate_deg);
            assert!(t.translate.x.abs() <= magnitudes.translate_x_px);
            assert!(t.translate.y.abs() <= magnitudes.translate_y_px);
        }
    }

    #[test]
    fn test_distribution_favours_small_values() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 20_000;

        // A flat distribution would put half of the samples in the inner
        // half of the range; the mean of three puts roughly 3/4 there.
        let inner = (0..n)
            .map(|_| sample(&mut rng, 1.0))
            .filter(|v| v.abs() < 0.5)
            .count();
        let share = inner as f32 / n as f32;

        assert!(share > 0.65, "inner share was {share}");
    }

    #[test]
    fn test_zero_magnitude_is_identity() {
        let mut rng = StdRng::seed_from_u64(1);
        let magnitudes = JitterMagnitudes {
            rotate_deg: 0.0,
            translate_x_px: 0.0,
            translate_y_px: 0.0,
        };

        let t = generate(&mut rng, &magnitudes);
        assert_eq!(t.rotate.0.abs(), 0.0);
        assert_eq!(t.translate.x.abs(), 0.0);
        assert_eq!(t.translate.y.abs(), 0.0);
    }

    #[test]
    fn test_fields_are_independent_draws() {
        let mut rng = StdRng::seed_from_u64(3);
        let magnitudes = JitterMagnitudes {
            rotate_deg: 10.0,
            translate_x_px: 10.0,
            translate_y_px: 10.0,
        };

        let t = generate(&mut rng, &magnitudes);
        assert_ne!(t.rotate.0, t.translate.x);
        assert_ne!(t.translate.x, t.translate.y);
    }
}
