//! Easing curves and progress arithmetic used by the playback systems.

use crate::components::tween::Easing;

/// Apply an easing function to a normalized time value.
///
/// The input `t` is clamped to [0.0, 1.0] and transformed according to the
/// easing curve.
pub fn ease(e: Easing, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    match e {
        Easing::QuadOut => t * (2.0 - t),
        Easing::QuadInOut => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                -1.0 + (4.0 - 2.0 * t) * t
            }
        }
    }
}

/// Reduce a rotation progress into [0, 1). A full turn is stored as 0.
pub fn wrap_progress(p: f32) -> f32 {
    let r = p.rem_euclid(1.0);
    // rem_euclid of a tiny negative can round up to exactly 1.0
    if r >= 1.0 || !r.is_finite() { 0.0 } else { r }
}

/// Linearly interpolate between two floats.
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
