//! Components of an in-flight atlas transition.
//!
//! A transition is tracked by one barrier entity carrying a
//! [`TransitionBarrier`] and a [`BlurRamp`]. The outgoing run, the incoming
//! run and the fade each report to the barrier when they finish; the hand-off
//! happens when all of them have.

use bevy_ecs::prelude::{Component, Entity};

/// Number of sub-animations a transition waits for: outgoing run, incoming
/// run and fade-out.
pub const TRANSITION_PARTS: u8 = 3;

#[derive(Component, Clone, Debug)]
pub struct TransitionBarrier {
    /// Sub-animations that have not reported yet.
    pub remaining: u8,
    /// Node that keeps displaying after the hand-off.
    pub primary: Entity,
    /// Temporary node carrying the incoming atlas.
    pub overlay: Entity,
}

impl TransitionBarrier {
    pub fn new(primary: Entity, overlay: Entity) -> Self {
        TransitionBarrier {
            remaining: TRANSITION_PARTS,
            primary,
            overlay,
        }
    }

    /// Record one finished sub-animation. Returns `true` exactly once, on
    /// the report that releases the barrier.
    pub fn arrive(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }
}

/// Motion-blur radius envelope: rises linearly for the first `peak` fraction
/// of `duration`, then falls back to zero.
#[derive(Component, Clone, Debug)]
pub struct BlurRamp {
    pub max_radius: f32,
    pub duration: f32,
    pub elapsed: f32,
    pub peak: f32,
}

impl BlurRamp {
    pub const DEFAULT_PEAK: f32 = 0.8;

    pub fn new(max_radius: f32, duration: f32) -> Self {
        BlurRamp {
            max_radius,
            duration,
            elapsed: 0.0,
            peak: Self::DEFAULT_PEAK,
        }
    }

    pub fn radius(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        let level = if t < self.peak {
            t / self.peak
        } else {
            1.0 - (t - self.peak) / (1.0 - self.peak)
        };
        (self.max_radius * level).clamp(0.0, self.max_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::World;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn barrier_releases_once_in_any_order() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let mut barrier = TransitionBarrier::new(a, b);
        assert!(!barrier.arrive());
        assert!(!barrier.arrive());
        assert!(barrier.arrive());
        assert!(!barrier.arrive());
        assert_eq!(barrier.remaining, 0);
    }

    #[test]
    fn blur_rises_then_falls_to_zero() {
        let mut ramp = BlurRamp::new(15.0, 1.0);
        assert!(ramp.radius().abs() < EPSILON);
        ramp.elapsed = 0.4;
        assert!((ramp.radius() - 7.5).abs() < EPSILON);
        ramp.elapsed = 0.8;
        assert!((ramp.radius() - 15.0).abs() < EPSILON);
        ramp.elapsed = 0.9;
        assert!((ramp.radius() - 7.5).abs() < 1e-3);
        ramp.elapsed = 1.0;
        assert!(ramp.radius().abs() < 1e-3);
    }
}
