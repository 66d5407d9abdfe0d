//! Fling deceleration component.
//!
//! After a drag ends with some velocity the rotation keeps going and slows
//! down. [`ProgressCurve`] describes that motion as a progress value sampled
//! once per tick: it starts at `start` and moves by `delta` in total, the
//! remaining distance decaying along a quadratic ease-out.

use bevy_ecs::prelude::Component;

use crate::components::tween::Easing;
use crate::systems::tween::{ease, wrap_progress};

#[derive(Component, Clone, Debug)]
pub struct ProgressCurve {
    pub start: f32,
    /// Total progress travelled over the curve (subtracted from `start`).
    pub delta: f32,
    pub duration: f32,
    pub elapsed: f32,
    pub counter_clockwise: bool,
    pub easing: Easing,
}

impl ProgressCurve {
    pub fn new(start: f32, delta: f32, duration: f32, counter_clockwise: bool) -> Self {
        ProgressCurve {
            start,
            delta,
            duration,
            elapsed: 0.0,
            counter_clockwise,
            easing: Easing::QuadOut,
        }
    }

    /// Fraction of the curve played, in [0, 1].
    pub fn fraction(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Wrapped progress at the current elapsed time.
    pub fn sample(&self) -> f32 {
        wrap_progress(self.start - self.delta * ease(self.easing, self.fraction()))
    }

    pub fn is_finished(&self) -> bool {
        self.fraction() >= 1.0
    }
}
