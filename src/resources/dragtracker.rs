//! Pan-gesture progress tracking.
//!
//! Turns horizontal pointer positions into rotation progress. Dragging right
//! by a full viewport width turns the model back by one full rotation.

use bevy_ecs::prelude::Resource;

use crate::systems::tween::wrap_progress;

/// Result of one drag movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragStep {
    /// Wrapped progress in [0, 1).
    pub progress: f32,
    pub counter_clockwise: bool,
}

#[derive(Resource, Debug, Clone)]
pub struct DragTracker {
    progress: f32,
    last_x: f32,
    viewport_width: f32,
    active: bool,
}

impl DragTracker {
    pub fn new(viewport_width: f32) -> Self {
        DragTracker {
            progress: 0.0,
            last_x: 0.0,
            viewport_width,
            active: false,
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = width;
    }

    /// Start tracking at `x`, continuing from `progress`.
    pub fn began(&mut self, x: f32, progress: f32) {
        self.progress = wrap_progress(progress);
        self.last_x = x;
        self.active = true;
    }

    /// Pointer moved to `x`. `None` when no drag is active or the viewport
    /// has no width.
    pub fn moved(&mut self, x: f32) -> Option<DragStep> {
        if !self.active || self.viewport_width <= 0.0 {
            return None;
        }
        let movement = (x - self.last_x) / self.viewport_width;
        let counter_clockwise = x > self.last_x;
        self.progress = wrap_progress(self.progress - movement);
        self.last_x = x;
        Some(DragStep {
            progress: self.progress,
            counter_clockwise,
        })
    }

    /// Stop tracking. Returns whether a drag was active.
    pub fn ended(&mut self) -> bool {
        std::mem::replace(&mut self.active, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn moving_right_turns_back_counter_clockwise() {
        let mut drag = DragTracker::new(400.0);
        drag.began(100.0, 0.5);
        let step = drag.moved(200.0).unwrap();
        assert!((step.progress - 0.25).abs() < EPSILON);
        assert!(step.counter_clockwise);
        let step = drag.moved(100.0).unwrap();
        assert!((step.progress - 0.5).abs() < EPSILON);
        assert!(!step.counter_clockwise);
    }

    #[test]
    fn wraps_past_either_end() {
        let mut drag = DragTracker::new(100.0);
        drag.began(0.0, 0.1);
        let step = drag.moved(20.0).unwrap();
        assert!((step.progress - 0.9).abs() < EPSILON);
        let step = drag.moved(-10.0).unwrap();
        assert!((step.progress - 0.2).abs() < EPSILON);
        // a full width lands back on the same spot, stored as 0
        drag.began(0.0, 0.0);
        assert_eq!(drag.moved(100.0).unwrap().progress, 0.0);
    }

    #[test]
    fn ignores_moves_outside_a_drag() {
        let mut drag = DragTracker::new(100.0);
        assert!(drag.moved(50.0).is_none());
        drag.began(0.0, 0.0);
        assert!(drag.ended());
        assert!(!drag.ended());
        assert!(drag.moved(50.0).is_none());
    }

    #[test]
    fn zero_width_viewport_does_not_move() {
        let mut drag = DragTracker::new(0.0);
        drag.began(0.0, 0.3);
        assert!(drag.moved(10.0).is_none());
        assert!((drag.progress() - 0.3).abs() < EPSILON);
    }
}
