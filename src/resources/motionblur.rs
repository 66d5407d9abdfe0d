//! Motion-blur state read by the renderer.

use bevy_ecs::prelude::Resource;

/// Blur applied to the display nodes while a transition runs.
///
/// Written by [`blur_ramp_system`](crate::systems::fade::blur_ramp_system);
/// disabled again at the transition hand-off.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionBlur {
    pub enabled: bool,
    /// Blur radius in points.
    pub radius: f32,
}

impl MotionBlur {
    pub fn enable(&mut self) {
        self.enabled = true;
        self.radius = 0.0;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
        self.radius = 0.0;
    }
}
