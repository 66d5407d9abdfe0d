//! Opacity fade component.

use bevy_ecs::prelude::{Component, Entity};

/// Fades a [`DisplayNode`](super::displaynode::DisplayNode)'s alpha from
/// `from` to `to` over `duration` seconds, then removes itself.
#[derive(Component, Clone, Debug)]
pub struct Fade {
    pub from: f32,
    pub to: f32,
    pub duration: f32,
    pub elapsed: f32,
    /// Barrier to signal on completion.
    pub barrier: Option<Entity>,
}

impl Fade {
    pub fn out(duration: f32) -> Self {
        Fade {
            from: 1.0,
            to: 0.0,
            duration,
            elapsed: 0.0,
            barrier: None,
        }
    }
    pub fn with_barrier(mut self, barrier: Entity) -> Self {
        self.barrier = Some(barrier);
        self
    }

    pub fn fraction(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }
}
