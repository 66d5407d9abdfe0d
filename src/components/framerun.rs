//! Frame-run playback component.
//!
//! A [`FrameRun`] shows a fixed list of frames one after another, `time_per_frame`
//! seconds each, with the run's normalized time remapped by an [`Easing`]
//! curve. At most one run is attached to a node: inserting a new one replaces
//! the old one.
//!
//! When a run that is part of a transition finishes it reports to its
//! barrier entity, see [`crate::systems::transition`].

use bevy_ecs::prelude::{Component, Entity};

use crate::components::tween::{Easing, LoopMode};
use crate::resources::framesequence::Frame;
use crate::systems::tween::ease;

#[derive(Component, Clone, Debug)]
pub struct FrameRun {
    pub frames: Vec<Frame>,
    /// Seconds per frame before easing.
    pub time_per_frame: f32,
    pub easing: Easing,
    pub loop_mode: LoopMode,
    /// Seconds to wait before the first frame.
    pub delay: f32,
    /// Seconds since the run was attached, including the delay.
    pub elapsed: f32,
    /// Position in `frames` last shown.
    pub shown: Option<usize>,
    /// Barrier to signal on completion.
    pub barrier: Option<Entity>,
}

impl FrameRun {
    pub fn new(frames: Vec<Frame>, time_per_frame: f32) -> Self {
        FrameRun {
            frames,
            time_per_frame,
            easing: Easing::EASE_IN_EASE_OUT,
            loop_mode: LoopMode::Once,
            delay: 0.0,
            elapsed: 0.0,
            shown: None,
            barrier: None,
        }
    }
    pub fn with_loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }
    pub fn with_barrier(mut self, barrier: Entity) -> Self {
        self.barrier = Some(barrier);
        self
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Playback length excluding the delay.
    pub fn duration(&self) -> f32 {
        self.frames.len() as f32 * self.time_per_frame.max(0.0)
    }

    /// Position in `frames` to show `t` seconds into playback.
    pub fn position_at(&self, t: f32) -> usize {
        let count = self.frames.len();
        if count == 0 {
            return 0;
        }
        let duration = self.duration();
        if duration <= 0.0 {
            return count - 1;
        }
        let eased = ease(self.easing, t / duration);
        ((eased * count as f32).floor() as usize).min(count - 1)
    }
}
