//! Rotation animator resource.
//!
//! Maps a continuous rotation progress onto the discrete frames of the
//! current atlas, and builds the frame runs used for eased rotations and
//! atlas transitions.
//!
//! The animator owns the [`RotationState`]; nothing else mutates it. The
//! node it drives is referenced by entity; the world-level operations that
//! touch both live in [`crate::systems::rotation`].
//!
//! # Frame runs
//!
//! A run starts at the current frame and walks the sequence in the chosen
//! direction. One full circle from index `c` of `n` frames is
//! `c, c+1, .., n-1, 0, .., c` clockwise and `c, c-1, .., 0, n-1, .., c`
//! counter-clockwise (`n + 1` frames, both ends on `c`). A target progress
//! `p` plays one full circle per whole unit above 1, then the first
//! `floor(n * r) + 1` frames of another, where `r` is the remainder (or
//! `1 - r` for negative targets).

use bevy_ecs::prelude::{Entity, Resource};
use std::sync::Arc;

use crate::resources::framesequence::{Frame, FrameSequence};
use crate::resources::textureatlas::TextureAtlas;

/// Rotation state owned by the animator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub current_index: usize,
    /// Last progress applied, in [0, 1].
    pub progress: f32,
    /// Direction of the last rotation request.
    pub counter_clockwise: bool,
}

impl Default for RotationState {
    fn default() -> Self {
        RotationState {
            current_index: 0,
            progress: 0.0,
            counter_clockwise: false,
        }
    }
}

/// Returned by operations that may have nothing to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Playback {
    Started,
    NothingToAnimate,
}

/// Frame index for `progress` in a list of `count` frames.
pub fn frame_index(count: usize, progress: f32) -> Option<usize> {
    if count == 0 || !progress.is_finite() {
        return None;
    }
    let p = progress.clamp(0.0, 1.0);
    let index = ((count - 1) as f32 * p).floor() as usize;
    (index < count).then_some(index)
}

/// Indices of one full circle starting and ending on `start`.
pub fn full_circle(count: usize, start: usize, counter_clockwise: bool) -> Vec<usize> {
    if count == 0 {
        return Vec::new();
    }
    let start = start.min(count - 1);
    if counter_clockwise {
        (0..=start).rev().chain((start..count).rev()).collect()
    } else {
        (start..count).chain(0..=start).collect()
    }
}

/// Most whole laps a single run may play.
pub const MAX_LAPS: usize = 64;

/// Indices of the run from `start` toward `target_progress`, including
/// whole extra laps for targets beyond 1. Empty when the target needs more
/// than [`MAX_LAPS`] laps.
pub fn run_indices(count: usize, start: usize, target_progress: f32, counter_clockwise: bool) -> Vec<usize> {
    let circle = full_circle(count, start, counter_clockwise);
    if circle.is_empty() || !target_progress.is_finite() {
        return Vec::new();
    }
    let magnitude = target_progress.abs();
    let laps = if magnitude > 1.0 {
        (magnitude - 1.0).ceil()
    } else {
        0.0
    };
    if laps > MAX_LAPS as f32 {
        return Vec::new();
    }
    let remaining = magnitude - laps;
    let mut run = Vec::with_capacity((laps as usize + 1) * circle.len());
    for _ in 0..laps as usize {
        run.extend_from_slice(&circle);
    }
    let remainder = if target_progress >= 0.0 {
        remaining
    } else {
        1.0 - remaining
    };
    let last = ((circle.len() - 1) as f32 * remainder).floor() as usize;
    run.extend_from_slice(&circle[..=last.min(circle.len() - 1)]);
    run
}

/// Build the frames of a run over `frames`; see [`run_indices`].
pub fn build_run(
    frames: &FrameSequence,
    start: usize,
    target_progress: f32,
    counter_clockwise: bool,
) -> Vec<Frame> {
    frames.frames(run_indices(frames.len(), start, target_progress, counter_clockwise))
}

/// Current atlas, its frame order, and the rotation state of one node.
#[derive(Resource, Debug)]
pub struct RotationAnimator {
    node: Entity,
    frames: FrameSequence,
    state: RotationState,
}

impl RotationAnimator {
    pub fn new(node: Entity, atlas: Arc<TextureAtlas>) -> Self {
        RotationAnimator {
            node,
            frames: FrameSequence::new(atlas),
            state: RotationState::default(),
        }
    }

    pub fn node(&self) -> Entity {
        self.node
    }

    pub fn frames(&self) -> &FrameSequence {
        &self.frames
    }

    pub fn atlas(&self) -> &Arc<TextureAtlas> {
        self.frames.atlas()
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    pub fn progress(&self) -> f32 {
        self.state.progress
    }

    pub fn current_frame(&self) -> Option<Frame> {
        self.frames.frame(self.state.current_index)
    }

    /// First frame of the sequence.
    pub fn first_frame(&self) -> Option<Frame> {
        self.frames.frame(0)
    }

    /// Drag-follow update. Returns the frame to display when the index
    /// changed, `None` otherwise.
    pub fn set_progress(&mut self, progress: f32, counter_clockwise: bool) -> Option<Frame> {
        self.state.counter_clockwise = counter_clockwise;
        let index = frame_index(self.frames.len(), progress)?;
        self.state.progress = progress.clamp(0.0, 1.0);
        if index == self.state.current_index {
            return None;
        }
        self.state.current_index = index;
        self.frames.frame(index)
    }

    pub fn set_direction(&mut self, counter_clockwise: bool) {
        self.state.counter_clockwise = counter_clockwise;
    }

    /// Run from the current frame toward `target_progress` over the current
    /// frames.
    pub fn run_to(&self, target_progress: f32, counter_clockwise: bool) -> Vec<Frame> {
        build_run(&self.frames, self.state.current_index, target_progress, counter_clockwise)
    }

    /// Run from the current frame's index over another atlas's frames.
    pub fn run_over(&self, frames: &FrameSequence, target_progress: f32, counter_clockwise: bool) -> Vec<Frame> {
        build_run(frames, self.state.current_index, target_progress, counter_clockwise)
    }

    /// One endless-spin circle from the current frame, without repeating the
    /// start frame at the end.
    pub fn spin_frames(&self) -> Vec<Frame> {
        let count = self.frames.len();
        if count == 0 {
            return Vec::new();
        }
        let start = self.state.current_index.min(count - 1);
        let indices: Vec<usize> = if self.state.counter_clockwise {
            (0..start).rev().chain((start..count).rev()).collect()
        } else {
            (start..count).chain(0..start).collect()
        };
        self.frames.frames(indices)
    }

    /// Adopt the frame the node actually shows as the current one.
    pub fn reconcile(&mut self, displayed_index: Option<usize>) {
        let count = self.frames.len();
        let index = match displayed_index {
            Some(i) if i < count => i,
            _ => 0,
        };
        self.state.current_index = index;
        self.state.progress = if count > 1 {
            index as f32 / (count - 1) as f32
        } else {
            0.0
        };
    }

    /// Adopt `displayed` when it is a frame of the current atlas, otherwise
    /// fall back to the first frame.
    pub fn reconcile_with(&mut self, displayed: Option<&Frame>) {
        let index = displayed
            .filter(|f| Arc::ptr_eq(&f.atlas, self.frames.atlas()))
            .map(|f| f.index);
        self.reconcile(index);
    }

    /// Back to the first frame. Returns it for display.
    pub fn restore(&mut self) -> Option<Frame> {
        self.state.current_index = 0;
        self.state.progress = 0.0;
        self.first_frame()
    }

    /// Switch to another atlas, keeping the current index where it exists.
    pub fn replace_atlas(&mut self, atlas: Arc<TextureAtlas>) {
        self.replace_frames(FrameSequence::new(atlas));
    }

    pub fn replace_frames(&mut self, frames: FrameSequence) {
        self.frames = frames;
        let count = self.frames.len();
        if count == 0 {
            self.state.current_index = 0;
        } else {
            self.state.current_index = self.state.current_index.min(count - 1);
        }
    }
}
