//! Display node component.
//!
//! A [`DisplayNode`] is what a renderer draws: the current frame of some
//! atlas, with opacity, size, position and draw order. The node keeps the
//! sequence index of the frame it shows, updated on every frame change, so
//! the animator can recover "where the user sees the rotation" without
//! comparing textures.

use bevy_ecs::prelude::Component;

use crate::resources::framesequence::Frame;
use crate::resources::textureatlas::Texture;

#[derive(Component, Clone, Debug)]
pub struct DisplayNode {
    /// Frame on screen; `None` until something is shown.
    pub frame: Option<Frame>,
    /// Opacity in [0, 1].
    pub alpha: f32,
    pub size: [f32; 2],
    pub position: [f32; 2],
    /// Lower values draw first.
    pub z: i32,
}

impl Default for DisplayNode {
    fn default() -> Self {
        DisplayNode {
            frame: None,
            alpha: 1.0,
            size: [1.0, 1.0],
            position: [0.0, 0.0],
            z: 0,
        }
    }
}

impl DisplayNode {
    pub fn new(size: [f32; 2], position: [f32; 2], z: i32) -> Self {
        DisplayNode {
            size,
            position,
            z,
            ..Default::default()
        }
    }

    /// Swap the displayed frame.
    pub fn show(&mut self, frame: &Frame) {
        self.frame = Some(frame.clone());
    }

    /// Sequence index of the frame on screen.
    pub fn frame_index(&self) -> Option<usize> {
        self.frame.as_ref().map(|f| f.index)
    }

    pub fn texture(&self) -> Texture {
        self.frame
            .as_ref()
            .map(Frame::texture)
            .unwrap_or_else(Texture::blank)
    }

    /// Same geometry one layer below, showing nothing yet.
    pub fn underlay(&self) -> DisplayNode {
        DisplayNode {
            frame: None,
            alpha: 1.0,
            size: self.size,
            position: self.position,
            z: self.z - 1,
        }
    }
}

/// Marker for the node the rotation animator drives.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct PrimaryNode;

/// Marker for the temporary node that carries the incoming atlas during a
/// transition.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct TransitionOverlay;

/// While present, playback components on the entity do not advance.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Paused;
