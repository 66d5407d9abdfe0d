//! Atlas loading messages.

use bevy_ecs::message::Message;

/// A variant slot resolved. `frames` is `None` when the slot's directory
/// produced no atlas.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct AtlasLoaded {
    pub slot: String,
    pub frames: Option<usize>,
}

/// Every slot of the current load group resolved. Written once per group.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllAtlasesLoaded;
