//! Transition barrier messages.
//!
//! [`BarrierSignal`] is written by the playback systems when a
//! sub-animation that belongs to a transition finishes.
//! [`transition_handoff_system`](crate::systems::transition::transition_handoff_system)
//! counts them against the barrier and writes [`TransitionFinished`] once the
//! hand-off has happened.

use bevy_ecs::message::Message;
use bevy_ecs::prelude::Entity;

/// One sub-animation of the transition tracked by `barrier` finished.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierSignal {
    pub barrier: Entity,
}

/// The primary node took over the incoming atlas's frame.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionFinished {
    pub barrier: Entity,
}
