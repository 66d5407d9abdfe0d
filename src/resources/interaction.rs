use bevy_ecs::prelude::Resource;

/// Whether user input (drags, variant buttons) is accepted.
///
/// Starts disabled; enabled once every variant atlas has resolved.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct Interaction {
    pub enabled: bool,
}
