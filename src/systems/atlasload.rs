//! Background atlas load bridging.
//!
//! - [`poll_atlas_loads`] drains finished worker requests each tick. A loaded
//!   atlas is handed straight back to a worker for preloading; a slot resolves
//!   once its atlas is preloaded or its directory produced nothing.
//! - [`finish_setup_system`] builds the [`RotationAnimator`] on the initial
//!   variant once the whole group resolved, and enables interaction.
//! - [`update_messages`] advances a message queue; run one per message type
//!   at the end of the tick.

use bevy_ecs::message::Message;
use bevy_ecs::prelude::*;
use log::{info, warn};

use crate::components::displaynode::{DisplayNode, PrimaryNode};
use crate::events::atlasload::{AllAtlasesLoaded, AtlasLoaded};
use crate::resources::atlasslots::AtlasSlots;
use crate::resources::interaction::Interaction;
use crate::resources::loadbridge::{LoadBridge, LoadCompletion};
use crate::resources::rotationanimator::RotationAnimator;
use crate::resources::viewerconfig::ViewerConfig;

pub fn poll_atlas_loads(
    mut bridge: ResMut<LoadBridge>,
    mut slots: ResMut<AtlasSlots>,
    mut loaded: MessageWriter<AtlasLoaded>,
    mut all_loaded: MessageWriter<AllAtlasesLoaded>,
) {
    for (id, completion) in bridge.drain() {
        let Some(slot) = slots.route(id) else {
            continue;
        };
        let name = slots.name(slot).unwrap_or_default().to_string();
        let outcome = match completion {
            LoadCompletion::Loaded(Some(atlas)) => {
                slots.preload(&mut bridge, slot, atlas);
                continue;
            }
            LoadCompletion::Loaded(None) => {
                warn!("Atlas slot '{}' produced no atlas", name);
                None
            }
            LoadCompletion::Preloaded(atlas) => Some(atlas),
        };
        let frames = outcome.as_ref().map(|atlas| atlas.len());
        let group_done = slots.resolve(slot, outcome);
        loaded.write(AtlasLoaded { slot: name, frames });
        if group_done {
            info!("All {} atlas slots resolved", slots.len());
            all_loaded.write(AllAtlasesLoaded);
        }
    }
}

pub fn finish_setup_system(
    mut commands: Commands,
    mut reader: MessageReader<AllAtlasesLoaded>,
    config: Res<ViewerConfig>,
    slots: Res<AtlasSlots>,
    animator: Option<Res<RotationAnimator>>,
    mut nodes: Query<(Entity, &mut DisplayNode), With<PrimaryNode>>,
    mut interaction: ResMut<Interaction>,
) {
    if reader.read().count() == 0 {
        return;
    }
    if animator.is_some() {
        interaction.enabled = true;
        return;
    }
    let atlas = slots.atlas(&config.initial_variant).or_else(|| {
        slots
            .slots()
            .iter()
            .find_map(|slot| slot.atlas.clone())
    });
    let Some(atlas) = atlas else {
        warn!("No variant atlas available; interaction stays disabled");
        return;
    };
    let Ok((node, mut display)) = nodes.single_mut() else {
        warn!("No primary display node to animate");
        return;
    };
    let mut animator = RotationAnimator::new(node, atlas);
    if let Some(frame) = animator.set_progress(0.0, true).or_else(|| animator.current_frame()) {
        display.show(&frame);
    }
    info!(
        "Viewer ready with {} frames from {:?}",
        animator.frames().len(),
        animator.atlas().source()
    );
    commands.insert_resource(animator);
    interaction.enabled = true;
}

/// Advance the ECS message queue for `M` so same-tick readers observe writes
/// and older messages are dropped.
pub fn update_messages<M: Message>(mut messages: ResMut<Messages<M>>) {
    messages.update();
}
