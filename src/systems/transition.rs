//! Atlas transitions.
//!
//! [`perform_transition`] cross-fades the primary node from the current atlas
//! to a new one. Three sub-animations run side by side:
//!
//! - the outgoing run on the primary node, over the current atlas,
//! - the incoming run on a transient overlay node one layer below it,
//! - a fade-out of the primary node.
//!
//! A [`BlurRamp`] on the barrier entity drives [`MotionBlur`] meanwhile.
//! Each sub-animation signals the [`TransitionBarrier`] when it finishes;
//! [`transition_handoff_system`] performs the hand-off on the last signal,
//! whatever the order: the primary node takes the overlay's frame at full
//! opacity, the overlay and barrier go away and blur is switched off.
//!
//! The animator adopts the new atlas when the transition starts, so a second
//! transition requested mid-flight builds its runs from the new atlas.

use bevy_ecs::prelude::*;
use log::{debug, info, warn};
use std::sync::Arc;

use crate::components::displaynode::{DisplayNode, Paused, TransitionOverlay};
use crate::components::fade::Fade;
use crate::components::framerun::FrameRun;
use crate::components::transition::{BlurRamp, TransitionBarrier};
use crate::events::barrier::{BarrierSignal, TransitionFinished};
use crate::resources::framesequence::FrameSequence;
use crate::resources::motionblur::MotionBlur;
use crate::resources::rotationanimator::{MAX_LAPS, RotationAnimator};
use crate::resources::textureatlas::TextureAtlas;
use crate::resources::viewerconfig::ViewerConfig;
use crate::systems::rotation::remove_animation;

/// Timing of a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionSettings {
    /// Seconds per frame of both runs.
    pub time_per_frame: f32,
    /// Full rotations each run plays.
    pub laps: u32,
    pub max_blur_radius: f32,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        TransitionSettings {
            time_per_frame: 1.0 / 150.0,
            laps: 2,
            max_blur_radius: 15.0,
        }
    }
}

impl From<&ViewerConfig> for TransitionSettings {
    fn from(config: &ViewerConfig) -> Self {
        TransitionSettings {
            time_per_frame: config.transition_time_per_frame,
            laps: config.transition_laps.min(MAX_LAPS as u32),
            max_blur_radius: config.max_blur_radius,
        }
    }
}

/// Start a transition of the animator's node to `atlas`.
///
/// Any running animation or transition is removed first, reconciling the
/// current frame. Returns the barrier entity, or `None` when there is no
/// animator or the new atlas has no frames. When the node had nothing to
/// play from, the new atlas is adopted without a cross-fade.
pub fn perform_transition(
    world: &mut World,
    atlas: Arc<TextureAtlas>,
    counter_clockwise: bool,
    settings: TransitionSettings,
) -> Option<Entity> {
    if !world.contains_resource::<RotationAnimator>() {
        return None;
    }
    let incoming_frames = FrameSequence::new(atlas);
    if incoming_frames.is_empty() {
        warn!(
            "Transition to {:?} skipped: atlas has no frames",
            incoming_frames.atlas().source()
        );
        return None;
    }
    remove_animation(world, false);

    let laps = settings.laps as f32;
    let (node, outgoing, incoming) = {
        let mut animator = world.resource_mut::<RotationAnimator>();
        animator.set_direction(counter_clockwise);
        let outgoing = animator.run_to(laps, counter_clockwise);
        let incoming = animator.run_over(&incoming_frames, laps, counter_clockwise);
        animator.replace_frames(incoming_frames);
        (animator.node(), outgoing, incoming)
    };

    let primary = world.get::<DisplayNode>(node).cloned()?;
    let start = incoming.first().cloned()?;
    if outgoing.is_empty() {
        if let Some(mut display) = world.get_mut::<DisplayNode>(node) {
            display.show(&start);
        }
        world
            .resource_mut::<RotationAnimator>()
            .reconcile(Some(start.index));
        return None;
    }

    let tpf = settings.time_per_frame;
    let run_len = incoming.len();
    let duration = run_len as f32 * tpf;
    let paused = world.get::<Paused>(node).is_some();

    let mut overlay_node = primary.underlay();
    overlay_node.show(&start);
    let barrier = world.spawn_empty().id();
    let overlay = world
        .spawn((
            overlay_node,
            TransitionOverlay,
            FrameRun::new(incoming, tpf).with_barrier(barrier),
        ))
        .id();
    world.entity_mut(barrier).insert((
        TransitionBarrier::new(node, overlay),
        BlurRamp::new(settings.max_blur_radius, duration),
    ));
    world.entity_mut(node).insert((
        FrameRun::new(outgoing, tpf).with_barrier(barrier),
        Fade::out(duration).with_barrier(barrier),
    ));
    if paused {
        world.entity_mut(overlay).insert(Paused);
        world.entity_mut(barrier).insert(Paused);
    }
    world.get_resource_or_insert_with(MotionBlur::default).enable();

    info!(
        "Transition started: {} frames over {:.3}s, counter_clockwise={}",
        run_len,
        duration,
        counter_clockwise
    );
    Some(barrier)
}

/// Finish every in-flight transition immediately, as if its barrier had
/// released. Returns whether there was one.
pub fn teardown_transition(world: &mut World) -> bool {
    let barriers: Vec<(Entity, TransitionBarrier)> = world
        .query::<(Entity, &TransitionBarrier)>()
        .iter(world)
        .map(|(entity, barrier)| (entity, barrier.clone()))
        .collect();
    if barriers.is_empty() {
        return false;
    }
    for (entity, barrier) in barriers {
        debug!("Tearing down transition {:?}", entity);
        let incoming = world
            .get::<DisplayNode>(barrier.overlay)
            .and_then(|n| n.frame.clone());
        if let Ok(mut primary) = world.get_entity_mut(barrier.primary) {
            primary.remove::<(FrameRun, Fade)>();
            if let Some(mut display) = primary.get_mut::<DisplayNode>() {
                if let Some(frame) = &incoming {
                    display.show(frame);
                }
                display.alpha = 1.0;
            }
        }
        if let Ok(overlay) = world.get_entity_mut(barrier.overlay) {
            overlay.despawn();
        }
        if let Ok(barrier) = world.get_entity_mut(entity) {
            barrier.despawn();
        }
        if let Some(mut animator) = world.get_resource_mut::<RotationAnimator>() {
            animator.reconcile_with(incoming.as_ref());
        }
    }
    if let Some(mut blur) = world.get_resource_mut::<MotionBlur>() {
        blur.disable();
    }
    true
}

/// Count barrier signals and perform the hand-off when a barrier releases.
pub fn transition_handoff_system(
    mut commands: Commands,
    mut signals: MessageReader<BarrierSignal>,
    mut barriers: Query<&mut TransitionBarrier>,
    mut nodes: Query<&mut DisplayNode>,
    mut blur: ResMut<MotionBlur>,
    mut animator: Option<ResMut<RotationAnimator>>,
    mut finished: MessageWriter<TransitionFinished>,
) {
    for signal in signals.read() {
        let Ok(mut barrier) = barriers.get_mut(signal.barrier) else {
            continue;
        };
        if !barrier.arrive() {
            continue;
        }
        let incoming = nodes
            .get(barrier.overlay)
            .ok()
            .and_then(|n| n.frame.clone());
        if let Ok(mut primary) = nodes.get_mut(barrier.primary) {
            if let Some(frame) = &incoming {
                primary.show(frame);
            }
            primary.alpha = 1.0;
        }
        if let Some(animator) = animator.as_deref_mut() {
            animator.reconcile_with(incoming.as_ref());
        }
        commands.entity(barrier.overlay).try_despawn();
        commands.entity(signal.barrier).try_despawn();
        blur.disable();
        debug!("Transition {:?} handed off", signal.barrier);
        finished.write(TransitionFinished {
            barrier: signal.barrier,
        });
    }
}
