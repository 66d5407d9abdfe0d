//! Rotation operations on the animator's node.
//!
//! These run against the [`World`] from the UI context between ticks: they
//! update the [`RotationAnimator`] and attach or remove the playback
//! components the schedule then advances. A node carries at most one
//! playback at a time; starting one removes the previous one, reconciling
//! the current index with the frame actually on screen first.

use bevy_ecs::prelude::*;
use log::{debug, warn};

use crate::components::displaynode::{DisplayNode, Paused};
use crate::components::framerun::FrameRun;
use crate::components::progresscurve::ProgressCurve;
use crate::components::transition::TransitionBarrier;
use crate::components::tween::LoopMode;
use crate::resources::framesequence::Frame;
use crate::resources::rotationanimator::{MAX_LAPS, Playback, RotationAnimator};
use crate::systems::transition::teardown_transition;

fn animator_node(world: &World) -> Option<Entity> {
    world.get_resource::<RotationAnimator>().map(RotationAnimator::node)
}

fn show_on(world: &mut World, node: Entity, frame: &Frame) {
    if let Some(mut display) = world.get_mut::<DisplayNode>(node) {
        display.show(frame);
    }
}

fn reconcile_from_display(world: &mut World) {
    let Some(node) = animator_node(world) else {
        return;
    };
    let displayed = world.get::<DisplayNode>(node).and_then(|n| n.frame.clone());
    world
        .resource_mut::<RotationAnimator>()
        .reconcile_with(displayed.as_ref());
}

/// Drag-follow update: swap the displayed frame right away.
pub fn set_progress(world: &mut World, progress: f32, counter_clockwise: bool) {
    let Some((node, changed)) = world
        .get_resource_mut::<RotationAnimator>()
        .map(|mut animator| (animator.node(), animator.set_progress(progress, counter_clockwise)))
    else {
        return;
    };
    if let Some(frame) = changed {
        show_on(world, node, &frame);
    }
}

/// Stop every playback on the animator's node and any transition.
///
/// With `restore` the node goes back to the first frame; otherwise the frame
/// on screen becomes the current one.
pub fn remove_animation(world: &mut World, restore: bool) {
    teardown_transition(world);
    let Some(node) = animator_node(world) else {
        return;
    };
    if let Ok(mut entity) = world.get_entity_mut(node) {
        entity.remove::<(FrameRun, ProgressCurve)>();
    }
    if restore {
        let first = world.resource_mut::<RotationAnimator>().restore();
        if let Some(first) = first {
            show_on(world, node, &first);
        }
    } else {
        reconcile_from_display(world);
    }
}

/// Play the frames from the current one toward `target_progress`, eased in
/// and out, `time_per_frame` seconds each.
pub fn animate_to(
    world: &mut World,
    target_progress: f32,
    counter_clockwise: bool,
    time_per_frame: f32,
) -> Playback {
    if !world.contains_resource::<RotationAnimator>() {
        return Playback::NothingToAnimate;
    }
    remove_animation(world, false);
    let (node, frames) = {
        let mut animator = world.resource_mut::<RotationAnimator>();
        animator.set_direction(counter_clockwise);
        (animator.node(), animator.run_to(target_progress, counter_clockwise))
    };
    if frames.is_empty() {
        if target_progress.abs() > MAX_LAPS as f32 {
            warn!("animate_to {}: more than {} laps, ignored", target_progress, MAX_LAPS);
        }
        return Playback::NothingToAnimate;
    }
    debug!("animate_to {}: {} frames", target_progress, frames.len());
    world
        .entity_mut(node)
        .insert(FrameRun::new(frames, time_per_frame));
    Playback::Started
}

/// Keep rotating after a fling and slow down over `deceleration_duration`.
///
/// The total travel is `velocity * deceleration_duration /
/// distance_to_progress_factor`, in the last drag direction.
pub fn animate(
    world: &mut World,
    velocity: f32,
    deceleration_duration: f32,
    distance_to_progress_factor: f32,
) -> Playback {
    if !world.contains_resource::<RotationAnimator>() {
        return Playback::NothingToAnimate;
    }
    remove_animation(world, false);
    if distance_to_progress_factor == 0.0 {
        return Playback::NothingToAnimate;
    }
    let delta = velocity * deceleration_duration / distance_to_progress_factor;
    if !delta.is_finite() {
        return Playback::NothingToAnimate;
    }
    let animator = world.resource::<RotationAnimator>();
    if animator.frames().is_empty() {
        return Playback::NothingToAnimate;
    }
    let node = animator.node();
    let state = animator.state();
    world.entity_mut(node).insert(ProgressCurve::new(
        state.progress,
        delta,
        deceleration_duration,
        state.counter_clockwise,
    ));
    Playback::Started
}

/// Idle spin: rotate endlessly in the last direction after `delay` seconds.
///
/// Also resumes a paused node. Does nothing while another playback runs.
pub fn spin(world: &mut World, delay: f32, time_per_frame: f32) -> Playback {
    resume(world);
    if is_animating(world) {
        return Playback::NothingToAnimate;
    }
    let Some(animator) = world.get_resource::<RotationAnimator>() else {
        return Playback::NothingToAnimate;
    };
    let node = animator.node();
    let frames = animator.spin_frames();
    if frames.is_empty() {
        return Playback::NothingToAnimate;
    }
    world.entity_mut(node).insert(
        FrameRun::new(frames, time_per_frame)
            .with_loop_mode(LoopMode::Loop)
            .with_delay(delay),
    );
    Playback::Started
}

/// Freeze playback on the node and any transition in flight, keeping
/// positions.
pub fn pause(world: &mut World) {
    let Some(node) = animator_node(world) else {
        return;
    };
    let mut targets = vec![node];
    let mut barriers = world.query::<(Entity, &TransitionBarrier)>();
    for (entity, barrier) in barriers.iter(world) {
        targets.push(entity);
        targets.push(barrier.overlay);
    }
    let in_transition = targets.len() > 1;
    for entity in targets {
        if let Ok(mut e) = world.get_entity_mut(entity) {
            e.insert(Paused);
        }
    }
    if !in_transition {
        reconcile_from_display(world);
    }
}

/// Continue whatever [`pause`] froze.
pub fn resume(world: &mut World) {
    let paused: Vec<Entity> = world
        .query_filtered::<Entity, With<Paused>>()
        .iter(world)
        .collect();
    for entity in paused {
        if let Ok(mut e) = world.get_entity_mut(entity) {
            e.remove::<Paused>();
        }
    }
}

pub fn is_paused(world: &World) -> bool {
    animator_node(world)
        .and_then(|node| world.get::<Paused>(node))
        .is_some()
}

/// Whether the node has a playback attached or a transition is in flight.
pub fn is_animating(world: &mut World) -> bool {
    let Some(node) = animator_node(world) else {
        return false;
    };
    if world.get::<FrameRun>(node).is_some() || world.get::<ProgressCurve>(node).is_some() {
        return true;
    }
    world
        .query::<&TransitionBarrier>()
        .iter(world)
        .next()
        .is_some()
}
