//! Fling deceleration system.
//!
//! Samples each node's [`ProgressCurve`] and feeds the progress to the
//! [`RotationAnimator`], which swaps the node's frame when the index changes.
//! Curves on nodes the animator does not drive are dropped.

use bevy_ecs::prelude::*;

use crate::components::displaynode::{DisplayNode, Paused};
use crate::components::progresscurve::ProgressCurve;
use crate::resources::rotationanimator::RotationAnimator;
use crate::resources::worldtime::WorldTime;

pub fn progress_curve_system(
    time: Res<WorldTime>,
    mut commands: Commands,
    mut animator: Option<ResMut<RotationAnimator>>,
    mut query: Query<(Entity, &mut DisplayNode, &mut ProgressCurve), Without<Paused>>,
) {
    for (entity, mut node, mut curve) in query.iter_mut() {
        let Some(animator) = animator.as_deref_mut().filter(|a| a.node() == entity) else {
            commands.entity(entity).remove::<ProgressCurve>();
            continue;
        };
        curve.elapsed += time.delta;
        if let Some(frame) = animator.set_progress(curve.sample(), curve.counter_clockwise) {
            node.show(&frame);
        }
        if curve.is_finished() {
            commands.entity(entity).remove::<ProgressCurve>();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::rotationanimator::tests::numbered_atlas;
    use crate::systems::time::update_world_time;

    fn tick(world: &mut World, schedule: &mut Schedule, dt: f32) {
        update_world_time(world, dt);
        schedule.run(world);
    }

    #[test]
    fn drives_the_animator_until_the_curve_ends() {
        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        let node = world.spawn(DisplayNode::default()).id();
        world.insert_resource(RotationAnimator::new(node, numbered_atlas("f", 11)));
        world
            .entity_mut(node)
            .insert(ProgressCurve::new(0.0, -0.5, 0.5, false));
        let mut schedule = Schedule::default();
        schedule.add_systems(progress_curve_system);

        tick(&mut world, &mut schedule, 0.25);
        // quad-out at half time covers three quarters: 0.375 -> index 3
        assert_eq!(world.get::<DisplayNode>(node).unwrap().frame_index(), Some(3));
        tick(&mut world, &mut schedule, 0.25);
        assert_eq!(world.get::<DisplayNode>(node).unwrap().frame_index(), Some(5));
        assert!(world.get::<ProgressCurve>(node).is_none());
        assert!((world.resource::<RotationAnimator>().progress() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn curve_without_animator_is_dropped() {
        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        let node = world
            .spawn((DisplayNode::default(), ProgressCurve::new(0.0, 0.5, 1.0, true)))
            .id();
        let mut schedule = Schedule::default();
        schedule.add_systems(progress_curve_system);
        tick(&mut world, &mut schedule, 0.1);
        assert!(world.get::<ProgressCurve>(node).is_none());
        assert!(world.get::<DisplayNode>(node).unwrap().frame.is_none());
    }
}
