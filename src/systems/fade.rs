//! Opacity fade and blur ramp systems used by atlas transitions.

use bevy_ecs::prelude::*;

use crate::components::displaynode::{DisplayNode, Paused};
use crate::components::fade::Fade;
use crate::components::transition::BlurRamp;
use crate::events::barrier::BarrierSignal;
use crate::resources::motionblur::MotionBlur;
use crate::resources::worldtime::WorldTime;
use crate::systems::tween::lerp_f32;

/// Advance fades, write node alpha, and report finished fades to their
/// barrier.
pub fn fade_system(
    time: Res<WorldTime>,
    mut commands: Commands,
    mut query: Query<(Entity, &mut DisplayNode, &mut Fade), Without<Paused>>,
    mut signals: MessageWriter<BarrierSignal>,
) {
    for (entity, mut node, mut fade) in query.iter_mut() {
        fade.elapsed += time.delta;
        let t = fade.fraction();
        node.alpha = lerp_f32(fade.from, fade.to, t).clamp(0.0, 1.0);
        if t >= 1.0 {
            commands.entity(entity).remove::<Fade>();
            if let Some(barrier) = fade.barrier {
                signals.write(BarrierSignal { barrier });
            }
        }
    }
}

/// Advance blur ramps and publish the radius while blur is enabled.
pub fn blur_ramp_system(
    time: Res<WorldTime>,
    mut blur: ResMut<MotionBlur>,
    mut ramps: Query<&mut BlurRamp, Without<Paused>>,
) {
    for mut ramp in ramps.iter_mut() {
        ramp.elapsed += time.delta;
        if blur.enabled {
            blur.radius = ramp.radius();
        }
    }
}
