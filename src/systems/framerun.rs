//! Frame-run playback system.
//!
//! Advances every [`FrameRun`] by the world delta and swaps the node's frame
//! whenever the eased position moves to another entry. A finished run is
//! removed from its node and reports to its transition barrier, if any.
//! Looping runs never finish.

use bevy_ecs::prelude::*;

use crate::components::displaynode::{DisplayNode, Paused};
use crate::components::framerun::FrameRun;
use crate::components::tween::LoopMode;
use crate::events::barrier::BarrierSignal;
use crate::resources::worldtime::WorldTime;

pub fn frame_run_system(
    time: Res<WorldTime>,
    mut commands: Commands,
    mut query: Query<(Entity, &mut DisplayNode, &mut FrameRun), Without<Paused>>,
    mut signals: MessageWriter<BarrierSignal>,
) {
    let dt = time.delta;
    for (entity, mut node, mut run) in query.iter_mut() {
        run.elapsed += dt;
        if run.is_empty() {
            commands.entity(entity).remove::<FrameRun>();
            if let Some(barrier) = run.barrier {
                signals.write(BarrierSignal { barrier });
            }
            continue;
        }
        let t = run.elapsed - run.delay;
        if t < 0.0 {
            continue;
        }
        let duration = run.duration();
        let (position, finished) = match run.loop_mode {
            LoopMode::Once if t >= duration => (run.len() - 1, true),
            LoopMode::Once => (run.position_at(t), false),
            LoopMode::Loop if duration > 0.0 => (run.position_at(t.rem_euclid(duration)), false),
            LoopMode::Loop => (run.len() - 1, false),
        };
        if run.shown != Some(position) {
            node.show(&run.frames[position]);
            run.shown = Some(position);
        }
        if finished {
            commands.entity(entity).remove::<FrameRun>();
            if let Some(barrier) = run.barrier {
                signals.write(BarrierSignal { barrier });
            }
        }
    }
}
