//! Viewer facade.
//!
//! [`Viewer`] owns the ECS world and the per-tick schedule. The UI layer
//! drives it from a single thread: it forwards gestures and button presses,
//! calls [`Viewer::tick`] once per display frame, and reads the primary
//! node's frame, opacity and blur back for drawing.
//!
//! Schedule order per tick:
//! 1. collect finished background loads and finish setup,
//! 2. advance frame runs, fling curves, fades and the blur ramp,
//! 3. hand transitions off once their barrier released,
//! 4. advance every message queue.

use bevy_ecs::message::Message;
use bevy_ecs::prelude::*;
use log::{debug, info, warn};
use std::sync::Arc;

use crate::components::displaynode::{DisplayNode, PrimaryNode};
use crate::events::atlasload::{AllAtlasesLoaded, AtlasLoaded};
use crate::events::barrier::{BarrierSignal, TransitionFinished};
use crate::events::variant::VariantSelected;
use crate::resources::atlasslots::AtlasSlots;
use crate::resources::dragtracker::DragTracker;
use crate::resources::framesequence::Frame;
use crate::resources::interaction::Interaction;
use crate::resources::loadbridge::LoadBridge;
use crate::resources::motionblur::MotionBlur;
use crate::resources::rotationanimator::{Playback, RotationAnimator};
use crate::resources::textureatlas::TextureAtlas;
use crate::resources::viewerconfig::ViewerConfig;
use crate::resources::worldtime::WorldTime;
use crate::systems::atlasload::{finish_setup_system, poll_atlas_loads, update_messages};
use crate::systems::fade::{blur_ramp_system, fade_system};
use crate::systems::framerun::frame_run_system;
use crate::systems::progresscurve::progress_curve_system;
use crate::systems::rotation;
use crate::systems::time::update_world_time;
use crate::systems::transition::{self, TransitionSettings, transition_handoff_system};

pub struct Viewer {
    world: World,
    schedule: Schedule,
    primary: Entity,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        world.insert_resource(DragTracker::new(config.viewport_width));
        world.insert_resource(AtlasSlots::new(
            config.variants.iter().map(|v| v.name.clone()),
        ));
        world.insert_resource(LoadBridge::new());
        world.insert_resource(MotionBlur::default());
        world.insert_resource(Interaction::default());
        world.init_resource::<Messages<BarrierSignal>>();
        world.init_resource::<Messages<TransitionFinished>>();
        world.init_resource::<Messages<AtlasLoaded>>();
        world.init_resource::<Messages<AllAtlasesLoaded>>();
        world.init_resource::<Messages<VariantSelected>>();

        let side = config.viewport_width;
        let primary = world
            .spawn((DisplayNode::new([side, side], [0.0, 0.0], 0), PrimaryNode))
            .id();
        world.insert_resource(config);

        let mut schedule = Schedule::default();
        schedule.add_systems((poll_atlas_loads, finish_setup_system).chain());
        schedule.add_systems(frame_run_system.after(finish_setup_system));
        schedule.add_systems(progress_curve_system.after(finish_setup_system));
        schedule.add_systems(fade_system);
        schedule.add_systems(blur_ramp_system);
        schedule.add_systems(
            transition_handoff_system
                .after(frame_run_system)
                .after(fade_system)
                .after(blur_ramp_system),
        );
        schedule.add_systems(
            (
                update_messages::<BarrierSignal>,
                update_messages::<TransitionFinished>,
                update_messages::<AtlasLoaded>,
                update_messages::<AllAtlasesLoaded>,
                update_messages::<VariantSelected>,
            )
                .after(transition_handoff_system)
                .after(progress_curve_system),
        );

        Viewer {
            world,
            schedule,
            primary,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &ViewerConfig {
        self.world.resource::<ViewerConfig>()
    }

    /// Entity of the node the renderer draws on top.
    pub fn primary_node(&self) -> Entity {
        self.primary
    }

    /// Advance the viewer by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        update_world_time(&mut self.world, dt);
        self.schedule.run(&mut self.world);
    }

    /// Load every configured variant in the background. Interaction is off
    /// until all of them resolved.
    pub fn load_variants(&mut self) {
        self.world.resource_mut::<Interaction>().enabled = false;
        let dirs: Vec<_> = self
            .config()
            .variants
            .iter()
            .map(|v| v.atlas_dir.clone())
            .collect();
        self.world.resource_scope(|world, mut slots: Mut<AtlasSlots>| {
            if slots.begin_group() {
                warn!("No variants configured");
                world
                    .resource_mut::<Messages<AllAtlasesLoaded>>()
                    .write(AllAtlasesLoaded);
                return;
            }
            let mut bridge = world.resource_mut::<LoadBridge>();
            for (slot, dir) in dirs.iter().enumerate() {
                debug!("Loading slot {} from {:?}", slot, dir);
                slots.load(&mut bridge, slot, dir);
            }
        });
    }

    /// Loads done and the animator built.
    pub fn is_ready(&self) -> bool {
        self.interaction_enabled() && self.world.contains_resource::<RotationAnimator>()
    }

    pub fn interaction_enabled(&self) -> bool {
        self.world.resource::<Interaction>().enabled
    }

    pub fn atlas(&self, variant: &str) -> Option<Arc<TextureAtlas>> {
        self.world.resource::<AtlasSlots>().atlas(variant)
    }

    /// Transition to `variant` and announce its labels. Returns the barrier
    /// of the started transition.
    pub fn select_variant(&mut self, variant: &str) -> Option<Entity> {
        if !self.interaction_enabled() {
            return None;
        }
        let config = self.config();
        let Some(entry) = config.variant(variant).cloned() else {
            warn!("Unknown variant '{}'", variant);
            return None;
        };
        let settings = TransitionSettings::from(config);
        let Some(atlas) = self.atlas(variant) else {
            warn!("Variant '{}' has no atlas", variant);
            return None;
        };
        let barrier =
            transition::perform_transition(&mut self.world, atlas, entry.counter_clockwise, settings);
        info!("Selected variant '{}' ({}, {})", entry.name, entry.title, entry.price);
        self.world
            .resource_mut::<Messages<VariantSelected>>()
            .write(VariantSelected {
                variant: entry.name,
                title: entry.title,
                price: entry.price,
            });
        barrier
    }

    /// Pointer went down at `x`: stop any playback and follow from the frame
    /// on screen.
    pub fn drag_began(&mut self, x: f32) {
        if !self.interaction_enabled() {
            return;
        }
        rotation::remove_animation(&mut self.world, false);
        let progress = self.progress();
        self.world.resource_mut::<DragTracker>().began(x, progress);
    }

    pub fn drag_moved(&mut self, x: f32) {
        if !self.interaction_enabled() {
            return;
        }
        let Some(step) = self.world.resource_mut::<DragTracker>().moved(x) else {
            return;
        };
        rotation::set_progress(&mut self.world, step.progress, step.counter_clockwise);
    }

    /// Pointer released with horizontal `velocity` in points per second.
    pub fn drag_ended(&mut self, velocity: f32) -> Playback {
        if !self.interaction_enabled() || !self.world.resource_mut::<DragTracker>().ended() {
            return Playback::NothingToAnimate;
        }
        let config = self.config();
        let (duration, factor) = (config.deceleration_duration, config.distance_to_progress_factor);
        rotation::animate(&mut self.world, velocity, duration, factor)
    }

    pub fn set_progress(&mut self, progress: f32, counter_clockwise: bool) {
        rotation::set_progress(&mut self.world, progress, counter_clockwise);
    }

    /// [`rotation::animate_to`] at the configured rotation frame time.
    pub fn animate_to(&mut self, target_progress: f32, counter_clockwise: bool) -> Playback {
        let tpf = self.config().rotation_time_per_frame;
        rotation::animate_to(&mut self.world, target_progress, counter_clockwise, tpf)
    }

    pub fn animate(&mut self, velocity: f32) -> Playback {
        let config = self.config();
        let (duration, factor) = (config.deceleration_duration, config.distance_to_progress_factor);
        rotation::animate(&mut self.world, velocity, duration, factor)
    }

    pub fn spin(&mut self, delay: f32) -> Playback {
        let tpf = self.config().rotation_time_per_frame;
        rotation::spin(&mut self.world, delay, tpf)
    }

    pub fn remove_animation(&mut self, restore: bool) {
        rotation::remove_animation(&mut self.world, restore);
    }

    pub fn pause(&mut self) {
        rotation::pause(&mut self.world);
    }

    pub fn resume(&mut self) {
        rotation::resume(&mut self.world);
    }

    pub fn perform_transition(
        &mut self,
        atlas: Arc<TextureAtlas>,
        counter_clockwise: bool,
    ) -> Option<Entity> {
        let settings = TransitionSettings::from(self.config());
        transition::perform_transition(&mut self.world, atlas, counter_clockwise, settings)
    }

    pub fn progress(&self) -> f32 {
        self.world
            .get_resource::<RotationAnimator>()
            .map(RotationAnimator::progress)
            .unwrap_or(0.0)
    }

    pub fn animating(&mut self) -> bool {
        rotation::is_animating(&mut self.world)
    }

    pub fn displayed_frame(&self) -> Option<Frame> {
        self.world
            .get::<DisplayNode>(self.primary)
            .and_then(|n| n.frame.clone())
    }

    pub fn display(&self) -> Option<&DisplayNode> {
        self.world.get::<DisplayNode>(self.primary)
    }

    pub fn motion_blur(&self) -> MotionBlur {
        *self.world.resource::<MotionBlur>()
    }

    /// Take every queued message of type `M`.
    pub fn drain_messages<M: Message>(&mut self) -> Vec<M> {
        self.world
            .get_resource_mut::<Messages<M>>()
            .map(|mut messages| messages.drain().collect())
            .unwrap_or_default()
    }
}
