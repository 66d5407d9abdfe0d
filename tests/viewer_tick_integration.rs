//! Viewer tick integration tests: background loading, drags, flings,
//! transitions and the idle spin, driven through the public facade.

use bevy_ecs::prelude::*;
use image::RgbaImage;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

use turntable::components::displaynode::TransitionOverlay;
use turntable::components::transition::TransitionBarrier;
use turntable::events::atlasload::{AllAtlasesLoaded, AtlasLoaded};
use turntable::events::barrier::TransitionFinished;
use turntable::events::variant::VariantSelected;
use turntable::resources::rotationanimator::Playback;
use turntable::resources::viewerconfig::ViewerConfig;
use turntable::viewer::Viewer;

const DT: f32 = 1.0 / 60.0;

fn write_atlas(dir: &Path, base: &str, prefix: &str, frames: usize) {
    fs::create_dir_all(dir).unwrap();
    RgbaImage::new(10 * frames as u32, 10)
        .save(dir.join(format!("{}.png", base)))
        .unwrap();
    let entries: Vec<String> = (0..frames)
        .map(|i| {
            format!(
                r#""{}{}": {{"x": {}, "y": 0, "w": 10, "h": 10}}"#,
                prefix,
                i,
                i * 10
            )
        })
        .collect();
    fs::write(
        dir.join(format!("{}.json", base)),
        format!("{{{}}}", entries.join(", ")),
    )
    .unwrap();
}

struct Fixture {
    _tmp: TempDir,
    viewer: Viewer,
    loaded: Vec<AtlasLoaded>,
    groups: usize,
}

fn config_for(tmp: &TempDir) -> ViewerConfig {
    let mut config = ViewerConfig::with_path(tmp.path().join("turntable.ini"));
    config.viewport_width = 100.0;
    config.variants[0].atlas_dir = tmp.path().join("black");
    config.variants[1].atlas_dir = tmp.path().join("purple");
    config
}

fn wait_ready(viewer: &mut Viewer, loaded: &mut Vec<AtlasLoaded>, groups: &mut usize) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !viewer.is_ready() {
        assert!(Instant::now() < deadline, "viewer never became ready");
        viewer.tick(DT);
        loaded.extend(viewer.drain_messages::<AtlasLoaded>());
        *groups += viewer.drain_messages::<AllAtlasesLoaded>().len();
        std::thread::sleep(Duration::from_millis(2));
    }
}

fn ready_fixture() -> Fixture {
    let tmp = TempDir::new().unwrap();
    write_atlas(&tmp.path().join("black"), "black", "f", 3);
    write_atlas(&tmp.path().join("purple"), "purple", "p", 4);
    let mut viewer = Viewer::new(config_for(&tmp));
    viewer.load_variants();
    let mut loaded = Vec::new();
    let mut groups = 0;
    wait_ready(&mut viewer, &mut loaded, &mut groups);
    Fixture {
        _tmp: tmp,
        viewer,
        loaded,
        groups,
    }
}

fn play_out(viewer: &mut Viewer, finished: &mut usize) {
    for _ in 0..2_000 {
        if !viewer.animating() {
            return;
        }
        viewer.tick(DT);
        *finished += viewer.drain_messages::<TransitionFinished>().len();
    }
    panic!("animation never settled");
}

fn overlay_count(viewer: &mut Viewer) -> usize {
    let mut overlays = viewer
        .world_mut()
        .query_filtered::<Entity, With<TransitionOverlay>>();
    overlays.iter(viewer.world()).count()
}

#[test]
fn loads_both_variants_and_shows_first_black_frame() {
    let mut fx = ready_fixture();
    assert_eq!(fx.groups, 1);
    let mut slots: Vec<_> = fx.loaded.iter().map(|l| (l.slot.clone(), l.frames)).collect();
    slots.sort();
    assert_eq!(
        slots,
        vec![("black".to_string(), Some(3)), ("purple".to_string(), Some(4))]
    );
    let frame = fx.viewer.displayed_frame().unwrap();
    assert_eq!(frame.index, 0);
    assert_eq!(&*frame.name, "f0");
    assert!(Arc::ptr_eq(&frame.atlas, &fx.viewer.atlas("black").unwrap()));
    assert!(fx.viewer.atlas("purple").unwrap().is_preloaded());
    assert!(!fx.viewer.animating());
}

#[test]
fn input_is_ignored_until_loaded() {
    let tmp = TempDir::new().unwrap();
    write_atlas(&tmp.path().join("black"), "black", "f", 3);
    write_atlas(&tmp.path().join("purple"), "purple", "p", 4);
    let mut viewer = Viewer::new(config_for(&tmp));
    viewer.load_variants();
    assert!(!viewer.interaction_enabled());
    viewer.drag_began(0.0);
    viewer.drag_moved(50.0);
    assert_eq!(viewer.drag_ended(300.0), Playback::NothingToAnimate);
    assert!(viewer.select_variant("purple").is_none());
    assert!(viewer.displayed_frame().is_none());
}

#[test]
fn drag_progress_stays_wrapped_and_matches_frame() {
    let mut fx = ready_fixture();
    let viewer = &mut fx.viewer;
    let mut rng = fastrand::Rng::with_seed(7);
    let mut x = 0.0_f32;
    viewer.drag_began(x);
    for _ in 0..500 {
        x += rng.f32() * 160.0 - 80.0;
        viewer.drag_moved(x);
        let progress = viewer.progress();
        assert!((0.0..1.0).contains(&progress), "progress {} escaped", progress);
        let expected = (2.0 * progress).floor() as usize;
        assert_eq!(viewer.displayed_frame().unwrap().index, expected);
    }
    let _ = viewer.drag_ended(0.0);
}

#[test]
fn dragging_right_turns_back() {
    let mut fx = ready_fixture();
    let viewer = &mut fx.viewer;
    viewer.drag_began(0.0);
    viewer.drag_moved(25.0);
    // 0 - 0.25 wraps to 0.75 -> index floor(2 * 0.75) = 1
    assert!((viewer.progress() - 0.75).abs() < 1e-5);
    assert_eq!(viewer.displayed_frame().unwrap().index, 1);
}

#[test]
fn fling_decelerates_then_stops() {
    let mut fx = ready_fixture();
    let viewer = &mut fx.viewer;
    viewer.drag_began(0.0);
    viewer.drag_moved(-10.0);
    assert_eq!(viewer.drag_ended(-1200.0), Playback::Started);
    assert!(viewer.animating());
    let mut finished = 0;
    play_out(viewer, &mut finished);
    assert!(!viewer.animating());
    assert!((0.0..1.0).contains(&viewer.progress()));
    assert_eq!(finished, 0);
}

#[test]
fn transition_hands_off_once_to_the_new_variant() {
    let mut fx = ready_fixture();
    let viewer = &mut fx.viewer;
    let barrier = viewer.select_variant("purple").unwrap();
    let selected = viewer.drain_messages::<VariantSelected>();
    assert_eq!(
        selected,
        vec![VariantSelected {
            variant: "purple".to_string(),
            title: "Chameleon".to_string(),
            price: "$295.40".to_string(),
        }]
    );
    assert!(viewer.motion_blur().enabled);
    assert_eq!(overlay_count(viewer), 1);

    let mut finished = 0;
    let mut peak_blur = 0.0_f32;
    for _ in 0..2_000 {
        if !viewer.animating() {
            break;
        }
        viewer.tick(DT);
        peak_blur = peak_blur.max(viewer.motion_blur().radius);
        finished += viewer
            .drain_messages::<TransitionFinished>()
            .iter()
            .filter(|f| f.barrier == barrier)
            .count();
    }
    assert_eq!(finished, 1);
    assert!(peak_blur > 0.0 && peak_blur <= 15.0);
    assert_eq!(overlay_count(viewer), 0);
    assert!(viewer.world().get_entity(barrier).is_err());
    let display = viewer.display().unwrap();
    assert_eq!(display.alpha, 1.0);
    let frame = display.frame.clone().unwrap();
    assert!(Arc::ptr_eq(&frame.atlas, &viewer.atlas("purple").unwrap()));
    assert!(!viewer.motion_blur().enabled);
}

#[test]
fn drag_during_transition_snaps_to_incoming_atlas() {
    let mut fx = ready_fixture();
    let viewer = &mut fx.viewer;
    viewer.select_variant("purple").unwrap();
    viewer.tick(DT);
    viewer.drag_began(0.0);
    assert!(!viewer.animating());
    assert_eq!(overlay_count(viewer), 0);
    let display = viewer.display().unwrap();
    assert_eq!(display.alpha, 1.0);
    let frame = display.frame.clone().unwrap();
    assert!(Arc::ptr_eq(&frame.atlas, &viewer.atlas("purple").unwrap()));
    // the drag continues on the purple frames
    viewer.drag_moved(-30.0);
    let frame = viewer.displayed_frame().unwrap();
    assert!(frame.name.starts_with('p'));
}

#[test]
fn rapid_selection_keeps_a_single_transition() {
    let mut fx = ready_fixture();
    let viewer = &mut fx.viewer;
    viewer.select_variant("purple").unwrap();
    viewer.tick(DT);
    viewer.select_variant("black").unwrap();
    viewer.tick(DT);
    assert_eq!(overlay_count(viewer), 1);
    let mut barriers = viewer.world_mut().query::<&TransitionBarrier>();
    assert_eq!(barriers.iter(viewer.world()).count(), 1);
    let mut finished = 0;
    play_out(viewer, &mut finished);
    assert_eq!(finished, 1);
    let frame = viewer.displayed_frame().unwrap();
    assert!(Arc::ptr_eq(&frame.atlas, &viewer.atlas("black").unwrap()));
}

#[test]
fn spin_loops_until_paused_and_resumes() {
    let mut fx = ready_fixture();
    let viewer = &mut fx.viewer;
    assert_eq!(viewer.spin(0.0), Playback::Started);
    let mut seen = std::collections::BTreeSet::new();
    for _ in 0..120 {
        viewer.tick(DT);
        seen.insert(viewer.displayed_frame().unwrap().index);
    }
    assert_eq!(seen.len(), 3);
    assert!(viewer.animating());

    viewer.pause();
    let frozen = viewer.displayed_frame().unwrap().index;
    for _ in 0..60 {
        viewer.tick(DT);
        assert_eq!(viewer.displayed_frame().unwrap().index, frozen);
    }
    // spin while a run exists only resumes it
    assert_eq!(viewer.spin(0.0), Playback::NothingToAnimate);
    let mut moved = false;
    for _ in 0..60 {
        viewer.tick(DT);
        moved |= viewer.displayed_frame().unwrap().index != frozen;
    }
    assert!(moved);

    viewer.remove_animation(true);
    assert!(!viewer.animating());
    assert_eq!(viewer.displayed_frame().unwrap().index, 0);
}

#[test]
fn animate_to_plays_whole_laps_for_integer_targets() {
    let mut fx = ready_fixture();
    let viewer = &mut fx.viewer;
    assert_eq!(viewer.animate_to(2.0, false), Playback::Started);
    let mut changes = 0;
    let mut last = viewer.displayed_frame().unwrap().index;
    let mut finished = 0;
    while viewer.animating() {
        viewer.tick(DT);
        let now = viewer.displayed_frame().unwrap().index;
        if now != last {
            changes += 1;
            last = now;
        }
        finished += viewer.drain_messages::<TransitionFinished>().len();
        assert!(changes < 100);
    }
    // two laps over three frames end where they started
    assert_eq!(last, 0);
    assert!(changes >= 4);
    assert_eq!(finished, 0);
}

#[test]
fn absurd_lap_counts_are_refused() {
    let mut fx = ready_fixture();
    let viewer = &mut fx.viewer;
    assert_eq!(viewer.animate_to(3.0e7, false), Playback::NothingToAnimate);
    assert_eq!(viewer.animate_to(-3.0e7, true), Playback::NothingToAnimate);
    assert!(!viewer.animating());
    assert_eq!(viewer.displayed_frame().unwrap().index, 0);
    // a reasonable multi-lap target still plays
    assert_eq!(viewer.animate_to(5.5, false), Playback::Started);
}

#[test]
fn reloading_cancels_the_previous_group() {
    let tmp = TempDir::new().unwrap();
    write_atlas(&tmp.path().join("black"), "black", "f", 3);
    write_atlas(&tmp.path().join("purple"), "purple", "p", 4);
    let mut viewer = Viewer::new(config_for(&tmp));
    viewer.load_variants();
    viewer.load_variants();
    let mut loaded = Vec::new();
    let mut groups = 0;
    wait_ready(&mut viewer, &mut loaded, &mut groups);
    for _ in 0..10 {
        viewer.tick(DT);
        loaded.extend(viewer.drain_messages::<AtlasLoaded>());
        groups += viewer.drain_messages::<AllAtlasesLoaded>().len();
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(groups, 1);
    assert_eq!(loaded.len(), 2);
}

#[test]
fn missing_initial_variant_falls_back_to_another_slot() {
    let tmp = TempDir::new().unwrap();
    write_atlas(&tmp.path().join("purple"), "purple", "p", 4);
    let mut viewer = Viewer::new(config_for(&tmp));
    viewer.load_variants();
    let mut loaded = Vec::new();
    let mut groups = 0;
    wait_ready(&mut viewer, &mut loaded, &mut groups);
    assert!(loaded.contains(&AtlasLoaded {
        slot: "black".to_string(),
        frames: None
    }));
    assert!(viewer.atlas("black").is_none());
    assert!(viewer.select_variant("black").is_none());
    let frame = viewer.displayed_frame().unwrap();
    assert_eq!(&*frame.name, "p0");
}

#[test]
fn config_file_drives_variant_directories() {
    let tmp = TempDir::new().unwrap();
    write_atlas(&tmp.path().join("a"), "sheet", "a", 2);
    let ini = tmp.path().join("turntable.ini");
    fs::write(
        &ini,
        format!(
            "[viewer]\ninitial_variant = black\n\n[variant.black]\natlas = {}\n\n[variant.purple]\natlas = {}\n",
            tmp.path().join("a").display(),
            tmp.path().join("missing").display()
        ),
    )
    .unwrap();
    let mut config = ViewerConfig::with_path(&ini);
    config.load_from_file().unwrap();
    let mut viewer = Viewer::new(config);
    viewer.load_variants();
    let mut loaded = Vec::new();
    let mut groups = 0;
    wait_ready(&mut viewer, &mut loaded, &mut groups);
    assert_eq!(viewer.atlas("black").unwrap().len(), 2);
    assert_eq!(&*viewer.displayed_frame().unwrap().name, "a0");
}
