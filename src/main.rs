//! Turntable main entry point.
//!
//! A headless driver for the product turntable viewer built on:
//! - **bevy_ecs** for the entity-component-system tick
//! - **image** for decoding atlas roots
//! - **configparser** for the INI viewer settings
//!
//! # Commands
//!
//! - `inspect <DIR>` loads one atlas directory synchronously and prints its
//!   frames in rotation order with their normalized rectangles.
//! - `run` loads the configured variants in the background, then plays a
//!   drag with a fling, a transition to every other variant and an idle
//!   spin, logging the frames shown.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --config turntable.ini run
//! ```

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use turntable::events::atlasload::AtlasLoaded;
use turntable::events::barrier::TransitionFinished;
use turntable::events::variant::VariantSelected;
use turntable::resources::atlasloader::{self, CancelToken};
use turntable::resources::framesequence::sequence;
use turntable::resources::viewerconfig::ViewerConfig;
use turntable::viewer::Viewer;

/// Frame-based product turntable
#[derive(Parser)]
#[command(version, about = "Headless driver for the frame-based product turntable viewer")]
struct Cli {
    /// Viewer configuration file (default: ./turntable.ini).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load one atlas directory and print its frames.
    Inspect {
        /// Directory holding image + manifest pairs.
        dir: PathBuf,
    },
    /// Load the configured variants and play a scripted session.
    Run {
        /// Ticks per second.
        #[arg(long, default_value_t = 60.0)]
        fps: f32,
        /// Seconds of idle spin at the end.
        #[arg(long, default_value_t = 2.0)]
        spin_seconds: f32,
        /// Give up waiting for atlases after this many seconds.
        #[arg(long, default_value_t = 30)]
        load_timeout: u64,
    },
}

fn inspect(dir: &Path) -> i32 {
    let Some(atlas) = atlasloader::load(dir, &CancelToken::new()) else {
        eprintln!("No atlas could be loaded from {}", dir.display());
        return 1;
    };
    println!(
        "{}: {} frames in {} root(s)",
        dir.display(),
        atlas.len(),
        atlas.roots().len()
    );
    for root in atlas.roots() {
        let (w, h) = root.pixel_size();
        println!("  root {:?} {}x{} @{}x", root.path, w, h, root.scale);
    }
    for (index, name) in sequence(&atlas).iter().enumerate() {
        let texture = atlas.texture_named(name);
        let r = texture.rect;
        println!(
            "  {:>4} {:<24} root={:?} x={:.4} y={:.4} w={:.4} h={:.4}",
            index, name, texture.root, r.x, r.y, r.w, r.h
        );
    }
    0
}

/// Tick until nothing animates, logging every frame change.
fn play_out(viewer: &mut Viewer, dt: f32, limit: usize) {
    let mut last = viewer.displayed_frame().map(|f| f.index);
    for _ in 0..limit {
        if !viewer.animating() {
            break;
        }
        viewer.tick(dt);
        let now = viewer.displayed_frame().map(|f| f.index);
        if now != last {
            let blur = viewer.motion_blur();
            let alpha = viewer.display().map(|d| d.alpha).unwrap_or(1.0);
            info!(
                "frame {:?} alpha={:.2} blur={:.1} progress={:.3}",
                now,
                alpha,
                if blur.enabled { blur.radius } else { 0.0 },
                viewer.progress()
            );
            last = now;
        }
    }
}

fn run(config: ViewerConfig, fps: f32, spin_seconds: f32, load_timeout: u64) -> i32 {
    let fps = if fps > 0.0 { fps } else { 60.0 };
    let dt = 1.0 / fps;
    let tick_interval = Duration::from_secs_f32(dt);
    let variants: Vec<String> = config.variants.iter().map(|v| v.name.clone()).collect();
    let initial = config.initial_variant.clone();
    let viewport = config.viewport_width;

    let mut viewer = Viewer::new(config);
    viewer.load_variants();
    let deadline = Instant::now() + Duration::from_secs(load_timeout);
    while !viewer.is_ready() {
        if Instant::now() > deadline {
            error!("Atlases did not finish loading within {}s", load_timeout);
            return 1;
        }
        viewer.tick(dt);
        for loaded in viewer.drain_messages::<AtlasLoaded>() {
            match loaded.frames {
                Some(n) => info!("Slot '{}' ready with {} frames", loaded.slot, n),
                None => warn!("Slot '{}' has no atlas", loaded.slot),
            }
        }
        std::thread::sleep(tick_interval);
    }

    info!("Dragging across half the viewport");
    viewer.drag_began(0.0);
    let steps = 12;
    for step in 1..=steps {
        viewer.drag_moved(viewport * 0.5 * step as f32 / steps as f32);
        viewer.tick(dt);
    }
    let _ = viewer.drag_ended(900.0);
    play_out(&mut viewer, dt, 10_000);

    for variant in variants.iter().filter(|v| **v != initial).chain([&initial]) {
        if viewer.select_variant(variant).is_none() {
            warn!("No transition to '{}'", variant);
            continue;
        }
        for selected in viewer.drain_messages::<VariantSelected>() {
            info!("Now showing {} at {}", selected.title, selected.price);
        }
        play_out(&mut viewer, dt, 10_000);
        let finished = viewer.drain_messages::<TransitionFinished>().len();
        info!("Transition to '{}' finished ({} hand-off)", variant, finished);
    }

    info!("Idle spin for {:.1}s", spin_seconds);
    let _ = viewer.spin(0.0);
    let spin_ticks = (spin_seconds.max(0.0) * fps) as usize;
    let mut last = viewer.displayed_frame().map(|f| f.index);
    for _ in 0..spin_ticks {
        viewer.tick(dt);
        let now = viewer.displayed_frame().map(|f| f.index);
        if now != last {
            info!("spin frame {:?}", now);
            last = now;
        }
    }
    viewer.remove_animation(true);
    info!("Done at frame {:?}", viewer.displayed_frame().map(|f| f.index));
    0
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => ViewerConfig::with_path(path),
        None => ViewerConfig::new(),
    };
    if let Err(e) = config.load_from_file() {
        // defaults are usable without a file
        warn!("{}; using defaults", e);
    }

    let code = match cli.command {
        Command::Inspect { dir } => inspect(&dir),
        Command::Run {
            fps,
            spin_seconds,
            load_timeout,
        } => run(config, fps, spin_seconds, load_timeout),
    };
    std::process::exit(code);
}
