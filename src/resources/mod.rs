//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems during execution, plus the atlas data those resources
//! own. Each submodule documents the semantics and intended usage of its
//! resource(s).
//!
//! Overview
//! - `atlasdescriptor` – sprite-sheet manifest parsing and serialization
//! - `atlasloader` – directory discovery and synchronous atlas assembly
//! - `atlasslots` – per-variant atlas slots and the load join barrier
//! - `dragtracker` – pan-gesture progress computation
//! - `framesequence` – sorted frame lists derived from an atlas
//! - `interaction` – whether user input is currently accepted
//! - `loadbridge` – worker threads and the channel back to the UI context
//! - `motionblur` – blur state written during transitions
//! - `rotationanimator` – progress-to-frame mapping and frame-run building
//! - `textureatlas` – decoded roots and normalized sub-rectangles
//! - `viewerconfig` – INI-backed viewer settings
//! - `worldtime` – viewer time and delta
pub mod atlasdescriptor;
pub mod atlasloader;
pub mod atlasslots;
pub mod dragtracker;
pub mod framesequence;
pub mod interaction;
pub mod loadbridge;
pub mod motionblur;
pub mod rotationanimator;
pub mod textureatlas;
pub mod viewerconfig;
pub mod worldtime;
