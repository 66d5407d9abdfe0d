//! Viewer systems and world operations.
//!
//! Submodules overview
//! - [`atlasload`] – drain background loads, resolve slots, finish setup
//! - [`fade`] – node opacity fades and the transition blur ramp
//! - [`framerun`] – advance frame runs and swap displayed frames
//! - [`progresscurve`] – fling deceleration feeding the rotation animator
//! - [`rotation`] – rotation operations run against the world between ticks
//! - [`time`] – update viewer time and delta
//! - [`transition`] – cross-fade between atlases and the barrier hand-off
//! - [`tween`] – easing curves and progress arithmetic

pub mod atlasload;
pub mod fade;
pub mod framerun;
pub mod progresscurve;
pub mod rotation;
pub mod time;
pub mod transition;
pub mod tween;
