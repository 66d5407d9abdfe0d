//! ECS components for entities.
//!
//! Submodules overview:
//! - [`displaynode`] – what is on screen: frame, alpha, geometry, and node markers
//! - [`fade`] – alpha fade used by transitions
//! - [`framerun`] – timed playback of a list of frames
//! - [`progresscurve`] – fling deceleration sampled as rotation progress
//! - [`transition`] – barrier and blur envelope of an atlas transition
//! - [`tween`] – easing curves and loop modes

pub mod displaynode;
pub mod fade;
pub mod framerun;
pub mod progresscurve;
pub mod transition;
pub mod tween;
