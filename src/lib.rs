//! Turntable library.
//!
//! A frame-based "fake 3D" product turntable: sprite-sheet atlases are loaded
//! in the background, their frames are ordered into a rotation sequence, and
//! an ECS-driven animator follows drags, decelerates flings and cross-fades
//! between product variants.
//!
//! This module exposes the viewer's ECS components, resources, systems, and
//! events for use in integration tests and as a reusable library.

pub mod components;
pub mod events;
pub mod resources;
pub mod systems;
pub mod viewer;
