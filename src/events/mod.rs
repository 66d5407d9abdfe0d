//! Message types exchanged between viewer systems and the UI layer.
//!
//! Submodules:
//! - [`atlasload`] – slot and group completion of background atlas loads
//! - [`barrier`] – transition sub-animation completion and hand-off
//! - [`variant`] – variant selection with the label texts to show
pub mod atlasload;
pub mod barrier;
pub mod variant;
