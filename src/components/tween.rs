//! Timing curves shared by the playback components.
//!
//! [`Easing`] remaps normalized time before a [`FrameRun`](super::framerun::FrameRun)
//! picks its frame or a [`ProgressCurve`](super::progresscurve::ProgressCurve)
//! samples its progress. [`LoopMode`] decides what happens at the end.
//! See [`crate::systems::tween::ease`] for the curves themselves.

/// Determines how a playback behaves when it reaches the end.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopMode {
    /// Play once and stop.
    Once,
    /// Restart from the beginning when finished.
    Loop,
}

/// Easing functions for smooth interpolation.
///
/// These functions transform a linear `t` value (0.0 to 1.0) to create
/// different acceleration/deceleration curves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Easing {
    /// Starts fast, decelerates (quadratic).
    QuadOut,
    /// Slow start and end (quadratic).
    QuadInOut,
}

impl Easing {
    /// Curve used for frame runs: slow start and end.
    pub const EASE_IN_EASE_OUT: Easing = Easing::QuadInOut;
}
