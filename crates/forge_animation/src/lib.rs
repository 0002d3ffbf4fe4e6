//! Forge Animation System
//!
//! Timing primitives for the forge showcase.
//!
//! # Features
//!
//! - **Easing**: Sine, quad, cubic, back, elastic, bounce and spring curves
//! - **Animation Clocks**: Per-entity play/pause/stop/seek/reverse/loop state
//! - **Keyframe Tracks**: Eased segment interpolation for any `Interpolate` type
//! - **Frame Scheduler**: Callback registry driven by the host or a timer

pub mod clock;
pub mod easing;
pub mod scheduler;
pub mod values;

pub use clock::{
    AnimationClock, AnimationClockState, ClockConfig, ClockState, LoopMode, PlayDirection,
};
pub use easing::{Easing, EasingDirection, EasingKind};
pub use scheduler::{
    AnimationScheduler, FrameRegistration, FrameSource, SchedulerHandle, TickCallback,
    TickCallbackId,
};
pub use values::{
    FloatKeyframe, FloatTrack, Interpolate, KeyframeTrack, TypedKeyframe, Vec3Keyframe, Vec3Track,
};
