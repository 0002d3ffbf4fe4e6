//! Prelude module for common imports
//!
//! ```rust,ignore
//! use forge_3d::prelude::*;
//! ```

// Showcase
pub use crate::error::{Result, ShowcaseError};
pub use crate::showcase::{ClockTarget, FrameReport, Showcase};
pub use crate::tools::ToolKind;

// Scene
pub use crate::scene::{EntityHandle, MemoryScene, Picker, RectPicker, SceneSink, Transform};

// Motion
pub use crate::motion::{
    ComposedFrame, FloatMotion, MotionBudget, MotionComposer, MotionSettings, SpinMotion,
    ToolMotion,
};
pub use crate::physics::{ForceIntegrator, IntegratorConfig};

// Camera
pub use crate::camera::{CameraFrame, CameraMode, CameraPath, CameraPathController, CameraPose};

// Gestures
pub use crate::gesture::{
    GestureEvent, GestureInput, GestureMachine, GestureState, Haptics, TouchPoints, VoiceCommand,
};

// Performance
pub use crate::performance::{
    CapabilityProbe, DeviceCapabilities, PerformanceGovernor, PerformanceSnapshot, QualityChange,
    QualityProfile, StaticProbe,
};

// Foundation
pub use forge_animation::{
    AnimationClock, AnimationScheduler, ClockConfig, Easing, FrameRegistration, FrameSource,
    Interpolate, SchedulerHandle,
};
pub use forge_core::{Axis, Euler, QualityLevel, ShowcaseConfig, ToolConfig, Vec2, Vec3};
