//! # Forge 3D
//!
//! Motion, camera, gesture and adaptive-quality core of the forge
//! construction-tool showcase. Geometry, materials and lighting stay with the
//! host; this crate decides where everything is each frame and how much
//! detail the device can afford.
//!
//! This crate provides:
//! - **Motion**: floating, spinning and stylized physics per tool, staggered
//!   off one shared clock
//! - **Camera**: a looping keyframe path with user orbit and handoff
//! - **Gestures**: pointer, touch, wheel and voice input to bounded state
//! - **Performance**: frame-time driven quality ladder and device probe
//!
//! ## Quick Start
//!
//! ```rust
//! use forge_3d::prelude::*;
//!
//! let config = ShowcaseConfig::default();
//! let mut scene = MemoryScene::new();
//! let hammer = scene.spawn(config.tools[0].base_position);
//!
//! let probe = StaticProbe(DeviceCapabilities::desktop());
//! let mut showcase = Showcase::new(config, scene, &probe).unwrap();
//! showcase.bind_entity("hammer", hammer);
//!
//! let report = showcase.frame(1.0 / 60.0);
//! assert!(report.tools_ticked);
//! assert!(showcase.scene().transform(hammer).is_some());
//! ```

// Orchestration
pub mod showcase;

// Per-tool motion
pub mod motion;
pub mod physics;
pub mod tools;

// Camera and input
pub mod camera;
pub mod gesture;

// Adaptive quality
pub mod performance;

// Host collaborators
pub mod scene;

pub mod error;

// Prelude for common imports
pub mod prelude;

// Re-export core types at crate root
pub use camera::{CameraFrame, CameraMode, CameraPath, CameraPathController, CameraPose};
pub use error::{Result, ShowcaseError};
pub use gesture::{GestureEvent, GestureInput, GestureMachine, GestureState, VoiceCommand};
pub use motion::{ComposedFrame, MotionBudget, MotionComposer, MotionSettings, ToolMotion};
pub use performance::{
    CapabilityProbe, DeviceCapabilities, PerformanceGovernor, PerformanceSnapshot, QualityProfile,
};
pub use scene::{EntityHandle, MemoryScene, Picker, SceneSink, Transform};
pub use showcase::{ClockTarget, FrameReport, Showcase};
pub use tools::ToolKind;
