//! Camera
//!
//! - [`CameraPath`] - looping keyframe path of [`CameraPose`]s
//! - [`CameraPathController`] - autonomous playback, user orbit and handoff

mod controller;
mod path;

pub use controller::{CameraFrame, CameraMode, CameraPathController};
pub use path::{CameraPath, CameraPose};
