//! Camera path controller
//!
//! Plays the keyframe path while autonomous and hands placement over to the
//! gesture state while the user is interacting. After the last gesture ends
//! the controller waits out a handoff timeout before resuming the path, so
//! the camera does not snap away the moment a finger lifts.

use super::path::{CameraPath, CameraPose};
use crate::gesture::GestureState;
use forge_animation::{Easing, Interpolate};
use forge_core::{frame_rate_independent_lerp_factor, CameraConfig, Vec3};
use serde::Serialize;

/// Minimum elevation kept away from the poles (radians)
const POLE_MARGIN: f32 = 0.05;

/// Who places the camera
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CameraMode {
    #[default]
    Autonomous,
    UserControlled,
}

/// Camera output for one frame
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraFrame {
    pub pose: CameraPose,
    /// Detail budget taken from the active quality profile
    pub far_plane: f32,
    pub mode: CameraMode,
}

/// Drives the camera from the path clock and gesture state
#[derive(Clone, Debug)]
pub struct CameraPathController {
    config: CameraConfig,
    path: CameraPath,
    mode: CameraMode,
    /// Accumulated auto-rotate angle around the target (radians)
    orbit_angle: f32,
    /// Release time captured when the last gesture ended
    released_at: Option<f64>,
    /// Target of the last autonomous frame; the user orbits around it
    anchor: Vec3,
    current: Option<CameraPose>,
}

impl CameraPathController {
    pub fn new(config: CameraConfig) -> Self {
        let path = CameraPath::showcase(config.fov, Easing::from_name(&config.path_easing));
        Self::with_path(config, path)
    }

    pub fn with_path(config: CameraConfig, path: CameraPath) -> Self {
        let anchor = path.sample(0.0).map(|pose| pose.target).unwrap_or(Vec3::ZERO);
        Self {
            config,
            path,
            mode: CameraMode::Autonomous,
            orbit_angle: 0.0,
            released_at: None,
            anchor,
            current: None,
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn path(&self) -> &CameraPath {
        &self.path
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Smoothed pose of the last update
    pub fn current(&self) -> Option<&CameraPose> {
        self.current.as_ref()
    }

    pub fn orbit_angle(&self) -> f32 {
        self.orbit_angle
    }

    /// Compute this frame's camera
    ///
    /// `progress` is the camera clock's progress through the path, `dt` the
    /// frame delta in seconds and `now_ms` the host time used for the
    /// handoff timeout.
    pub fn update(
        &mut self,
        progress: f32,
        dt: f32,
        now_ms: f64,
        gesture: &GestureState,
        far_plane: f32,
    ) -> CameraFrame {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.update_mode(now_ms, gesture);

        let goal = match self.mode {
            CameraMode::Autonomous => self.autonomous_pose(progress, dt, gesture),
            CameraMode::UserControlled => self.user_pose(gesture),
        };

        let smoothing = match self.mode {
            CameraMode::Autonomous => self.config.autonomous_smoothing,
            CameraMode::UserControlled => self.config.user_smoothing,
        };

        let pose = match self.current {
            Some(current) if self.config.smoothing_enabled => {
                let t = frame_rate_independent_lerp_factor(smoothing, dt);
                current.lerp(&goal, t)
            }
            _ => goal,
        };
        self.current = Some(pose);

        CameraFrame {
            pose,
            far_plane,
            mode: self.mode,
        }
    }

    fn update_mode(&mut self, now_ms: f64, gesture: &GestureState) {
        if gesture.is_active() {
            if self.mode == CameraMode::Autonomous {
                tracing::debug!("CameraPathController: user took control");
            }
            self.mode = CameraMode::UserControlled;
            self.released_at = None;
            return;
        }

        if self.mode != CameraMode::UserControlled {
            return;
        }

        // Any gesture since the release cleared the captured timestamp
        let released_at = *self.released_at.get_or_insert(now_ms);
        if now_ms - released_at >= self.config.handoff_timeout_ms as f64 {
            self.mode = CameraMode::Autonomous;
            self.released_at = None;
            tracing::debug!("CameraPathController: resuming autonomous path");
        }
    }

    fn autonomous_pose(&mut self, progress: f32, dt: f32, gesture: &GestureState) -> CameraPose {
        let Some(mut pose) = self.path.sample(progress) else {
            return self.current.unwrap_or(CameraPose::new(
                Vec3::new(0.0, 0.0, self.config.orbit_distance),
                self.anchor,
                self.config.fov,
            ));
        };

        if self.config.auto_rotate && !gesture.is_active() {
            self.orbit_angle = (self.orbit_angle + self.config.auto_rotate_speed * dt)
                .rem_euclid(std::f32::consts::TAU);
        }

        if self.orbit_angle != 0.0 {
            let offset = pose.position - pose.target;
            let (sin, cos) = self.orbit_angle.sin_cos();
            let rotated = Vec3::new(
                offset.x * cos + offset.z * sin,
                offset.y,
                -offset.x * sin + offset.z * cos,
            );
            pose.position = pose.target + rotated;
        }

        self.anchor = pose.target;
        pose
    }

    fn user_pose(&self, gesture: &GestureState) -> CameraPose {
        let rotation = gesture.rotation();
        let pan = gesture.pan();
        let distance = self.config.orbit_distance / gesture.zoom().max(f32::EPSILON);

        let azimuth = rotation.y + self.orbit_angle;
        let elevation = rotation
            .x
            .clamp(-std::f32::consts::FRAC_PI_2 + POLE_MARGIN, std::f32::consts::FRAC_PI_2 - POLE_MARGIN);

        let (sin_az, cos_az) = azimuth.sin_cos();
        let (sin_el, cos_el) = elevation.sin_cos();
        let target = self.anchor + Vec3::new(pan.x, pan.y, 0.0);
        let offset = Vec3::new(sin_az * cos_el, sin_el, cos_az * cos_el) * distance;

        CameraPose::new(target + offset, target, self.config.fov)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::GestureConfig;

    fn still_config() -> CameraConfig {
        CameraConfig {
            smoothing_enabled: false,
            auto_rotate: false,
            ..CameraConfig::default()
        }
    }

    #[test]
    fn test_follows_path_when_autonomous() {
        let mut controller = CameraPathController::new(still_config());
        let idle = GestureState::default();

        let frame = controller.update(0.0, 0.016, 0.0, &idle, 80.0);
        let expected = controller.path().sample(0.0).unwrap();
        assert_eq!(frame.pose, expected);
        assert_eq!(frame.mode, CameraMode::Autonomous);
        assert_eq!(frame.far_plane, 80.0);

        // The path closes on itself
        let end = controller.update(1.0, 0.016, 16.0, &idle, 80.0);
        assert!(end.pose.approx_eq(&frame.pose, 1e-5));
    }

    #[test]
    fn test_handoff_timeout() {
        let config = still_config();
        let timeout = config.handoff_timeout_ms as f64;
        let mut controller = CameraPathController::new(config);

        let mut gesture = GestureState::default();
        gesture.is_dragging = true;
        let frame = controller.update(0.2, 0.016, 0.0, &gesture, 80.0);
        assert_eq!(frame.mode, CameraMode::UserControlled);

        gesture.is_dragging = false;
        controller.update(0.2, 0.016, 100.0, &gesture, 80.0);
        let frame = controller.update(0.2, 0.016, 100.0 + timeout - 1.0, &gesture, 80.0);
        assert_eq!(frame.mode, CameraMode::UserControlled);

        // A new gesture during the wait restarts it
        gesture.is_pinching = true;
        controller.update(0.2, 0.016, 100.0 + timeout - 0.5, &gesture, 80.0);
        gesture.is_pinching = false;
        let frame = controller.update(0.2, 0.016, 100.0 + timeout + 10.0, &gesture, 80.0);
        assert_eq!(frame.mode, CameraMode::UserControlled);

        let frame = controller.update(0.2, 0.016, 200.0 + 2.0 * timeout, &gesture, 80.0);
        assert_eq!(frame.mode, CameraMode::Autonomous);
    }

    #[test]
    fn test_user_zoom_sets_distance() {
        let config = still_config();
        let base = config.orbit_distance;
        let mut controller = CameraPathController::new(config);
        let gesture_config = GestureConfig::default();

        let mut gesture = GestureState::default();
        gesture.is_dragging = true;
        gesture.set_zoom(2.0, &gesture_config);

        let frame = controller.update(0.0, 0.016, 0.0, &gesture, 80.0);
        assert!((frame.pose.distance() - base / 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_auto_rotate_preserves_height() {
        let config = CameraConfig {
            smoothing_enabled: false,
            auto_rotate: true,
            auto_rotate_speed: 1.0,
            ..CameraConfig::default()
        };
        let mut controller = CameraPathController::new(config);
        let idle = GestureState::default();

        let plain = controller.path().sample(0.0).unwrap();
        let frame = controller.update(0.0, 0.5, 0.0, &idle, 80.0);

        assert!((controller.orbit_angle() - 0.5).abs() < 1e-6);
        assert!((frame.pose.position.y - plain.position.y).abs() < 1e-5);
        assert!((frame.pose.distance() - plain.distance()).abs() < 1e-4);
        assert!((frame.pose.position.x - plain.position.x).abs() > 0.1);
    }

    #[test]
    fn test_smoothing_is_gradual() {
        let config = CameraConfig {
            auto_rotate: false,
            ..CameraConfig::default()
        };
        let mut controller = CameraPathController::new(config);
        let idle = GestureState::default();

        let first = controller.update(0.0, 0.016, 0.0, &idle, 80.0);
        let goal = controller.path().sample(0.5).unwrap();
        let next = controller.update(0.5, 1.0 / 60.0, 16.0, &idle, 80.0);

        let moved = first.pose.position.distance(next.pose.position);
        let full = first.pose.position.distance(goal.position);
        assert!(moved > 0.0 && moved < full * 0.1);
    }
}
