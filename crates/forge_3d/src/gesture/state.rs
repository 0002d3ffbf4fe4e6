//! Bounded gesture state consumed by the camera

use forge_core::{GestureConfig, Vec2, Vec3};
use serde::Serialize;

/// Fling speeds below this snap to rest (px/s)
pub const VELOCITY_EPSILON: f32 = 0.5;

/// Accumulated zoom, rotation and pan
///
/// Every write goes through a method that clamps to the configured limits,
/// so the state is valid by construction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureState {
    zoom: f32,
    rotation: Vec3,
    pan: Vec2,
    /// Fling velocity (px/s), feeds rotation inertia after a drag
    velocity: Vec2,
    pub is_dragging: bool,
    pub is_pinching: bool,
    /// A drag is turning the view
    pub is_rotating: bool,
}

impl Default for GestureState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            rotation: Vec3::ZERO,
            pan: Vec2::ZERO,
            velocity: Vec2::ZERO,
            is_dragging: false,
            is_pinching: false,
            is_rotating: false,
        }
    }
}

impl GestureState {
    /// Resting state with zoom 1 clamped into the configured limits
    pub fn new(config: &GestureConfig) -> Self {
        let mut state = Self::default();
        state.set_zoom(1.0, config);
        state
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// A drag, pinch or rotate gesture is in progress
    pub fn is_active(&self) -> bool {
        self.is_dragging || self.is_pinching || self.is_rotating
    }

    pub fn set_zoom(&mut self, zoom: f32, config: &GestureConfig) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(config.min_zoom, config.max_zoom);
        }
    }

    pub fn zoom_by(&mut self, delta: f32, config: &GestureConfig) {
        self.set_zoom(self.zoom + delta, config);
    }

    pub fn set_rotation(&mut self, rotation: Vec3, config: &GestureConfig) {
        if !rotation.is_finite() {
            return;
        }
        let limit = config.max_rotation;
        self.rotation = Vec3::new(
            rotation.x.clamp(-limit.x, limit.x),
            rotation.y.clamp(-limit.y, limit.y),
            rotation.z.clamp(-limit.z, limit.z),
        );
    }

    pub fn rotate_by(&mut self, delta: Vec3, config: &GestureConfig) {
        self.set_rotation(self.rotation + delta, config);
    }

    pub fn pan_by(&mut self, delta: Vec2, config: &GestureConfig) {
        let pan = self.pan + delta;
        if !pan.is_finite() {
            return;
        }
        self.pan = Vec2::new(
            pan.x.clamp(-config.max_pan, config.max_pan),
            pan.y.clamp(-config.max_pan, config.max_pan),
        );
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        if velocity.is_finite() {
            self.velocity = velocity;
        }
    }

    /// Coast on the fling velocity and decay it
    ///
    /// Only runs while no gesture is active. Velocity is scaled by
    /// `damping^dt` and snaps to zero below [`VELOCITY_EPSILON`].
    pub fn apply_inertia(&mut self, dt: f32, config: &GestureConfig) {
        if self.is_active() || !dt.is_finite() || dt <= 0.0 || self.velocity == Vec2::ZERO {
            return;
        }

        let sensitivity = config.rotation_sensitivity;
        self.rotate_by(
            Vec3::new(self.velocity.y * sensitivity * dt, self.velocity.x * sensitivity * dt, 0.0),
            config,
        );

        self.velocity *= config.velocity_damping.powf(dt);
        if self.velocity.length() < VELOCITY_EPSILON {
            self.velocity = Vec2::ZERO;
        }
    }

    /// Back to rest with no rotation, pan, motion or active gesture
    pub fn reset(&mut self, config: &GestureConfig) {
        *self = Self::new(config);
    }

    /// Drop the view back to rest but keep the gesture flags
    pub fn reset_view(&mut self, config: &GestureConfig) {
        self.set_zoom(1.0, config);
        self.rotation = Vec3::ZERO;
        self.pan = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_clamped() {
        let config = GestureConfig::default();
        let mut state = GestureState::default();

        state.zoom_by(100.0, &config);
        assert_eq!(state.zoom(), config.max_zoom);

        state.set_zoom(-4.0, &config);
        assert_eq!(state.zoom(), config.min_zoom);

        state.set_zoom(f32::NAN, &config);
        assert_eq!(state.zoom(), config.min_zoom);
    }

    #[test]
    fn test_rest_zoom_respects_limits() {
        let config = GestureConfig {
            min_zoom: 1.5,
            max_zoom: 3.0,
            ..GestureConfig::default()
        };
        let mut state = GestureState::new(&config);
        assert_eq!(state.zoom(), 1.5);

        state.zoom_by(1.0, &config);
        state.rotate_by(Vec3::new(0.2, 0.4, 0.0), &config);
        state.is_dragging = true;
        state.reset_view(&config);
        assert_eq!(state.zoom(), 1.5);
        assert_eq!(state.rotation(), Vec3::ZERO);
        assert!(state.is_dragging);

        state.reset(&config);
        assert_eq!(state.zoom(), 1.5);
        assert!(!state.is_active());

        let narrow = GestureConfig {
            min_zoom: 0.25,
            max_zoom: 0.75,
            ..GestureConfig::default()
        };
        assert_eq!(GestureState::new(&narrow).zoom(), 0.75);
    }

    #[test]
    fn test_rotation_clamped_per_axis() {
        let config = GestureConfig::default();
        let mut state = GestureState::default();
        state.rotate_by(Vec3::new(5.0, -10.0, 0.1), &config);

        assert_eq!(state.rotation().x, config.max_rotation.x);
        assert_eq!(state.rotation().y, -config.max_rotation.y);
        assert!((state.rotation().z - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_pan_clamped() {
        let config = GestureConfig::default();
        let mut state = GestureState::default();
        state.pan_by(Vec2::new(50.0, -1.0), &config);
        assert_eq!(state.pan(), Vec2::new(config.max_pan, -1.0));
    }

    #[test]
    fn test_inertia_decays_to_rest() {
        let config = GestureConfig::default();
        let mut state = GestureState::default();
        state.set_velocity(Vec2::new(400.0, 0.0));

        state.apply_inertia(0.016, &config);
        assert!(state.rotation().y > 0.0);
        assert!(state.velocity().x < 400.0);

        for _ in 0..600 {
            state.apply_inertia(0.016, &config);
        }
        assert_eq!(state.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_inertia_paused_while_dragging() {
        let config = GestureConfig::default();
        let mut state = GestureState::default();
        state.set_velocity(Vec2::new(400.0, 0.0));
        state.is_dragging = true;

        state.apply_inertia(0.016, &config);
        assert_eq!(state.velocity().x, 400.0);
        assert_eq!(state.rotation(), Vec3::ZERO);
    }
}
