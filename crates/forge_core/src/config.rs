//! Showcase configuration surface
//!
//! Every section has sensible defaults, so an empty TOML document is a valid
//! configuration. Unknown keys are rejected at load time. Values that parse
//! but are out of range (zero durations, inverted zoom limits, ...) are not
//! errors: [`ShowcaseConfig::sanitize`] replaces them with safe defaults and
//! reports what it changed.

use crate::error::{ConfigError, Result};
use crate::math::{Axis, Vec3};
use crate::quality::QualityLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Smallest duration accepted anywhere in the configuration (ms)
pub const MIN_DURATION_MS: f32 = 1.0;

/// Top-level showcase configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShowcaseConfig {
    pub performance: PerformanceConfig,
    pub animation: AnimationConfig,
    pub camera: CameraConfig,
    pub gesture: GestureConfig,
    pub tools: Vec<ToolConfig>,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            performance: PerformanceConfig::default(),
            animation: AnimationConfig::default(),
            camera: CameraConfig::default(),
            gesture: GestureConfig::default(),
            tools: ToolConfig::default_lineup(),
        }
    }
}

/// Adaptive-quality settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PerformanceConfig {
    /// Frame rate the governor tries to hold
    pub target_fps: f32,
    /// Whether the governor may change quality at runtime
    pub adaptive_quality: bool,
    /// Particle cap applied to every quality profile
    pub max_particles: u32,
    /// Shadow map resolution cap (texels per side)
    pub shadow_map_size: u32,
    /// Allow antialiasing at all
    pub antialias: bool,
    /// Device pixel ratio cap
    pub pixel_ratio: f32,
    /// How often rolling averages are evaluated (ms)
    pub monitoring_interval_ms: f32,
    /// Number of samples kept in the rolling windows
    pub history_capacity: usize,
    /// Pin the quality level and disable adaptation
    pub performance_level: Option<QualityLevel>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            adaptive_quality: true,
            max_particles: 2_000,
            shadow_map_size: 2_048,
            antialias: true,
            pixel_ratio: 2.0,
            monitoring_interval_ms: 1_000.0,
            history_capacity: 60,
            performance_level: None,
        }
    }
}

/// Shared tool animation settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    /// Phase offset between consecutive tools (ms)
    pub stagger_delay_ms: f32,
    /// Period of the tools group clock (ms)
    pub loop_duration_ms: f32,
    /// Shape of each tool's float bob within its period
    pub easing: String,
    /// Start playing as soon as the showcase is built
    pub autoplay: bool,
    /// Largest secondary (physics) offset added to a tool (scene units)
    pub max_physics_offset: f32,
    /// Let tools bump into each other
    pub collisions: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            stagger_delay_ms: 200.0,
            loop_duration_ms: 24_000.0,
            easing: "easeInOutSine".to_string(),
            autoplay: true,
            max_physics_offset: 0.25,
            collisions: false,
        }
    }
}

/// Camera path settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    /// Period of the keyframe path (ms)
    pub loop_duration_ms: f32,
    /// Easing applied inside each keyframe segment
    pub path_easing: String,
    /// Revolve around the target while autonomous
    pub auto_rotate: bool,
    /// Auto-rotate rate (radians per second)
    pub auto_rotate_speed: f32,
    /// Delay after a gesture ends before autonomous playback resumes (ms)
    pub handoff_timeout_ms: f32,
    /// Exponential smoothing toward the frame target
    pub smoothing_enabled: bool,
    /// Per-frame smoothing fraction while autonomous
    pub autonomous_smoothing: f32,
    /// Per-frame smoothing fraction while user-controlled
    pub user_smoothing: f32,
    /// Orbit distance at zoom 1.0 while user-controlled
    pub orbit_distance: f32,
    /// Vertical field of view (degrees)
    pub fov: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            loop_duration_ms: 20_000.0,
            path_easing: "easeInOutSine".to_string(),
            auto_rotate: true,
            auto_rotate_speed: 0.15,
            handoff_timeout_ms: 2_000.0,
            smoothing_enabled: true,
            autonomous_smoothing: 0.05,
            user_smoothing: 0.15,
            orbit_distance: 8.0,
            fov: 45.0,
        }
    }
}

/// Gesture sensitivities and limits
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Per-axis rotation limit (radians, symmetric around zero)
    pub max_rotation: Vec3,
    /// Radians per pixel of drag
    pub rotation_sensitivity: f32,
    /// Zoom change per wheel unit
    pub zoom_sensitivity: f32,
    /// Scene units per pixel of two-finger pan
    pub pan_sensitivity: f32,
    /// Largest pan offset from the origin (scene units)
    pub max_pan: f32,
    /// Fraction of fling velocity kept after one second
    pub velocity_damping: f32,
    /// Second tap inside this window is a double tap (ms)
    pub double_tap_window_ms: f32,
    /// Maximum pointer travel for a press to count as a tap (px)
    pub tap_max_distance: f32,
    /// Maximum press duration for a tap (ms)
    pub tap_max_duration_ms: f32,
    /// Wheel deltas below this are ignored
    pub wheel_threshold: f32,
    pub voice_zoom_step: f32,
    pub voice_rotation_step: f32,
    /// Vibrate on double tap when the device supports it
    pub haptics: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.5,
            max_zoom: 3.0,
            max_rotation: Vec3::new(1.0, std::f32::consts::PI, 0.5),
            rotation_sensitivity: 0.005,
            zoom_sensitivity: 0.001,
            pan_sensitivity: 0.01,
            max_pan: 5.0,
            velocity_damping: 0.05,
            double_tap_window_ms: 300.0,
            tap_max_distance: 10.0,
            tap_max_duration_ms: 250.0,
            wheel_threshold: 1.0,
            voice_zoom_step: 0.25,
            voice_rotation_step: std::f32::consts::FRAC_PI_4,
            haptics: true,
        }
    }
}

/// Per-tool animation settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Identifier reported to the tool-selection callback
    pub id: String,
    /// Multiplier for the shared stagger delay
    pub stagger_index: u32,
    /// Rest position of the tool
    pub base_position: Vec3,
    /// Floating amplitude in abstract units (x0.01 scene units)
    pub float_amplitude: f32,
    pub float_duration_ms: f32,
    pub rotation_enabled: bool,
    pub rotation_axis: Axis,
    pub rotation_duration_ms: f32,
    /// Layer stylized physics on top of float/spin
    pub physics: bool,
    /// Bounding sphere radius used for stylized collisions
    pub collision_radius: f32,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            stagger_index: 0,
            base_position: Vec3::ZERO,
            float_amplitude: 10.0,
            float_duration_ms: 3_000.0,
            rotation_enabled: true,
            rotation_axis: Axis::Y,
            rotation_duration_ms: 12_000.0,
            physics: true,
            collision_radius: 0.6,
        }
    }
}

impl ToolConfig {
    /// Create a tool entry with defaults
    pub fn new(id: impl Into<String>, stagger_index: u32) -> Self {
        Self {
            id: id.into(),
            stagger_index,
            ..Self::default()
        }
    }

    /// Set the rest position
    pub fn at(mut self, position: Vec3) -> Self {
        self.base_position = position;
        self
    }

    /// The four showcased tools, spaced along X
    pub fn default_lineup() -> Vec<ToolConfig> {
        vec![
            ToolConfig::new("hammer", 0).at(Vec3::new(-3.0, 0.0, 0.0)),
            ToolConfig {
                rotation_axis: Axis::Z,
                rotation_duration_ms: 8_000.0,
                ..ToolConfig::new("drill", 1).at(Vec3::new(-1.0, 0.0, 0.0))
            },
            ToolConfig {
                float_amplitude: 6.0,
                ..ToolConfig::new("level", 2).at(Vec3::new(1.0, 0.0, 0.0))
            },
            ToolConfig {
                float_duration_ms: 4_000.0,
                ..ToolConfig::new("measuring-tape", 3).at(Vec3::new(3.0, 0.0, 0.0))
            },
        ]
    }
}

/// A value that was replaced while sanitizing
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigWarning {
    /// Dotted path of the offending field
    pub field: String,
    pub message: String,
}

impl ConfigWarning {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn floor_duration(value: &mut f32, field: &str, warnings: &mut Vec<ConfigWarning>) {
    if !value.is_finite() || *value < MIN_DURATION_MS {
        warnings.push(ConfigWarning::new(
            field,
            format!("duration {value} is not positive, using {MIN_DURATION_MS} ms"),
        ));
        *value = MIN_DURATION_MS;
    }
}

fn clamp_unit(value: &mut f32, fallback: f32, field: &str, warnings: &mut Vec<ConfigWarning>) {
    if !value.is_finite() || !(0.0..=1.0).contains(value) {
        warnings.push(ConfigWarning::new(
            field,
            format!("{value} is outside [0, 1], using {fallback}"),
        ));
        *value = fallback;
    }
}

fn positive_or(value: &mut f32, fallback: f32, field: &str, warnings: &mut Vec<ConfigWarning>) {
    if !value.is_finite() || *value <= 0.0 {
        warnings.push(ConfigWarning::new(
            field,
            format!("{value} must be positive, using {fallback}"),
        ));
        *value = fallback;
    }
}

fn non_negative_or(value: &mut f32, fallback: f32, field: &str, warnings: &mut Vec<ConfigWarning>) {
    if !value.is_finite() || *value < 0.0 {
        warnings.push(ConfigWarning::new(
            field,
            format!("{value} must not be negative, using {fallback}"),
        ));
        *value = fallback;
    }
}

impl ShowcaseConfig {
    /// Parse a TOML document, reject duplicate tool ids and sanitize values
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: ShowcaseConfig = toml::from_str(source)?;
        config.check_tool_ids()?;
        Ok(config.sanitized())
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    fn check_tool_ids(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for tool in &self.tools {
            if !seen.insert(tool.id.as_str()) {
                return Err(ConfigError::DuplicateTool(tool.id.clone()));
            }
        }
        Ok(())
    }

    /// Sanitize and log every replaced value
    pub fn sanitized(mut self) -> Self {
        for warning in self.sanitize() {
            tracing::warn!("config: {} - {}", warning.field, warning.message);
        }
        self
    }

    /// Replace out-of-range values with safe defaults
    ///
    /// Returns one warning per replaced value.
    pub fn sanitize(&mut self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let defaults = ShowcaseConfig::default();

        let perf = &mut self.performance;
        positive_or(
            &mut perf.target_fps,
            defaults.performance.target_fps,
            "performance.target_fps",
            &mut warnings,
        );
        positive_or(
            &mut perf.pixel_ratio,
            defaults.performance.pixel_ratio,
            "performance.pixel_ratio",
            &mut warnings,
        );
        floor_duration(
            &mut perf.monitoring_interval_ms,
            "performance.monitoring_interval_ms",
            &mut warnings,
        );
        if perf.history_capacity == 0 {
            warnings.push(ConfigWarning::new(
                "performance.history_capacity",
                format!("must hold at least one sample, using {}", defaults.performance.history_capacity),
            ));
            perf.history_capacity = defaults.performance.history_capacity;
        }

        let anim = &mut self.animation;
        non_negative_or(
            &mut anim.stagger_delay_ms,
            defaults.animation.stagger_delay_ms,
            "animation.stagger_delay_ms",
            &mut warnings,
        );
        floor_duration(&mut anim.loop_duration_ms, "animation.loop_duration_ms", &mut warnings);
        non_negative_or(
            &mut anim.max_physics_offset,
            defaults.animation.max_physics_offset,
            "animation.max_physics_offset",
            &mut warnings,
        );

        let cam = &mut self.camera;
        floor_duration(&mut cam.loop_duration_ms, "camera.loop_duration_ms", &mut warnings);
        non_negative_or(
            &mut cam.handoff_timeout_ms,
            defaults.camera.handoff_timeout_ms,
            "camera.handoff_timeout_ms",
            &mut warnings,
        );
        clamp_unit(
            &mut cam.autonomous_smoothing,
            defaults.camera.autonomous_smoothing,
            "camera.autonomous_smoothing",
            &mut warnings,
        );
        clamp_unit(
            &mut cam.user_smoothing,
            defaults.camera.user_smoothing,
            "camera.user_smoothing",
            &mut warnings,
        );
        positive_or(
            &mut cam.orbit_distance,
            defaults.camera.orbit_distance,
            "camera.orbit_distance",
            &mut warnings,
        );
        if !cam.fov.is_finite() || cam.fov <= 1.0 || cam.fov >= 179.0 {
            warnings.push(ConfigWarning::new(
                "camera.fov",
                format!("{} is not a usable field of view, using {}", cam.fov, defaults.camera.fov),
            ));
            cam.fov = defaults.camera.fov;
        }
        if !cam.auto_rotate_speed.is_finite() {
            warnings.push(ConfigWarning::new("camera.auto_rotate_speed", "not finite, using 0"));
            cam.auto_rotate_speed = 0.0;
        }

        let gesture = &mut self.gesture;
        positive_or(
            &mut gesture.min_zoom,
            defaults.gesture.min_zoom,
            "gesture.min_zoom",
            &mut warnings,
        );
        positive_or(
            &mut gesture.max_zoom,
            defaults.gesture.max_zoom,
            "gesture.max_zoom",
            &mut warnings,
        );
        if gesture.min_zoom > gesture.max_zoom {
            warnings.push(ConfigWarning::new(
                "gesture.min_zoom",
                "min_zoom exceeds max_zoom, swapping limits",
            ));
            std::mem::swap(&mut gesture.min_zoom, &mut gesture.max_zoom);
        }
        let rot = &mut gesture.max_rotation;
        if !rot.is_finite() || rot.x < 0.0 || rot.y < 0.0 || rot.z < 0.0 {
            warnings.push(ConfigWarning::new(
                "gesture.max_rotation",
                "limits must be finite and non-negative, using defaults",
            ));
            *rot = defaults.gesture.max_rotation;
        }
        clamp_unit(
            &mut gesture.velocity_damping,
            defaults.gesture.velocity_damping,
            "gesture.velocity_damping",
            &mut warnings,
        );
        floor_duration(
            &mut gesture.double_tap_window_ms,
            "gesture.double_tap_window_ms",
            &mut warnings,
        );
        floor_duration(
            &mut gesture.tap_max_duration_ms,
            "gesture.tap_max_duration_ms",
            &mut warnings,
        );
        non_negative_or(
            &mut gesture.tap_max_distance,
            defaults.gesture.tap_max_distance,
            "gesture.tap_max_distance",
            &mut warnings,
        );
        non_negative_or(
            &mut gesture.max_pan,
            defaults.gesture.max_pan,
            "gesture.max_pan",
            &mut warnings,
        );

        for (index, tool) in self.tools.iter_mut().enumerate() {
            let prefix = if tool.id.is_empty() {
                format!("tools[{index}]")
            } else {
                format!("tools.{}", tool.id)
            };
            floor_duration(
                &mut tool.float_duration_ms,
                &format!("{prefix}.float_duration_ms"),
                &mut warnings,
            );
            floor_duration(
                &mut tool.rotation_duration_ms,
                &format!("{prefix}.rotation_duration_ms"),
                &mut warnings,
            );
            if !tool.float_amplitude.is_finite() {
                warnings.push(ConfigWarning::new(
                    format!("{prefix}.float_amplitude"),
                    "not finite, using 0",
                ));
                tool.float_amplitude = 0.0;
            }
            if !tool.base_position.is_finite() {
                warnings.push(ConfigWarning::new(
                    format!("{prefix}.base_position"),
                    "not finite, using origin",
                ));
                tool.base_position = Vec3::ZERO;
            }
            non_negative_or(
                &mut tool.collision_radius,
                0.0,
                &format!("{prefix}.collision_radius"),
                &mut warnings,
            );
        }

        warnings
    }
}
