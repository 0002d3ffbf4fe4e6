//! Motion composer
//!
//! Blends floating, spinning and stylized physics into one transform per
//! tool per frame. All tools sample one shared clock; stagger is a constant
//! time offset per tool, so every tool has the same period but a shifted
//! phase.
//!
//! ```text
//!   clock time ──+ stagger──▶ float offset (y) ──┐
//!                        └──▶ spin angle (axis) ─┼──▶ Transform
//!   float position ──▶ integrator ──▶ offset ────┘
//! ```

use crate::performance::QualityProfile;
use crate::physics::{check_collision, resolve_collision, BoundingSphere, ForceIntegrator, IntegratorConfig};
use crate::scene::Transform;
use forge_animation::Easing;
use forge_core::{AnimationConfig, Axis, Euler, ToolConfig, Vec3, MIN_DURATION_MS};
use serde::Serialize;
use smallvec::SmallVec;
use std::f32::consts::TAU;

/// Scene units per abstract float-amplitude unit
pub const FLOAT_UNIT: f32 = 0.01;

/// Sinusoidal vertical bob
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatMotion {
    /// Abstract units, scaled by [`FLOAT_UNIT`]
    pub amplitude: f32,
    pub duration_ms: f32,
}

impl FloatMotion {
    /// Normalized position in the float period, in `[0, 1)`
    pub fn phase(&self, time_ms: f64) -> f32 {
        normalized(time_ms, self.duration_ms)
    }

    /// Vertical offset at a time (scene units)
    ///
    /// `easing` reshapes the phase before it drives the sine.
    pub fn offset(&self, time_ms: f64, easing: Easing) -> f32 {
        self.amplitude * FLOAT_UNIT * (easing.apply(self.phase(time_ms)) * TAU).sin()
    }
}

/// Linear sweep around one axis
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpinMotion {
    pub axis: Axis,
    pub duration_ms: f32,
    pub enabled: bool,
}

impl SpinMotion {
    /// Angle at a time (radians, in `[0, 2π)`)
    pub fn angle(&self, time_ms: f64) -> f32 {
        if self.enabled {
            TAU * normalized(time_ms, self.duration_ms)
        } else {
            0.0
        }
    }
}

fn normalized(time_ms: f64, duration_ms: f32) -> f32 {
    let duration = duration_ms.max(MIN_DURATION_MS) as f64;
    (time_ms.rem_euclid(duration) / duration) as f32
}

/// Full motion description of one tool
#[derive(Clone, Debug, PartialEq)]
pub struct ToolMotion {
    pub base_position: Vec3,
    pub base_rotation: Euler,
    pub float: FloatMotion,
    pub spin: SpinMotion,
    /// Multiplier for the shared stagger delay
    pub stagger_index: u32,
    /// Secondary motion; `None` keeps the tool on its float/spin path
    pub physics: Option<IntegratorConfig>,
    pub collision_radius: f32,
}

impl ToolMotion {
    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            base_position: config.base_position,
            base_rotation: Euler::ZERO,
            float: FloatMotion {
                amplitude: config.float_amplitude,
                duration_ms: config.float_duration_ms,
            },
            spin: SpinMotion {
                axis: config.rotation_axis,
                duration_ms: config.rotation_duration_ms,
                enabled: config.rotation_enabled,
            },
            stagger_index: config.stagger_index,
            physics: config.physics.then(IntegratorConfig::default),
            collision_radius: config.collision_radius,
        }
    }
}

/// Settings shared by every tool
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionSettings {
    pub stagger_delay_ms: f32,
    /// Largest physics offset (scene units, and radians for sway)
    pub max_physics_offset: f32,
    pub collisions: bool,
    /// Peak sway torque around Z
    pub sway_torque: f32,
    /// Angular spring pulling sway back to rest
    pub sway_stiffness: f32,
    /// Shape of every float bob within its period
    pub float_easing: Easing,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self::from_config(&AnimationConfig::default())
    }
}

impl MotionSettings {
    pub fn from_config(config: &AnimationConfig) -> Self {
        Self {
            stagger_delay_ms: config.stagger_delay_ms.max(0.0),
            max_physics_offset: config.max_physics_offset.max(0.0),
            collisions: config.collisions,
            sway_torque: 0.4,
            sway_stiffness: 6.0,
            float_easing: Easing::from_name(&config.easing),
        }
    }
}

/// Per-frame rendering budget handed to effect collaborators
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionBudget {
    pub max_particles: u32,
    pub shadows: bool,
    pub shadow_map_size: u32,
}

impl From<&QualityProfile> for MotionBudget {
    fn from(profile: &QualityProfile) -> Self {
        Self {
            max_particles: profile.max_particles,
            shadows: profile.shadows,
            shadow_map_size: profile.shadow_map_size,
        }
    }
}

/// Output of one composition pass, one transform per tool in insertion order
#[derive(Clone, Debug, PartialEq)]
pub struct ComposedFrame {
    pub transforms: SmallVec<[Transform; 4]>,
    pub budget: MotionBudget,
}

#[derive(Clone, Debug)]
struct ToolSlot {
    motion: ToolMotion,
    body: Option<ForceIntegrator>,
    physics_offset: Vec3,
    physics_rotation: Vec3,
    last: Transform,
}

/// Blends every tool's motion sources
#[derive(Clone, Debug)]
pub struct MotionComposer {
    settings: MotionSettings,
    tools: Vec<ToolSlot>,
}

impl MotionComposer {
    pub fn new(settings: MotionSettings) -> Self {
        Self {
            settings,
            tools: Vec::new(),
        }
    }

    /// Add a tool and return its index
    pub fn add_tool(&mut self, motion: ToolMotion) -> usize {
        let body = motion
            .physics
            .map(|config| ForceIntegrator::at(config, motion.base_position));
        let last = Transform {
            position: motion.base_position,
            rotation: motion.base_rotation,
            scale: Vec3::ONE,
        };
        self.tools.push(ToolSlot {
            motion,
            body,
            physics_offset: Vec3::ZERO,
            physics_rotation: Vec3::ZERO,
            last,
        });
        self.tools.len() - 1
    }

    pub fn settings(&self) -> &MotionSettings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn motion(&self, index: usize) -> Option<&ToolMotion> {
        self.tools.get(index).map(|slot| &slot.motion)
    }

    /// Transform produced by the last `compose`
    pub fn last_transform(&self, index: usize) -> Option<&Transform> {
        self.tools.get(index).map(|slot| &slot.last)
    }

    /// Clock time as seen by one tool
    pub fn tool_time(&self, index: usize, clock_time_ms: f64) -> Option<f64> {
        self.tools.get(index).map(|slot| {
            clock_time_ms + slot.motion.stagger_index as f64 * self.settings.stagger_delay_ms as f64
        })
    }

    /// Float phase of one tool at a clock time
    pub fn float_phase(&self, index: usize, clock_time_ms: f64) -> Option<f32> {
        let time = self.tool_time(index, clock_time_ms)?;
        self.tools.get(index).map(|slot| slot.motion.float.phase(time))
    }

    /// Compose every tool for a frame
    ///
    /// `dt` is in seconds. Physics is skipped for the whole frame when
    /// `dt <= 0` (the previous physics offset is kept) or when the profile
    /// turns secondary motion off (bodies are parked on their float path).
    pub fn compose(&mut self, clock_time_ms: f64, dt: f32, profile: &QualityProfile) -> ComposedFrame {
        let step_physics = dt.is_finite() && dt > 0.0 && profile.secondary_motion;
        let stagger = self.settings.stagger_delay_ms as f64;
        let settings = self.settings;

        let mut float_positions: SmallVec<[Vec3; 4]> = SmallVec::with_capacity(self.tools.len());

        for slot in &mut self.tools {
            let time = clock_time_ms + slot.motion.stagger_index as f64 * stagger;
            let float_y = slot.motion.float.offset(time, settings.float_easing);
            let float_position = slot.motion.base_position + Vec3::new(0.0, float_y, 0.0);
            float_positions.push(float_position);

            let Some(body) = slot.body.as_mut() else {
                continue;
            };

            if !profile.secondary_motion {
                body.reset(float_position);
                slot.physics_offset = Vec3::ZERO;
                slot.physics_rotation = Vec3::ZERO;
                continue;
            }

            if step_physics {
                let angle = slot.motion.float.phase(time) * TAU;
                body.apply_gravity();
                body.apply_buoyancy(float_position, angle.cos());
                let sway = body.state().rotation.as_vec3();
                body.add_torque(
                    Vec3::new(0.0, 0.0, settings.sway_torque * angle.sin()) - sway * settings.sway_stiffness,
                );
                body.integrate(dt);
            }
        }

        if step_physics && settings.collisions {
            self.resolve_collisions();
        }

        let mut transforms = SmallVec::with_capacity(self.tools.len());
        for (slot, float_position) in self.tools.iter_mut().zip(float_positions) {
            if step_physics {
                if let Some(body) = slot.body.as_ref() {
                    slot.physics_offset =
                        (body.state().position - float_position).clamp_length(settings.max_physics_offset);
                    slot.physics_rotation = body
                        .state()
                        .rotation
                        .as_vec3()
                        .clamp_length(settings.max_physics_offset);
                }
            }

            let time = clock_time_ms + slot.motion.stagger_index as f64 * stagger;
            let axis = slot.motion.spin.axis;
            let spin = Euler::ZERO.with_axis(axis, slot.motion.spin.angle(time));

            let transform = Transform {
                position: float_position + slot.physics_offset,
                rotation: slot.motion.base_rotation + spin + Euler::from_vec3(slot.physics_rotation),
                scale: Vec3::ONE,
            };
            slot.last = transform;
            transforms.push(transform);
        }

        tracing::trace!(
            "MotionComposer: composed {} tools at {:.1} ms (physics={})",
            transforms.len(),
            clock_time_ms,
            step_physics
        );

        ComposedFrame {
            transforms,
            budget: MotionBudget::from(profile),
        }
    }

    fn resolve_collisions(&mut self) {
        let count = self.tools.len();
        for i in 0..count {
            for j in (i + 1)..count {
                let (head, tail) = self.tools.split_at_mut(j);
                let (a, b) = (&mut head[i], &mut tail[0]);
                let (Some(body_a), Some(body_b)) = (a.body.as_mut(), b.body.as_mut()) else {
                    continue;
                };

                let sphere_a = BoundingSphere::new(body_a.state().position, a.motion.collision_radius);
                let sphere_b = BoundingSphere::new(body_b.state().position, b.motion.collision_radius);
                if let Some(contact) = check_collision(&sphere_a, &sphere_b) {
                    let restitution = body_a.config().restitution.min(body_b.config().restitution);
                    resolve_collision(body_a, body_b, &contact, restitution);
                    tracing::trace!("MotionComposer: tools {} and {} bumped", i, j);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::QualityLevel;

    fn low() -> QualityProfile {
        QualityProfile::preset(QualityLevel::Low)
    }

    fn high() -> QualityProfile {
        QualityProfile::preset(QualityLevel::High)
    }

    fn plain_tool(stagger_index: u32) -> ToolMotion {
        ToolMotion {
            physics: None,
            ..ToolMotion::from_config(&ToolConfig::new(format!("tool-{stagger_index}"), stagger_index))
        }
    }

    #[test]
    fn test_float_offset_shape() {
        let float = FloatMotion {
            amplitude: 10.0,
            duration_ms: 1_000.0,
        };
        assert!(float.offset(0.0, Easing::EaseInOutSine).abs() < 1e-6);
        // easeInOutSine(0.5) = 0.5, so the bob is back at rest half way
        assert!(float.offset(500.0, Easing::EaseInOutSine).abs() < 1e-5);
        // Peak of 0.1 scene units where the eased phase is 0.25
        let peak = (0..1_000)
            .map(|ms| float.offset(ms as f64, Easing::EaseInOutSine))
            .fold(f32::MIN, f32::max);
        assert!((peak - 0.1).abs() < 1e-3);
        assert_eq!(
            float.offset(250.0, Easing::EaseInOutSine),
            float.offset(1_250.0, Easing::EaseInOutSine)
        );
    }

    #[test]
    fn test_float_easing_from_config() {
        let sine = MotionSettings::from_config(&AnimationConfig::default());
        assert_eq!(sine.float_easing, Easing::EaseInOutSine);

        let linear = MotionSettings::from_config(&AnimationConfig {
            easing: "linear".to_string(),
            ..AnimationConfig::default()
        });
        assert_eq!(linear.float_easing, Easing::Linear);

        let mut eased = MotionComposer::new(sine);
        let mut plain = MotionComposer::new(linear);
        eased.add_tool(plain_tool(0));
        plain.add_tool(plain_tool(0));

        // Same period, different shape: linear peaks earlier in the cycle
        let duration = plain_tool(0).float.duration_ms as f64;
        let t = duration * 0.125;
        let eased_y = eased.compose(t, 0.0, &low()).transforms[0].position.y;
        let plain_y = plain.compose(t, 0.0, &low()).transforms[0].position.y;
        assert!(plain_y > eased_y + 1e-4);
    }

    #[test]
    fn test_spin_angle() {
        let spin = SpinMotion {
            axis: Axis::Y,
            duration_ms: 4_000.0,
            enabled: true,
        };
        assert!((spin.angle(1_000.0) - TAU / 4.0).abs() < 1e-6);
        assert!(spin.angle(4_000.0).abs() < 1e-6);
        assert_eq!(SpinMotion { enabled: false, ..spin }.angle(1_000.0), 0.0);
    }

    #[test]
    fn test_four_tool_stagger() {
        let mut composer = MotionComposer::new(MotionSettings::default());
        for index in 0..4 {
            composer.add_tool(plain_tool(index));
        }
        let duration = composer.motion(0).unwrap().float.duration_ms;
        let fraction = 200.0 / duration;

        for t in [0.0, 200.0, 400.0, 600.0] {
            let base = composer.float_phase(0, t).unwrap();
            for index in 1..4 {
                let phase = composer.float_phase(index, t).unwrap();
                let expected = (base + index as f32 * fraction).rem_euclid(1.0);
                assert!((phase - expected).abs() < 1e-5);
            }
        }

        // Tool k at time t matches tool 0 at time t + 200k
        let frame = composer.compose(0.0, 0.016, &low());
        let reference: Vec<f32> = [0.0, 200.0, 400.0, 600.0]
            .iter()
            .map(|t| composer.compose(*t, 0.016, &low()).transforms[0].position.y)
            .collect();
        for index in 0..4 {
            assert!((frame.transforms[index].position.y - reference[index]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_zero_dt_keeps_physics_offset() {
        let mut composer = MotionComposer::new(MotionSettings::default());
        composer.add_tool(ToolMotion::from_config(&ToolConfig::new("hammer", 0)));

        for step in 0..30 {
            composer.compose(step as f64 * 16.0, 0.016, &high());
        }
        let before = composer.compose(480.0, 0.016, &high());
        let again = composer.compose(480.0, 0.0, &high());
        assert_eq!(before.transforms, again.transforms);
    }

    #[test]
    fn test_physics_offset_bounded() {
        let settings = MotionSettings {
            max_physics_offset: 0.05,
            ..MotionSettings::default()
        };
        let mut composer = MotionComposer::new(settings);
        let mut motion = ToolMotion::from_config(&ToolConfig::new("drill", 0));
        motion.physics = Some(IntegratorConfig::default().with_buoyancy(5.0, 0.1));
        composer.add_tool(motion.clone());

        for step in 0..600 {
            let t = step as f64 * 16.0;
            let frame = composer.compose(t, 0.016, &high());
            let float_y = motion.base_position.y + motion.float.offset(t, composer.settings().float_easing);
            let offset = frame.transforms[0].position - Vec3::new(motion.base_position.x, float_y, 0.0);
            assert!(offset.length() <= 0.05 + 1e-5);
        }
    }

    #[test]
    fn test_low_quality_disables_secondary_motion() {
        let mut composer = MotionComposer::new(MotionSettings::default());
        let motion = ToolMotion::from_config(&ToolConfig::new("level", 0));
        composer.add_tool(motion.clone());

        for step in 0..120 {
            composer.compose(step as f64 * 16.0, 0.016, &high());
        }
        let t = 120.0 * 16.0;
        let frame = composer.compose(t, 0.016, &low());
        let expected_y = motion.base_position.y + motion.float.offset(t, composer.settings().float_easing);
        assert_eq!(frame.transforms[0].position.y, expected_y);
        assert_eq!(frame.budget.max_particles, low().max_particles);
        assert!(!frame.budget.shadows);
    }

    #[test]
    fn test_collisions_push_overlapping_tools_apart() {
        let settings = MotionSettings {
            collisions: true,
            max_physics_offset: 1.0,
            ..MotionSettings::default()
        };
        let mut composer = MotionComposer::new(settings);
        for x in [0.0, 0.5] {
            let config = ToolConfig {
                collision_radius: 0.5,
                float_amplitude: 0.0,
                rotation_enabled: false,
                ..ToolConfig::new(format!("tool-{x}"), 0).at(Vec3::new(x, 0.0, 0.0))
            };
            composer.add_tool(ToolMotion::from_config(&config));
        }

        let frame = composer.compose(0.0, 0.016, &high());
        let gap = frame.transforms[1].position.x - frame.transforms[0].position.x;
        assert!(gap > 0.5);
    }

    #[test]
    fn test_last_transform_cached() {
        let mut composer = MotionComposer::new(MotionSettings::default());
        let index = composer.add_tool(plain_tool(0));
        let frame = composer.compose(750.0, 0.016, &low());
        assert_eq!(composer.last_transform(index), Some(&frame.transforms[0]));
        assert!(composer.last_transform(9).is_none());
    }
}
