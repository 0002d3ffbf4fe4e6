//! Stylized force integrator
//!
//! Semi-implicit Euler over accumulated forces with exponential damping.
//! This drives visual bob and sway, not a collision-correct simulation.

use forge_core::{Euler, Vec3};
use smallvec::SmallVec;

/// Smallest accepted mass
pub const MIN_MASS: f32 = 0.001;

/// Integrator settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntegratorConfig {
    /// Divides net force, and net torque as a stand-in for inertia
    pub mass: f32,
    /// Fraction of linear velocity lost per second, in `[0, 1)`
    pub damping: f32,
    /// Fraction of angular velocity lost per second, in `[0, 1)`
    pub angular_damping: f32,
    /// Largest step taken by one `integrate` call (seconds)
    pub max_step: f32,
    /// Gravity acceleration
    pub gravity: Vec3,
    /// Strength of the wave term in buoyant lift
    pub buoyancy: f32,
    /// Spring constant pulling the body back to its reference point
    pub buoyancy_stiffness: f32,
    /// Bounciness used by collision response, in `[0, 1]`
    pub restitution: f32,
    /// When false, forces and impulses are ignored
    pub enabled: bool,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            damping: 0.9,
            angular_damping: 0.9,
            max_step: 1.0 / 30.0,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            buoyancy: 0.02,
            buoyancy_stiffness: 8.0,
            restitution: 0.5,
            enabled: true,
        }
    }
}

impl IntegratorConfig {
    /// Set mass
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Set linear and angular damping
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self.angular_damping = damping;
        self
    }

    /// Set the buoyancy wave strength and restoring stiffness
    pub fn with_buoyancy(mut self, buoyancy: f32, stiffness: f32) -> Self {
        self.buoyancy = buoyancy;
        self.buoyancy_stiffness = stiffness;
        self
    }

    /// Disable gravity
    pub fn without_gravity(mut self) -> Self {
        self.gravity = Vec3::ZERO;
        self
    }

    /// Replace values that would break the integration
    pub fn validated(mut self) -> Self {
        if !self.mass.is_finite() || self.mass < MIN_MASS {
            tracing::warn!("ForceIntegrator: mass {} is not positive, using {}", self.mass, MIN_MASS);
            self.mass = MIN_MASS;
        }
        self.damping = clamp_damping(self.damping);
        self.angular_damping = clamp_damping(self.angular_damping);
        if !self.max_step.is_finite() || self.max_step <= 0.0 {
            self.max_step = 1.0 / 30.0;
        }
        if !self.gravity.is_finite() {
            self.gravity = Vec3::ZERO;
        }
        if !self.buoyancy.is_finite() {
            self.buoyancy = 0.0;
        }
        if !self.buoyancy_stiffness.is_finite() || self.buoyancy_stiffness < 0.0 {
            self.buoyancy_stiffness = 0.0;
        }
        self.restitution = if self.restitution.is_finite() {
            self.restitution.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }
}

fn clamp_damping(damping: f32) -> f32 {
    if damping.is_finite() {
        damping.clamp(0.0, 0.999)
    } else {
        0.0
    }
}

/// Linear and angular state of one animated object
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RigidMotionState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub rotation: Euler,
    pub angular_velocity: Vec3,
    pub angular_acceleration: Vec3,
    /// Forces accumulated since the last `integrate`
    pub pending_forces: SmallVec<[Vec3; 4]>,
    /// Torques accumulated since the last `integrate`
    pub pending_torques: SmallVec<[Vec3; 4]>,
}

impl RigidMotionState {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// Accumulate-then-integrate force integrator
#[derive(Clone, Debug)]
pub struct ForceIntegrator {
    config: IntegratorConfig,
    state: RigidMotionState,
}

impl ForceIntegrator {
    pub fn new(config: IntegratorConfig) -> Self {
        Self::at(config, Vec3::ZERO)
    }

    /// Create an integrator resting at a position
    pub fn at(config: IntegratorConfig, position: Vec3) -> Self {
        Self {
            config: config.validated(),
            state: RigidMotionState::at(position),
        }
    }

    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    pub fn state(&self) -> &RigidMotionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RigidMotionState {
        &mut self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        if !enabled {
            self.clear_pending();
        }
    }

    /// Inverse mass, zero when disabled (immovable in collisions)
    pub fn inverse_mass(&self) -> f32 {
        if self.config.enabled {
            1.0 / self.config.mass
        } else {
            0.0
        }
    }

    // =========================================================================
    // Force accumulation
    // =========================================================================

    /// Queue a force for the next step
    pub fn add_force(&mut self, force: Vec3) {
        if self.config.enabled {
            self.state.pending_forces.push(force);
        }
    }

    /// Queue a torque for the next step
    pub fn add_torque(&mut self, torque: Vec3) {
        if self.config.enabled {
            self.state.pending_torques.push(torque);
        }
    }

    /// Change velocity immediately by `impulse / mass`
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        if self.config.enabled {
            self.state.velocity += impulse / self.config.mass;
        }
    }

    /// Queue the weight force `mass * gravity`
    pub fn apply_gravity(&mut self) {
        self.add_force(self.config.gravity * self.config.mass);
    }

    /// Queue buoyant lift around a reference point
    ///
    /// Lift cancels gravity scaled by `1 + buoyancy * wave`; a spring term
    /// pulls the body back toward `reference`.
    pub fn apply_buoyancy(&mut self, reference: Vec3, wave: f32) {
        let lift = -(self.config.gravity * self.config.mass) * (1.0 + self.config.buoyancy * wave);
        let restoring = (self.state.position - reference) * -self.config.buoyancy_stiffness;
        self.add_force(lift + restoring);
    }

    // =========================================================================
    // Integration
    // =========================================================================

    /// Advance one step
    ///
    /// `dt` is clamped to `max_step`. A non-positive or non-finite `dt` only
    /// discards the pending forces. The pending lists are always empty on
    /// return.
    pub fn integrate(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 || !self.config.enabled {
            self.clear_pending();
            return;
        }
        let dt = dt.min(self.config.max_step);

        let net_force = sum(&self.state.pending_forces);
        let net_torque = sum(&self.state.pending_torques);
        let state = &mut self.state;

        state.acceleration = net_force / self.config.mass;
        state.velocity += state.acceleration * dt;
        state.velocity *= (1.0 - self.config.damping).powf(dt);
        state.position += state.velocity * dt;

        // Stylized: mass stands in for the inertia tensor
        state.angular_acceleration = net_torque / self.config.mass;
        state.angular_velocity += state.angular_acceleration * dt;
        state.angular_velocity *= (1.0 - self.config.angular_damping).powf(dt);
        state.rotation = state.rotation + Euler::from_vec3(state.angular_velocity * dt);

        self.clear_pending();
    }

    /// Zero velocities and move to a position
    pub fn reset(&mut self, position: Vec3) {
        self.state = RigidMotionState::at(position);
    }

    fn clear_pending(&mut self) {
        self.state.pending_forces.clear();
        self.state.pending_torques.clear();
    }
}

fn sum(vectors: &[Vec3]) -> Vec3 {
    vectors.iter().fold(Vec3::ZERO, |acc, v| acc + *v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floating() -> IntegratorConfig {
        IntegratorConfig::default().without_gravity()
    }

    #[test]
    fn test_force_moves_body() {
        let mut body = ForceIntegrator::new(floating().with_damping(0.0));
        body.add_force(Vec3::new(2.0, 0.0, 0.0));
        body.integrate(0.01);

        assert!((body.state().acceleration.x - 2.0).abs() < 1e-6);
        assert!((body.state().velocity.x - 0.02).abs() < 1e-6);
        assert!(body.state().position.x > 0.0);
    }

    #[test]
    fn test_pending_forces_cleared_after_integrate() {
        let mut body = ForceIntegrator::new(floating().with_damping(0.0));
        body.add_force(Vec3::new(0.0, 5.0, 0.0));
        body.add_torque(Vec3::new(0.0, 0.0, 1.0));
        body.integrate(0.02);
        assert!(body.state().pending_forces.is_empty());
        assert!(body.state().pending_torques.is_empty());

        let velocity = body.state().velocity;
        let angular = body.state().angular_velocity;
        body.integrate(0.02);
        body.integrate(0.02);

        // No residual effect of the force applied two steps ago
        assert_eq!(body.state().acceleration, Vec3::ZERO);
        assert_eq!(body.state().angular_acceleration, Vec3::ZERO);
        assert_eq!(body.state().velocity, velocity);
        assert_eq!(body.state().angular_velocity, angular);
    }

    #[test]
    fn test_damping_converges() {
        let mut body = ForceIntegrator::new(floating().with_damping(0.5));
        body.state_mut().velocity = Vec3::new(3.0, -1.0, 2.0);

        let mut previous = body.state().velocity.length();
        for _ in 0..240 {
            body.integrate(1.0 / 60.0);
            let speed = body.state().velocity.length();
            assert!(speed < previous);
            previous = speed;
        }
        assert!(previous < 0.5);
    }

    #[test]
    fn test_dt_clamped_to_max_step() {
        let mut clamped = ForceIntegrator::new(floating().with_damping(0.0));
        clamped.add_force(Vec3::new(1.0, 0.0, 0.0));
        clamped.integrate(5.0);

        let max_step = clamped.config().max_step;
        assert!((clamped.state().velocity.x - max_step).abs() < 1e-6);
    }

    #[test]
    fn test_non_positive_dt_only_clears() {
        let mut body = ForceIntegrator::new(floating());
        body.add_force(Vec3::new(1.0, 0.0, 0.0));
        body.integrate(0.0);
        assert!(body.state().pending_forces.is_empty());
        assert_eq!(body.state().velocity, Vec3::ZERO);

        body.add_force(Vec3::new(1.0, 0.0, 0.0));
        body.integrate(f32::NAN);
        assert_eq!(body.state().position, Vec3::ZERO);
    }

    #[test]
    fn test_disabled_ignores_input() {
        let mut body = ForceIntegrator::new(IntegratorConfig {
            enabled: false,
            ..floating()
        });
        body.add_force(Vec3::new(1.0, 0.0, 0.0));
        body.apply_impulse(Vec3::new(1.0, 0.0, 0.0));
        assert!(body.state().pending_forces.is_empty());
        assert_eq!(body.state().velocity, Vec3::ZERO);
        assert_eq!(body.inverse_mass(), 0.0);
    }

    #[test]
    fn test_impulse_divides_by_mass() {
        let mut body = ForceIntegrator::new(floating().with_mass(4.0));
        body.apply_impulse(Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(body.state().velocity, Vec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_buoyancy_balances_gravity_at_rest() {
        let reference = Vec3::new(0.0, 1.0, 0.0);
        let mut body = ForceIntegrator::at(IntegratorConfig::default(), reference);
        body.apply_gravity();
        body.apply_buoyancy(reference, 0.0);
        body.integrate(1.0 / 60.0);

        assert!(body.state().acceleration.length() < 1e-4);
        assert!(body.state().position.distance(reference) < 1e-6);
    }

    #[test]
    fn test_buoyancy_stays_near_reference() {
        let reference = Vec3::new(2.0, 0.5, 0.0);
        let mut body = ForceIntegrator::at(IntegratorConfig::default(), reference);

        let mut t = 0.0f32;
        for _ in 0..600 {
            body.apply_gravity();
            body.apply_buoyancy(reference, (t * 2.0).cos());
            body.integrate(1.0 / 60.0);
            t += 1.0 / 60.0;
        }
        assert!(body.state().position.distance(reference) < 0.1);
    }

    #[test]
    fn test_invalid_config_validated() {
        let body = ForceIntegrator::new(IntegratorConfig {
            mass: 0.0,
            damping: 1.5,
            max_step: -1.0,
            restitution: f32::NAN,
            ..IntegratorConfig::default()
        });
        assert_eq!(body.config().mass, MIN_MASS);
        assert!(body.config().damping < 1.0);
        assert!(body.config().max_step > 0.0);
        assert_eq!(body.config().restitution, 0.0);
    }
}
