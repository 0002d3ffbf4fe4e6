//! Stylized physics for secondary motion
//!
//! - [`ForceIntegrator`] - accumulate forces, integrate once per frame
//! - [`check_collision`] / [`resolve_collision`] - sphere bumps between tools
//!
//! # Example
//!
//! ```ignore
//! use forge_3d::physics::*;
//!
//! let mut body = ForceIntegrator::at(IntegratorConfig::default(), reference);
//! body.apply_gravity();
//! body.apply_buoyancy(reference, wave);
//! body.integrate(dt);
//! ```

mod collision;
mod integrator;

pub use collision::{check_collision, resolve_collision, BoundingSphere, Contact};
pub use integrator::{ForceIntegrator, IntegratorConfig, RigidMotionState, MIN_MASS};
