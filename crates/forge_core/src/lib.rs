//! Forge Core
//!
//! Foundational types shared by the forge showcase crates:
//!
//! - **Math**: `Vec2`, `Vec3` and `Euler` value types in scene units
//! - **Quality**: the ordered `QualityLevel` ladder
//! - **Configuration**: the TOML-backed `ShowcaseConfig` surface
//! - **Errors**: configuration error types
//!
//! # Example
//!
//! ```rust
//! use forge_core::{QualityLevel, ShowcaseConfig};
//!
//! let config = ShowcaseConfig::from_toml_str(
//!     r#"
//!     [performance]
//!     target_fps = 30.0
//!     performance_level = "medium"
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.performance.performance_level, Some(QualityLevel::Medium));
//! assert_eq!(config.tools.len(), 4);
//! ```

pub mod config;
pub mod error;
pub mod math;
pub mod quality;

pub use config::{
    AnimationConfig, CameraConfig, ConfigWarning, GestureConfig, PerformanceConfig,
    ShowcaseConfig, ToolConfig, MIN_DURATION_MS,
};
pub use error::{ConfigError, Result};
pub use math::{frame_rate_independent_lerp_factor, Axis, Euler, Vec2, Vec3};
pub use quality::QualityLevel;
