//! Performance governor and quality budgets
//!
//! - [`PerformanceGovernor`] - rolling frame metrics and the quality ladder
//! - [`QualityProfile`] / [`QualityIndexed`] - per-level rendering budgets
//! - [`CapabilityProbe`] - one-shot device probe picking the initial level

mod governor;
mod probe;
mod profile;
mod window;

pub use governor::{
    ChangeReason, PerformanceGovernor, PerformanceSnapshot, QualityChange, QualityThresholds,
};
pub use probe::{CapabilityProbe, DeviceCapabilities, StaticProbe};
pub use profile::{QualityIndexed, QualityProfile};
pub use window::RollingWindow;
