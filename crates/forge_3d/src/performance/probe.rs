//! Device capability probing
//!
//! Run once at startup to pick the initial quality level. The runtime
//! frame-time feedback loop takes over from there.

use forge_core::QualityLevel;
use serde::{Deserialize, Serialize};

/// Memory assumed when the host cannot report it (GB)
const FALLBACK_MEMORY_GB: f32 = 2.0;
/// Core count assumed when the host cannot report it
const FALLBACK_CONCURRENCY: u32 = 4;
/// Texture size assumed when the host cannot report it
const FALLBACK_TEXTURE_SIZE: u32 = 4_096;

/// What the host knows about the device
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceCapabilities {
    /// A graphics context could be created
    pub graphics_available: bool,
    /// Approximate device memory (GB)
    pub device_memory_gb: Option<f32>,
    /// Logical core count
    pub hardware_concurrency: Option<u32>,
    /// Largest supported texture dimension
    pub max_texture_size: Option<u32>,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            graphics_available: true,
            device_memory_gb: None,
            hardware_concurrency: None,
            max_texture_size: None,
        }
    }
}

impl DeviceCapabilities {
    /// A well-equipped desktop
    pub fn desktop() -> Self {
        Self {
            graphics_available: true,
            device_memory_gb: Some(16.0),
            hardware_concurrency: Some(12),
            max_texture_size: Some(16_384),
        }
    }

    /// A typical phone
    pub fn mobile() -> Self {
        Self {
            graphics_available: true,
            device_memory_gb: Some(4.0),
            hardware_concurrency: Some(6),
            max_texture_size: Some(8_192),
        }
    }

    /// No graphics context at all
    pub fn headless() -> Self {
        Self {
            graphics_available: false,
            ..Self::default()
        }
    }

    /// Pick a starting quality level
    ///
    /// Unreported values are assumed to be modest.
    pub fn initial_quality(&self) -> QualityLevel {
        if !self.graphics_available {
            return QualityLevel::Low;
        }

        let memory = self
            .device_memory_gb
            .filter(|gb| gb.is_finite() && *gb > 0.0)
            .unwrap_or(FALLBACK_MEMORY_GB);
        let cores = self.hardware_concurrency.unwrap_or(FALLBACK_CONCURRENCY);
        let texture = self.max_texture_size.unwrap_or(FALLBACK_TEXTURE_SIZE);

        if memory >= 8.0 && texture >= 16_384 && cores >= 8 {
            QualityLevel::Ultra
        } else if memory >= 4.0 && texture >= 8_192 {
            QualityLevel::High
        } else if memory >= 2.0 {
            QualityLevel::Medium
        } else {
            QualityLevel::Low
        }
    }
}

/// Source of device capabilities
pub trait CapabilityProbe {
    fn probe(&self) -> DeviceCapabilities;
}

/// Probe that reports fixed capabilities
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StaticProbe(pub DeviceCapabilities);

impl CapabilityProbe for StaticProbe {
    fn probe(&self) -> DeviceCapabilities {
        self.0
    }
}

impl<F> CapabilityProbe for F
where
    F: Fn() -> DeviceCapabilities,
{
    fn probe(&self) -> DeviceCapabilities {
        self()
    }
}
