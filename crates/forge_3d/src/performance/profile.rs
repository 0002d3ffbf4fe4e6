//! Quality profiles
//!
//! Each quality level maps to one precomputed [`QualityProfile`] stored in a
//! [`QualityIndexed`] arena. Changing quality swaps which slot is active;
//! nothing in the scene graph is mutated in place.

use forge_core::{PerformanceConfig, QualityLevel};
use serde::Serialize;
use std::ops::{Index, IndexMut};

/// Rendering budget for one quality level
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityProfile {
    pub level: QualityLevel,
    pub max_particles: u32,
    /// Shadow map resolution (texels per side)
    pub shadow_map_size: u32,
    pub shadows: bool,
    pub pixel_ratio: f32,
    pub antialias: bool,
    pub post_processing: bool,
    /// Physics-driven bob and sway on top of float/spin
    pub secondary_motion: bool,
    /// Camera far plane; the camera's detail budget
    pub camera_far_plane: f32,
}

impl QualityProfile {
    /// Built-in profile for a level, before configuration caps
    pub fn preset(level: QualityLevel) -> Self {
        match level {
            QualityLevel::Low => Self {
                level,
                max_particles: 200,
                shadow_map_size: 512,
                shadows: false,
                pixel_ratio: 1.0,
                antialias: false,
                post_processing: false,
                secondary_motion: false,
                camera_far_plane: 40.0,
            },
            QualityLevel::Medium => Self {
                level,
                max_particles: 500,
                shadow_map_size: 1_024,
                shadows: true,
                pixel_ratio: 1.25,
                antialias: false,
                post_processing: false,
                secondary_motion: true,
                camera_far_plane: 60.0,
            },
            QualityLevel::High => Self {
                level,
                max_particles: 1_000,
                shadow_map_size: 2_048,
                shadows: true,
                pixel_ratio: 1.5,
                antialias: true,
                post_processing: true,
                secondary_motion: true,
                camera_far_plane: 80.0,
            },
            QualityLevel::Ultra => Self {
                level,
                max_particles: 2_000,
                shadow_map_size: 4_096,
                shadows: true,
                pixel_ratio: 2.0,
                antialias: true,
                post_processing: true,
                secondary_motion: true,
                camera_far_plane: 120.0,
            },
        }
    }

    /// Preset limited by the configured caps
    pub fn capped(level: QualityLevel, config: &PerformanceConfig) -> Self {
        let preset = Self::preset(level);
        Self {
            max_particles: preset.max_particles.min(config.max_particles),
            shadow_map_size: preset.shadow_map_size.min(config.shadow_map_size),
            pixel_ratio: preset.pixel_ratio.min(config.pixel_ratio),
            antialias: preset.antialias && config.antialias,
            ..preset
        }
    }

    /// One capped profile per level
    pub fn ladder(config: &PerformanceConfig) -> QualityIndexed<QualityProfile> {
        QualityIndexed::from_fn(|level| Self::capped(level, config))
    }
}

/// One value per quality level
#[derive(Clone, Debug, PartialEq)]
pub struct QualityIndexed<T> {
    slots: [T; 4],
}

impl<T> QualityIndexed<T> {
    pub fn from_fn(f: impl FnMut(QualityLevel) -> T) -> Self {
        Self {
            slots: QualityLevel::ALL.map(f),
        }
    }

    pub fn get(&self, level: QualityLevel) -> &T {
        &self.slots[level.index()]
    }

    pub fn get_mut(&mut self, level: QualityLevel) -> &mut T {
        &mut self.slots[level.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (QualityLevel, &T)> {
        QualityLevel::ALL.into_iter().zip(self.slots.iter())
    }
}

impl<T> Index<QualityLevel> for QualityIndexed<T> {
    type Output = T;

    fn index(&self, level: QualityLevel) -> &T {
        self.get(level)
    }
}

impl<T> IndexMut<QualityLevel> for QualityIndexed<T> {
    fn index_mut(&mut self, level: QualityLevel) -> &mut T {
        self.get_mut(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ladder_is_monotone() {
        let ladder = QualityProfile::ladder(&PerformanceConfig::default());
        let levels: Vec<_> = ladder.iter().collect();
        for pair in levels.windows(2) {
            let (_, lower) = pair[0];
            let (_, higher) = pair[1];
            assert!(lower.max_particles <= higher.max_particles);
            assert!(lower.shadow_map_size <= higher.shadow_map_size);
            assert!(lower.pixel_ratio <= higher.pixel_ratio);
            assert!(lower.camera_far_plane <= higher.camera_far_plane);
        }
        assert!(!ladder[QualityLevel::Low].secondary_motion);
        assert_eq!(ladder[QualityLevel::High].level, QualityLevel::High);
    }

    #[test]
    fn test_config_caps_apply() {
        let config = PerformanceConfig {
            max_particles: 300,
            shadow_map_size: 1_024,
            antialias: false,
            pixel_ratio: 1.0,
            ..PerformanceConfig::default()
        };
        let ultra = QualityProfile::capped(QualityLevel::Ultra, &config);
        assert_eq!(ultra.max_particles, 300);
        assert_eq!(ultra.shadow_map_size, 1_024);
        assert!(!ultra.antialias);
        assert_eq!(ultra.pixel_ratio, 1.0);
        assert!(ultra.post_processing);
    }

    #[test]
    fn test_indexed_slots() {
        let mut counts = QualityIndexed::from_fn(|level| level.index() * 10);
        counts[QualityLevel::Medium] += 1;
        assert_eq!(*counts.get(QualityLevel::Medium), 11);
        assert_eq!(counts[QualityLevel::Ultra], 30);
    }
}
