//! Discrete rendering-fidelity tiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rendering quality tier
///
/// Totally ordered from `Low` to `Ultra`. The performance governor moves
/// one step at a time; only explicit adjustments may jump.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    Low,
    Medium,
    #[default]
    High,
    Ultra,
}

impl QualityLevel {
    /// All levels, lowest first
    pub const ALL: [QualityLevel; 4] = [
        QualityLevel::Low,
        QualityLevel::Medium,
        QualityLevel::High,
        QualityLevel::Ultra,
    ];

    /// Position in [`QualityLevel::ALL`]
    pub const fn index(self) -> usize {
        match self {
            QualityLevel::Low => 0,
            QualityLevel::Medium => 1,
            QualityLevel::High => 2,
            QualityLevel::Ultra => 3,
        }
    }

    /// One level lower, saturating at `Low`
    pub fn step_down(self) -> Self {
        match self {
            QualityLevel::Ultra => QualityLevel::High,
            QualityLevel::High => QualityLevel::Medium,
            QualityLevel::Medium | QualityLevel::Low => QualityLevel::Low,
        }
    }

    /// One level higher, saturating at `Ultra`
    pub fn step_up(self) -> Self {
        match self {
            QualityLevel::Low => QualityLevel::Medium,
            QualityLevel::Medium => QualityLevel::High,
            QualityLevel::High | QualityLevel::Ultra => QualityLevel::Ultra,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QualityLevel::Low => "low",
            QualityLevel::Medium => "medium",
            QualityLevel::High => "high",
            QualityLevel::Ultra => "ultra",
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for QualityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(QualityLevel::Low),
            "medium" => Ok(QualityLevel::Medium),
            "high" => Ok(QualityLevel::High),
            "ultra" => Ok(QualityLevel::Ultra),
            other => Err(format!("unknown quality level '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_saturate() {
        assert_eq!(QualityLevel::Low.step_down(), QualityLevel::Low);
        assert_eq!(QualityLevel::Ultra.step_up(), QualityLevel::Ultra);
        assert_eq!(QualityLevel::Ultra.step_down(), QualityLevel::High);
        assert_eq!(QualityLevel::Medium.step_up(), QualityLevel::High);
    }

    #[test]
    fn test_ordering_and_index() {
        assert!(QualityLevel::Low < QualityLevel::Ultra);
        for (i, level) in QualityLevel::ALL.iter().enumerate() {
            assert_eq!(level.index(), i);
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("ULTRA".parse::<QualityLevel>(), Ok(QualityLevel::Ultra));
        assert!("potato".parse::<QualityLevel>().is_err());
    }
}
