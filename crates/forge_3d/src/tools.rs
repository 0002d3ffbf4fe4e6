//! The showcased construction tools

use forge_core::{Axis, ToolConfig, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tool catalogue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    Hammer,
    Drill,
    Level,
    MeasuringTape,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::Hammer,
        ToolKind::Drill,
        ToolKind::Level,
        ToolKind::MeasuringTape,
    ];

    /// Identifier reported to tool-selection listeners
    pub fn id(self) -> &'static str {
        match self {
            ToolKind::Hammer => "hammer",
            ToolKind::Drill => "drill",
            ToolKind::Level => "level",
            ToolKind::MeasuringTape => "measuring-tape",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// Position in the default lineup
    pub fn index(self) -> u32 {
        match self {
            ToolKind::Hammer => 0,
            ToolKind::Drill => 1,
            ToolKind::Level => 2,
            ToolKind::MeasuringTape => 3,
        }
    }

    /// Default motion preset
    ///
    /// The drill spins around its bit, the level floats gently and the tape
    /// bobs slower than the rest.
    pub fn preset(self) -> ToolConfig {
        let x = -3.0 + 2.0 * self.index() as f32;
        let base = ToolConfig::new(self.id(), self.index()).at(Vec3::new(x, 0.0, 0.0));
        match self {
            ToolKind::Hammer => base,
            ToolKind::Drill => ToolConfig {
                rotation_axis: Axis::Z,
                rotation_duration_ms: 8_000.0,
                ..base
            },
            ToolKind::Level => ToolConfig {
                float_amplitude: 6.0,
                ..base
            },
            ToolKind::MeasuringTape => ToolConfig {
                float_duration_ms: 4_000.0,
                ..base
            },
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| format!("unknown tool: {s}"))
    }
}
