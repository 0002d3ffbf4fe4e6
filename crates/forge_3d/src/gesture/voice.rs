//! Fixed voice phrases mapped to discrete gesture mutations

use super::state::GestureState;
use forge_core::{GestureConfig, Vec3};
use std::fmt;
use std::str::FromStr;

/// A recognized voice command
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VoiceCommand {
    ZoomIn,
    ZoomOut,
    Reset,
    RotateLeft,
    RotateRight,
}

impl VoiceCommand {
    pub const ALL: [VoiceCommand; 5] = [
        VoiceCommand::ZoomIn,
        VoiceCommand::ZoomOut,
        VoiceCommand::Reset,
        VoiceCommand::RotateLeft,
        VoiceCommand::RotateRight,
    ];

    /// Recognize a transcript; case and surrounding or repeated whitespace
    /// are ignored
    pub fn parse(transcript: &str) -> Option<Self> {
        let normalized = transcript
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        Self::ALL.into_iter().find(|command| command.phrase() == normalized)
    }

    pub fn phrase(self) -> &'static str {
        match self {
            VoiceCommand::ZoomIn => "zoom in",
            VoiceCommand::ZoomOut => "zoom out",
            VoiceCommand::Reset => "reset",
            VoiceCommand::RotateLeft => "rotate left",
            VoiceCommand::RotateRight => "rotate right",
        }
    }

    /// Mutate the gesture state; limits still apply
    pub fn apply(self, state: &mut GestureState, config: &GestureConfig) {
        match self {
            VoiceCommand::ZoomIn => state.zoom_by(config.voice_zoom_step, config),
            VoiceCommand::ZoomOut => state.zoom_by(-config.voice_zoom_step, config),
            VoiceCommand::Reset => state.reset_view(config),
            VoiceCommand::RotateLeft => {
                state.rotate_by(Vec3::new(0.0, -config.voice_rotation_step, 0.0), config)
            }
            VoiceCommand::RotateRight => {
                state.rotate_by(Vec3::new(0.0, config.voice_rotation_step, 0.0), config)
            }
        }
    }
}

impl fmt::Display for VoiceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

/// Error for transcripts that match no command
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized voice command: {0:?}")]
pub struct UnknownCommand(pub String);

impl FromStr for VoiceCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownCommand(s.to_string()))
    }
}
