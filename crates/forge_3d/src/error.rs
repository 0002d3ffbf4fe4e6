//! Showcase error types

use forge_core::ConfigError;
use thiserror::Error;

/// Faults surfaced to the hosting collaborator
///
/// Everything else (bad durations, unknown easings, missing haptics, slow
/// frames) degrades in place and never reaches this type.
#[derive(Error, Debug)]
pub enum ShowcaseError {
    /// The capability probe reported no usable graphics context
    #[error("Graphics context unavailable")]
    GraphicsUnavailable,

    /// The graphics context was lost; the host is expected to remount
    #[error("Graphics context lost")]
    ContextLost,

    /// The configuration document could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for showcase operations
pub type Result<T> = std::result::Result<T, ShowcaseError>;
