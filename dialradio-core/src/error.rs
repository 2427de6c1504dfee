use thiserror::Error;

use crate::KnobId;

/// Failures the dial core can run into while handling input.
///
/// None of these are fatal: the controller logs them and keeps the widget
/// interactive.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DialError {
    /// The action table was asked for a position the knob cannot reach.
    #[error("{knob} knob has no position {position} (steps: {steps})")]
    InvalidPosition {
        knob: KnobId,
        position: usize,
        steps: usize,
    },

    /// The selected channel is disabled, unknown or has no stream URI.
    #[error("channel {0} is unavailable")]
    ChannelUnavailable(u8),

    /// The player could not open or start the stream.
    #[error("could not open stream {uri}: {reason}")]
    PlaybackOpenFailure { uri: String, reason: String },

    /// Stopping or releasing the player during shutdown failed.
    #[error("player teardown failed: {0}")]
    ResourceTeardownFailure(String),
}

/// Errors reported by a player handle.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlayerError {
    #[error("player engine is gone")]
    Disconnected,

    #[error("player handle already released")]
    Released,

    #[error("{0}")]
    Backend(String),
}

/// Errors raised while loading or validating the widget configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{knob} knob needs at least 2 steps, got {steps}")]
    TooFewSteps { knob: KnobId, steps: usize },

    #[error("volume knob has {steps} steps but {levels} volume levels")]
    LevelCountMismatch { steps: usize, levels: usize },

    #[error("volume level {position} is {level}, expected a value in (0, 1]")]
    LevelOutOfRange { position: usize, level: f32 },

    #[error("volume level {position} is louder than the level before it")]
    LevelsNotDescending { position: usize },

    #[error("channel index {0} appears more than once")]
    DuplicateChannel(u8),

    #[error("channel index must start at 1")]
    ZeroChannelIndex,

    #[error("channel {0} has a stream but no name")]
    UnnamedChannel(u8),
}
