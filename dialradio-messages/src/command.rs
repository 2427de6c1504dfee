use crate::Percent;

/// Commands sent from the UI to the player engine.
///
/// Every command is fire-and-forget: the UI never waits for the engine to
/// finish buffering a stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Load a stream URI, replacing whatever is loaded.
    Load(String),
    /// Start (or resume) playback of the loaded stream.
    Play,
    /// Stop playback. The engine keeps running.
    Stop,
    /// Set the output volume.
    SetVolume(Percent),
    /// Stop playback, release the backend and terminate the engine.
    Shutdown,
}
