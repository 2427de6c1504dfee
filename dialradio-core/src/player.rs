use dialradio_messages::{Command, Percent};
use flume::Sender;
use log::debug;

use crate::error::PlayerError;

/// Handle to an external media player.
///
/// All calls are fire-and-forget: they hand a request to the player and
/// return without waiting for the stream to buffer.
pub trait PlayerHandle {
    fn set_media(&mut self, uri: &str) -> Result<(), PlayerError>;
    fn play(&mut self) -> Result<(), PlayerError>;
    fn stop(&mut self) -> Result<(), PlayerError>;
    fn set_volume_percent(&mut self, percent: Percent) -> Result<(), PlayerError>;
    /// Give the player back. Called exactly once, at shutdown.
    fn release(self) -> Result<(), PlayerError>
    where
        Self: Sized;
}

/// Player handle that forwards commands to the engine thread.
pub struct EnginePlayer {
    cmd_tx: Sender<Command>,
}

impl EnginePlayer {
    pub fn new(cmd_tx: Sender<Command>) -> Self {
        Self { cmd_tx }
    }

    fn send(&self, cmd: Command) -> Result<(), PlayerError> {
        debug!("Sending command to engine: {:?}", cmd);
        self.cmd_tx.send(cmd).map_err(|_| PlayerError::Disconnected)
    }
}

impl PlayerHandle for EnginePlayer {
    fn set_media(&mut self, uri: &str) -> Result<(), PlayerError> {
        self.send(Command::Load(uri.to_string()))
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        self.send(Command::Play)
    }

    fn stop(&mut self) -> Result<(), PlayerError> {
        self.send(Command::Stop)
    }

    fn set_volume_percent(&mut self, percent: Percent) -> Result<(), PlayerError> {
        self.send(Command::SetVolume(percent))
    }

    fn release(self) -> Result<(), PlayerError> {
        // Dropping the sender afterwards also disconnects the engine.
        self.send(Command::Shutdown)
    }
}

/// Receives the station name shown on the widget.
pub trait LabelSink {
    fn set_text(&mut self, text: &str);
}

/// Label text owned by the UI and painted every frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayLabel {
    text: String,
}

impl DisplayLabel {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl LabelSink for DisplayLabel {
    fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }
}
