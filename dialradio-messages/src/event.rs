/// Events sent from the player engine to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The backend accepted the stream and started playing it.
    Started { uri: String },
    /// The backend could not open or keep playing the stream.
    OpenFailed { uri: String, reason: String },
    /// Playback stopped on request.
    Stopped,
}
