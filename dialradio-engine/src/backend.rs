use anyhow::Result;
use dialradio_messages::Percent;

/// A media player the engine drives.
///
/// Calls return once the request has been handed over; buffering and
/// decoding happen inside the backend.
pub trait MediaBackend {
    /// Replace whatever is loaded with `uri`.
    fn load(&mut self, uri: &str) -> Result<()>;
    fn play(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
    fn set_volume(&mut self, volume: Percent) -> Result<()>;

    /// A playback error reported by the backend since the last poll.
    fn poll_failure(&mut self) -> Option<String> {
        None
    }

    /// Stop everything and free the backend's resources.
    fn shutdown(&mut self) -> Result<()>;
}
