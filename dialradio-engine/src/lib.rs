mod backend;
mod mpv;

pub use backend::MediaBackend;
pub use mpv::MpvBackend;

use anyhow::Result;
use dialradio_messages::{Command, Event};
use flume::{Receiver, Sender};
use log::{debug, info, warn};
use std::time::Duration;

/// The player engine.
/// Owns the media backend and executes commands from the UI.
pub struct Engine {
    cmd_rx: Receiver<Command>,
    event_tx: Sender<Event>,
    backend: Box<dyn MediaBackend>,
    /// URI of the stream currently loaded in the backend.
    loaded: Option<String>,
}

impl Engine {
    /// Create a new Engine instance.
    pub fn new(
        cmd_rx: Receiver<Command>,
        event_tx: Sender<Event>,
        backend: Box<dyn MediaBackend>,
    ) -> Self {
        debug!("Constructing a new engine");
        Self {
            cmd_rx,
            event_tx,
            backend,
            loaded: None,
        }
    }

    /// Run the engine (blocking).
    /// Returns after `Command::Shutdown` or once the UI drops its sender.
    pub fn run(mut self) -> Result<()> {
        loop {
            let msg = self.cmd_rx.recv_timeout(Duration::from_millis(100));

            match msg {
                Ok(Command::Shutdown) | Err(flume::RecvTimeoutError::Disconnected) => {
                    info!("Engine shutting down");
                    if let Err(e) = self.backend.shutdown() {
                        warn!("Backend shutdown failed: {:#}", e);
                    }
                    break;
                }
                Ok(cmd) => {
                    debug!("Engine received command: {:?}", cmd);
                    self.handle_command(cmd);
                }
                Err(flume::RecvTimeoutError::Timeout) => self.poll_backend(),
            }
        }
        Ok(())
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Load(uri) => {
                self.discard_stale_failures();
                match self.backend.load(&uri) {
                    Ok(()) => self.loaded = Some(uri),
                    Err(e) => {
                        self.loaded = None;
                        self.emit(Event::OpenFailed {
                            uri,
                            reason: format!("{:#}", e),
                        });
                    }
                }
            }
            Command::Play => {
                let Some(uri) = self.loaded.clone() else {
                    warn!("Play requested with nothing loaded");
                    return;
                };
                match self.backend.play() {
                    Ok(()) => self.emit(Event::Started { uri }),
                    Err(e) => {
                        self.loaded = None;
                        self.emit(Event::OpenFailed {
                            uri,
                            reason: format!("{:#}", e),
                        });
                    }
                }
            }
            Command::Stop => {
                self.discard_stale_failures();
                if let Err(e) = self.backend.stop() {
                    warn!("Backend failed to stop: {:#}", e);
                }
                self.loaded = None;
                self.emit(Event::Stopped);
            }
            Command::SetVolume(volume) => {
                if let Err(e) = self.backend.set_volume(volume) {
                    warn!("Backend failed to set volume {}: {:#}", volume, e);
                }
            }
            // Handled by the run loop.
            Command::Shutdown => {}
        }
    }

    fn poll_backend(&mut self) {
        if let Some(reason) = self.backend.poll_failure() {
            match self.loaded.take() {
                Some(uri) => self.emit(Event::OpenFailed { uri, reason }),
                None => debug!("Backend failure with nothing loaded: {}", reason),
            }
        }
    }

    /// Drop failures queued for a stream that is about to be replaced.
    fn discard_stale_failures(&mut self) {
        while let Some(reason) = self.backend.poll_failure() {
            debug!("Discarding stale backend failure: {}", reason);
        }
    }

    fn emit(&self, event: Event) {
        if self.event_tx.send(event).is_err() {
            debug!("UI is gone, dropping engine event");
        }
    }
}
