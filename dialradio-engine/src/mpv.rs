//! mpv driven over its JSON IPC socket.
//!
//! ```text
//!   MpvBackend ── spawn ──▶ mpv --idle --input-ipc-server=<socket>
//!        │                        │
//!        ├── writer  ─ commands ─▶│   (request_id on every command)
//!        └── reader task ◀─ replies + end-file errors → event channel
//! ```
//!
//! The socket is driven by a small tokio runtime owned by the backend, so the
//! reader never holds up the writer (named pipes on Windows are opened
//! overlapped). The process is spawned lazily on the first load and
//! respawned if the socket breaks.
//!
//! Failures are only reported once mpv has acknowledged the latest
//! `loadfile`/`stop`; anything earlier belongs to a stream that was already
//! replaced.

use anyhow::{Context, Result, anyhow, bail};
use dialradio_messages::Percent;
use flume::{Receiver, Sender};
use log::{debug, info, warn};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::process::{Child, Stdio};
use std::thread;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::runtime::{Handle, Runtime};

use crate::MediaBackend;

type IpcReader = Box<dyn AsyncRead + Send + Unpin>;
type IpcWriter = Box<dyn AsyncWrite + Send + Unpin>;

const WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// What the reader task forwards from the socket.
#[derive(Debug, Clone, PartialEq)]
enum IpcEvent {
    /// mpv has processed the command with this request id.
    Reply(u64),
    /// A file ended with an error.
    Failure(String),
}

pub struct MpvBackend {
    binary: PathBuf,
    socket_name: String,
    process: Option<Child>,
    runtime: Option<Runtime>,
    writer: Option<IpcWriter>,
    events: Option<Receiver<IpcEvent>>,
    next_request: u64,
    /// Request id of the last `loadfile` or `stop`.
    epoch: u64,
    /// Highest request id mpv has answered.
    acked: u64,
    volume: Percent,
}

impl MpvBackend {
    pub fn new() -> Self {
        Self {
            binary: find_mpv_binary().unwrap_or_else(|| PathBuf::from(mpv_binary_name())),
            socket_name: socket_name(),
            process: None,
            runtime: None,
            writer: None,
            events: None,
            next_request: 0,
            epoch: 0,
            acked: 0,
            volume: Percent(0),
        }
    }

    fn io_handle(&mut self) -> Result<Handle> {
        if self.runtime.is_none() {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("mpv-io")
                .enable_io()
                .enable_time()
                .build()
                .context("failed to start mpv IPC runtime")?;
            self.runtime = Some(runtime);
        }
        self.runtime
            .as_ref()
            .map(|runtime| runtime.handle().clone())
            .ok_or_else(|| anyhow!("mpv IPC runtime is missing"))
    }

    fn process_alive(&mut self) -> bool {
        match self.process.as_mut() {
            Some(child) => child.try_wait().ok().flatten().is_none(),
            None => false,
        }
    }

    fn ensure_running(&mut self) -> Result<()> {
        if self.writer.is_some() && self.process_alive() {
            return Ok(());
        }
        self.kill();
        let io = self.io_handle()?;

        #[cfg(unix)]
        let _ = std::fs::remove_file(&self.socket_name);

        info!("mpv: spawning {}", self.binary.display());
        let child = std::process::Command::new(&self.binary)
            .arg("--no-video")
            .arg("--idle=yes")
            .arg("--quiet")
            .arg(format!("--input-ipc-server={}", ipc_address(&self.socket_name)))
            .arg(format!("--volume={}", self.volume.as_u8()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to spawn {}", self.binary.display()))?;
        self.process = Some(child);

        let (reader, writer) = connect_with_retry(&io, &self.socket_name)?;
        info!("mpv: connected to IPC socket");

        let (event_tx, event_rx) = flume::unbounded();
        io.spawn(reader_task(reader, event_tx));

        self.writer = Some(writer);
        self.events = Some(event_rx);
        Ok(())
    }

    /// Write one command and return the request id it was tagged with.
    fn send(&mut self, command: Value) -> Result<u64> {
        let io = self
            .runtime
            .as_ref()
            .map(|runtime| runtime.handle().clone())
            .ok_or_else(|| anyhow!("mpv is not running"))?;
        let request_id = self.next_request + 1;
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| anyhow!("mpv is not running"))?;

        let mut line = serde_json::to_string(&json!({
            "command": command,
            "request_id": request_id,
        }))?;
        line.push('\n');
        debug!("mpv writer: {}", line.trim());

        let written = io.block_on(async {
            tokio::time::timeout(WRITE_TIMEOUT, async {
                writer.write_all(line.as_bytes()).await?;
                writer.flush().await
            })
            .await
        });
        match written {
            Ok(Ok(())) => {
                self.next_request = request_id;
                Ok(request_id)
            }
            Ok(Err(e)) => {
                // Force a respawn on the next load.
                self.writer = None;
                Err(e).context("mpv IPC write failed")
            }
            Err(_) => {
                self.writer = None;
                bail!("mpv IPC write timed out")
            }
        }
    }

    fn kill(&mut self) {
        self.writer = None;
        self.events = None;
        self.next_request = 0;
        self.epoch = 0;
        self.acked = 0;
        if let Some(mut child) = self.process.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Default for MpvBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaBackend for MpvBackend {
    fn load(&mut self, uri: &str) -> Result<()> {
        self.ensure_running()?;
        self.epoch = self.send(json!(["loadfile", uri, "replace"]))?;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.send(json!(["set_property", "pause", false]))?;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.writer.is_none() {
            return Ok(());
        }
        self.epoch = self.send(json!(["stop"]))?;
        Ok(())
    }

    fn set_volume(&mut self, volume: Percent) -> Result<()> {
        self.volume = volume;
        if self.writer.is_none() {
            // Applied through --volume when mpv starts.
            return Ok(());
        }
        self.send(json!(["set_property", "volume", volume.as_u8()]))?;
        Ok(())
    }

    fn poll_failure(&mut self) -> Option<String> {
        loop {
            let received = self.events.as_ref()?.try_recv();
            match received {
                Ok(IpcEvent::Reply(request_id)) => self.acked = self.acked.max(request_id),
                Ok(IpcEvent::Failure(reason)) => {
                    if self.acked >= self.epoch {
                        return Some(reason);
                    }
                    debug!("mpv: dropping failure of a replaced stream: {}", reason);
                }
                Err(flume::TryRecvError::Empty) => return None,
                Err(flume::TryRecvError::Disconnected) => {
                    self.events = None;
                    self.writer = None;
                    return Some("mpv exited".to_string());
                }
            }
        }
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.process.is_none() {
            return Ok(());
        }
        if let Err(e) = self.send(json!(["quit"])) {
            debug!("mpv: quit not delivered: {:#}", e);
        }

        let mut exited = false;
        if let Some(child) = self.process.as_mut() {
            for _ in 0..20 {
                if child.try_wait().ok().flatten().is_some() {
                    exited = true;
                    break;
                }
                thread::sleep(Duration::from_millis(50));
            }
        }
        if !exited {
            warn!("mpv: did not quit in time, killing it");
        }
        self.kill();

        #[cfg(unix)]
        let _ = std::fs::remove_file(&self.socket_name);
        Ok(())
    }
}

impl Drop for MpvBackend {
    fn drop(&mut self) {
        self.kill();
    }
}

async fn reader_task(reader: IpcReader, event_tx: Sender<IpcEvent>) {
    let mut lines = BufReader::new(reader).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                debug!("mpv reader: read error: {}", e);
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let val: Value = match serde_json::from_str(trimmed) {
            Ok(v) => v,
            Err(e) => {
                debug!("mpv reader: invalid json '{}': {}", trimmed, e);
                continue;
            }
        };
        let Some(event) = ipc_event(&val) else {
            debug!("mpv reader: {}", trimmed);
            continue;
        };
        if let IpcEvent::Failure(reason) = &event {
            warn!("mpv: playback error: {}", reason);
        }
        if event_tx.send(event).is_err() {
            break;
        }
    }
    debug!("mpv reader: connection closed");
}

fn ipc_event(val: &Value) -> Option<IpcEvent> {
    if let Some(request_id) = val.get("request_id").and_then(Value::as_u64) {
        return Some(IpcEvent::Reply(request_id));
    }
    playback_error(val).map(IpcEvent::Failure)
}

/// The error text of an `end-file` event that ended in an error.
fn playback_error(val: &Value) -> Option<String> {
    if val.get("event")?.as_str()? != "end-file" || val.get("reason")?.as_str()? != "error" {
        return None;
    }
    Some(
        val.get("file_error")
            .and_then(Value::as_str)
            .unwrap_or("playback error")
            .to_string(),
    )
}

fn connect_with_retry(io: &Handle, socket_name: &str) -> Result<(IpcReader, IpcWriter)> {
    let mut last_err = None;
    for _ in 0..50 {
        thread::sleep(Duration::from_millis(100));
        match io.block_on(connect(socket_name)) {
            Ok(pair) => return Ok(pair),
            Err(e) => last_err = Some(e),
        }
    }
    match last_err {
        Some(e) => Err(e).context("mpv IPC socket did not appear"),
        None => bail!("mpv IPC socket did not appear"),
    }
}

#[cfg(unix)]
async fn connect(socket_name: &str) -> std::io::Result<(IpcReader, IpcWriter)> {
    let stream = tokio::net::UnixStream::connect(socket_name).await?;
    let (reader, writer) = stream.into_split();
    Ok((Box::new(reader), Box::new(writer)))
}

#[cfg(windows)]
async fn connect(socket_name: &str) -> std::io::Result<(IpcReader, IpcWriter)> {
    use tokio::net::windows::named_pipe::ClientOptions;

    let pipe = ClientOptions::new().open(ipc_address(socket_name))?;
    let (reader, writer) = tokio::io::split(pipe);
    Ok((Box::new(reader), Box::new(writer)))
}

#[cfg(unix)]
fn socket_name() -> String {
    format!(
        "{}/dialradio-mpv-{}.sock",
        std::env::temp_dir().display(),
        std::process::id()
    )
}

#[cfg(windows)]
fn socket_name() -> String {
    format!("dialradio-mpv-{}", std::process::id())
}

#[cfg(unix)]
fn ipc_address(socket_name: &str) -> String {
    socket_name.to_string()
}

#[cfg(windows)]
fn ipc_address(socket_name: &str) -> String {
    format!(r"\\.\pipe\{}", socket_name)
}

#[cfg(unix)]
fn mpv_binary_name() -> &'static str {
    "mpv"
}

#[cfg(windows)]
fn mpv_binary_name() -> &'static str {
    "mpv.exe"
}

/// Look for mpv next to the executable first, then on `PATH`.
fn find_mpv_binary() -> Option<PathBuf> {
    let name = mpv_binary_name();

    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let local = dir.join(name);
            if local.exists() {
                return Some(local);
            }
        }
    }

    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.exists())
}
