use dialradio_core::WidgetConfig;
use dialradio_engine::{Engine, MpvBackend};
use dialradio_messages::Command;

use log::{LevelFilter, info};
use std::io::Write;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .format(|buf, record| {
            writeln!(
                buf,
                "{:<5} - mod path |{}| - target | {} | args: |{}|",
                record.level(),
                record.module_path().unwrap_or(""),
                record.target(),
                record.args()
            )
        })
        .filter_level(LevelFilter::Info)
        .filter_module("eframe", LevelFilter::Warn)
        .filter_module("egui_glow", LevelFilter::Warn)
        .filter_module("dialradio_engine", LevelFilter::Info)
        .filter_module("dialradio_core", LevelFilter::Debug)
        .filter_module("dialradio_ui", LevelFilter::Debug)
        .parse_default_env()
        .init();

    // Optional config file path; the embedded layout otherwise
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = WidgetConfig::load(config_path.as_deref())?;
    info!("Loaded {} channels", config.channels.len());

    // Create flume channels for bidirectional communication
    let (cmd_tx, cmd_rx) = flume::unbounded();
    let (event_tx, event_rx) = flume::unbounded();

    // Spawn engine thread
    let engine_handle = std::thread::spawn(move || {
        let engine = Engine::new(cmd_rx, event_tx, Box::new(MpvBackend::new()));
        engine.run()
    });

    // Run UI on main thread (blocking)
    let ui_result = dialradio_ui::run(config, event_rx, cmd_tx.clone());

    // The UI released its player; make sure the engine hears about it even
    // if the UI never started
    let _ = cmd_tx.send(Command::Shutdown);
    drop(cmd_tx);

    // Wait for engine thread to finish
    engine_handle
        .join()
        .map_err(|_| anyhow::anyhow!("Engine thread panicked"))??;

    ui_result
}
