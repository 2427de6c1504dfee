mod skin;
mod state;

use dialradio_core::{DisplayLabel, EnginePlayer, KnobId, Panel, WidgetConfig};
use dialradio_messages::{Command, Event};
use eframe::egui::{self, ViewportCommand};
use log::info;
use state::{PressAction, UiState};
use std::time::Duration;

/// Main application struct implementing the egui App trait.
pub struct DialRadioApp {
    /// Receiver for events from engine
    event_rx: flume::Receiver<Event>,

    /// Local application state
    state: UiState,
}

impl DialRadioApp {
    fn new(
        ctx: &egui::Context,
        config: &WidgetConfig,
        panel: Panel<EnginePlayer, DisplayLabel>,
        event_rx: flume::Receiver<Event>,
    ) -> Self {
        let skin = skin::Skin::load(ctx, config);
        Self {
            event_rx,
            state: UiState::new(panel, skin),
        }
    }

    fn close(&mut self, ctx: &egui::Context) {
        info!("Close button pressed");
        // Player first, window second.
        self.state.shutdown();
        ctx.send_viewport_cmd(ViewportCommand::Close);
    }

    fn handle_input(&mut self, ctx: &egui::Context) {
        let (scroll, hover, press, close_requested) = ctx.input(|i| {
            (
                i.raw_scroll_delta,
                i.pointer.hover_pos(),
                i.pointer.primary_pressed().then(|| i.pointer.interact_pos()).flatten(),
                i.viewport().close_requested(),
            )
        });

        if let Some(pos) = hover {
            if scroll.y != 0.0 {
                self.state.handle_wheel(pos, scroll.y);
            }
        }

        if let Some(pos) = press {
            match self.state.handle_press(pos) {
                PressAction::Close => self.close(ctx),
                PressAction::Drag => ctx.send_viewport_cmd(ViewportCommand::StartDrag),
            }
        }

        if close_requested {
            self.state.shutdown();
        }
    }
}

impl eframe::App for DialRadioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 1. Process all pending engine events (non-blocking)
        while let Ok(event) = self.event_rx.try_recv() {
            self.state.handle_event(event);
        }

        // 2. Wheel, drag and close
        self.handle_input(ctx);

        // 3. Keep polling the engine while idle
        ctx.request_repaint_after(Duration::from_millis(200));

        // 4. Paint the widget face
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let skin = &self.state.skin;
                let panel = &self.state.panel;

                skin.paint_background(ui);
                for knob in [KnobId::Volume, KnobId::Channel] {
                    skin.paint_knob(ui, panel.center(knob), panel.knob(knob).angle());
                }
                skin.paint_close_button(ui);
                skin.paint_label(ui, panel.label().text());
            });
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }
}

/// Entry point for the UI module.
///
/// Runs the eframe application on the main thread (blocking). The player is
/// released before this returns.
pub fn run(
    config: WidgetConfig,
    event_rx: flume::Receiver<Event>,
    cmd_tx: flume::Sender<Command>,
) -> anyhow::Result<()> {
    let panel = Panel::from_config(&config, EnginePlayer::new(cmd_tx), DisplayLabel::default())?;

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size(skin::window_size(&config))
        .with_title(config.window.title.clone())
        .with_decorations(false)
        .with_transparent(true)
        .with_resizable(false);
    if config.window.always_on_top {
        viewport = viewport.with_always_on_top();
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let title = config.window.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            Ok(Box::new(DialRadioApp::new(
                &cc.egui_ctx,
                &config,
                panel,
                event_rx,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
