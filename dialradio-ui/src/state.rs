use dialradio_core::{DisplayLabel, EnginePlayer, KnobId, Panel, WheelEvent};
use dialradio_messages::Event;
use eframe::egui::Pos2;
use log::debug;

use crate::skin::Skin;

/// Scroll distance, in points, that turns a knob by one stop. A mouse wheel
/// notch arrives as one delta of about this size; trackpads send many
/// smaller ones.
const SCROLL_NOTCH: f32 = 50.0;

/// Local UI state: the dial panel plus the skin it is painted with.
pub(super) struct UiState {
    pub panel: Panel<EnginePlayer, DisplayLabel>,
    pub skin: Skin,
    /// Scroll delta not yet turned into a knob tick.
    scroll: f32,
}

/// What a primary press on the widget should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PressAction {
    Close,
    Drag,
}

impl UiState {
    pub fn new(panel: Panel<EnginePlayer, DisplayLabel>, skin: Skin) -> Self {
        Self {
            panel,
            skin,
            scroll: 0.0,
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        self.panel.controller_mut().handle_event(event);
    }

    /// Feed one frame's wheel delta at the pointer position. Deltas add up
    /// until they reach a notch, which is one tick.
    pub fn handle_wheel(&mut self, pos: Pos2, delta: f32) -> Option<KnobId> {
        if self.panel.hit_test(pos.x, pos.y).is_none() {
            self.scroll = 0.0;
            return None;
        }
        // A reversal starts a fresh notch.
        if self.scroll * delta < 0.0 {
            self.scroll = 0.0;
        }
        self.scroll += delta;
        if self.scroll.abs() < SCROLL_NOTCH {
            return None;
        }
        let delta = std::mem::take(&mut self.scroll);

        let knob = self.panel.on_wheel(WheelEvent {
            x: pos.x,
            y: pos.y,
            delta,
        });
        if let Some(knob) = knob {
            debug!(
                "{} knob at {}",
                knob,
                self.panel.knob(knob).angle()
            );
        }
        knob
    }

    pub fn handle_press(&self, pos: Pos2) -> PressAction {
        if self.skin.hits_close(pos) {
            PressAction::Close
        } else {
            PressAction::Drag
        }
    }

    /// Stop playback and release the player. Idempotent.
    pub fn shutdown(&mut self) {
        self.panel.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialradio_core::WidgetConfig;
    use dialradio_messages::{Command, Percent};
    use eframe::egui::{Context, pos2};

    fn setup_state() -> (UiState, flume::Receiver<Command>) {
        let mut config = WidgetConfig::embedded().unwrap();
        config.skin.background = "/nonexistent/radio.png".into();
        config.skin.knob = "/nonexistent/knob.png".into();
        config.skin.close_button = "/nonexistent/button.png".into();
        config.skin.font = "/nonexistent/SevenSegment.ttf".into();

        let ctx = Context::default();
        let skin = Skin::load(&ctx, &config);
        let (cmd_tx, cmd_rx) = flume::unbounded();
        let panel =
            Panel::from_config(&config, EnginePlayer::new(cmd_tx), DisplayLabel::default()).unwrap();

        // Initial volume
        assert_eq!(cmd_rx.try_recv(), Ok(Command::SetVolume(Percent(20))));
        (UiState::new(panel, skin), cmd_rx)
    }

    #[test]
    fn test_press_on_close_button_closes() {
        let (state, _cmd_rx) = setup_state();
        assert_eq!(state.handle_press(pos2(258.0, 26.0)), PressAction::Close);
        assert_eq!(state.handle_press(pos2(268.0, 16.0)), PressAction::Close);
    }

    #[test]
    fn test_press_elsewhere_drags() {
        let (state, _cmd_rx) = setup_state();
        assert_eq!(state.handle_press(pos2(271.0, 26.0)), PressAction::Drag);
        assert_eq!(state.handle_press(pos2(72.0, 77.0)), PressAction::Drag);
        assert_eq!(state.handle_press(pos2(5.0, 160.0)), PressAction::Drag);
    }

    #[test]
    fn test_small_deltas_add_up_to_one_tick() {
        let (mut state, cmd_rx) = setup_state();
        let volume = pos2(72.0, 77.0);

        for _ in 0..4 {
            assert_eq!(state.handle_wheel(volume, -12.0), None);
        }
        assert!(cmd_rx.is_empty());
        assert_eq!(state.panel.knob(KnobId::Volume).position(), 0);

        assert_eq!(state.handle_wheel(volume, -12.0), Some(KnobId::Volume));
        assert_eq!(state.panel.knob(KnobId::Volume).position(), 1);
        assert_eq!(cmd_rx.try_recv(), Ok(Command::SetVolume(Percent(100))));

        // The notch was used up.
        assert_eq!(state.handle_wheel(volume, -12.0), None);
        assert_eq!(state.panel.knob(KnobId::Volume).position(), 1);
    }

    #[test]
    fn test_wheel_notch_is_one_tick() {
        let (mut state, _cmd_rx) = setup_state();
        let volume = pos2(72.0, 77.0);

        assert_eq!(state.handle_wheel(volume, -50.0), Some(KnobId::Volume));
        assert_eq!(state.handle_wheel(volume, -50.0), Some(KnobId::Volume));
        assert_eq!(state.panel.knob(KnobId::Volume).position(), 2);
    }

    #[test]
    fn test_reversal_and_leaving_the_knob_reset_the_notch() {
        let (mut state, _cmd_rx) = setup_state();
        let volume = pos2(72.0, 77.0);

        assert_eq!(state.handle_wheel(volume, -40.0), None);
        assert_eq!(state.handle_wheel(volume, 20.0), None);
        assert_eq!(state.handle_wheel(volume, 20.0), None);

        assert_eq!(state.handle_wheel(volume, -40.0), None);
        assert_eq!(state.handle_wheel(pos2(160.0, 150.0), -40.0), None);
        assert_eq!(state.handle_wheel(volume, -40.0), None);
        assert_eq!(state.panel.knob(KnobId::Volume).position(), 0);
    }
}
