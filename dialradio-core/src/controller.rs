use dialradio_messages::{Event, Gain};
use log::{debug, error, info, warn};

use crate::action::Action;
use crate::channels::{ChannelEntry, ChannelRegistry};
use crate::error::DialError;
use crate::player::{LabelSink, PlayerHandle};

/// What is playing and how loud.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub current_channel: Option<ChannelEntry>,
    pub is_playing: bool,
    pub current_volume: Gain,
}

/// Applies resolved knob actions to the player and the display label.
///
/// Owns the player handle exclusively; nothing else talks to the player.
pub struct PlaybackController<P, L>
where
    P: PlayerHandle,
    L: LabelSink,
{
    registry: ChannelRegistry,
    player: Option<P>,
    label: L,
    default_label: String,
    state: PlaybackState,
}

impl<P, L> PlaybackController<P, L>
where
    P: PlayerHandle,
    L: LabelSink,
{
    /// Starts idle with the label on `default_label` and the volume
    /// pre-set to `initial_volume`.
    pub fn new(
        registry: ChannelRegistry,
        player: P,
        mut label: L,
        default_label: impl Into<String>,
        initial_volume: Gain,
    ) -> Self {
        let default_label = default_label.into();
        label.set_text(&default_label);
        let mut controller = Self {
            registry,
            player: Some(player),
            label,
            default_label,
            state: PlaybackState {
                current_channel: None,
                is_playing: false,
                current_volume: initial_volume,
            },
        };
        controller.set_volume(initial_volume);
        controller
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn label(&self) -> &L {
        &self.label
    }

    pub fn is_released(&self) -> bool {
        self.player.is_none()
    }

    pub fn apply(&mut self, action: Action) {
        debug!("Applying {:?}", action);
        match action {
            Action::SelectChannel(index) => {
                if let Err(err) = self.select_channel(index) {
                    report(&err);
                }
            }
            Action::Stop => self.stop(),
            Action::SetVolume(level) => self.set_volume(level),
            Action::NoAction => {}
        }
    }

    /// React to a report from the player engine.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::OpenFailed { uri, reason } => {
                let is_current = self
                    .state
                    .current_channel
                    .as_ref()
                    .is_some_and(|entry| entry.uri == uri);
                if !is_current {
                    debug!("Ignoring stale failure for {}: {}", uri, reason);
                    return;
                }
                self.fall_back_to_idle();
                report(&DialError::PlaybackOpenFailure { uri, reason });
            }
            Event::Started { uri } => debug!("Engine started {}", uri),
            Event::Stopped => debug!("Engine stopped"),
        }
    }

    fn select_channel(&mut self, index: u8) -> Result<(), DialError> {
        let entry = self.registry.playable(index)?.clone();

        let opened = match self.player.as_mut() {
            Some(player) => {
                if self.state.is_playing {
                    if let Err(err) = player.stop() {
                        warn!("Failed to stop previous stream: {}", err);
                    }
                }
                player.set_media(&entry.uri).and_then(|()| player.play())
            }
            None => Err(crate::error::PlayerError::Released),
        };

        if let Err(err) = opened {
            self.fall_back_to_idle();
            return Err(DialError::PlaybackOpenFailure {
                uri: entry.uri,
                reason: err.to_string(),
            });
        }

        info!("Now playing channel {}: {} ({})", index, entry.name, entry.uri);
        self.label.set_text(&entry.name);
        self.state.current_channel = Some(entry);
        self.state.is_playing = true;
        Ok(())
    }

    fn stop(&mut self) {
        info!("Stopping playback");
        if self.state.is_playing {
            if let Some(player) = self.player.as_mut() {
                if let Err(err) = player.stop() {
                    warn!("Failed to stop playback: {}", err);
                }
            }
        }
        self.fall_back_to_idle();
    }

    fn set_volume(&mut self, level: Gain) {
        self.state.current_volume = level;
        let percent = level.to_percent();
        debug!("Volume set to {} ({})", level, percent);
        if let Some(player) = self.player.as_mut() {
            if let Err(err) = player.set_volume_percent(percent) {
                warn!("Failed to forward volume {}: {}", percent, err);
            }
        }
    }

    fn fall_back_to_idle(&mut self) {
        self.state.current_channel = None;
        self.state.is_playing = false;
        self.label.set_text(&self.default_label);
    }

    /// Stop playback and release the player. Safe to call more than once;
    /// the player is released only the first time.
    pub fn shutdown(&mut self) {
        let Some(mut player) = self.player.take() else {
            return;
        };
        info!("Shutting down playback");

        if self.state.is_playing {
            if let Err(err) = player.stop() {
                report(&DialError::ResourceTeardownFailure(err.to_string()));
            }
        }
        self.state.current_channel = None;
        self.state.is_playing = false;

        if let Err(err) = player.release() {
            report(&DialError::ResourceTeardownFailure(err.to_string()));
        }
    }
}

impl<P, L> Drop for PlaybackController<P, L>
where
    P: PlayerHandle,
    L: LabelSink,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn report(err: &DialError) {
    match err {
        DialError::ChannelUnavailable(_) => debug!("{err}"),
        DialError::InvalidPosition { .. } => warn!("{err}"),
        DialError::PlaybackOpenFailure { .. } | DialError::ResourceTeardownFailure(_) => {
            error!("{err}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::ChannelSlot;
    use crate::error::PlayerError;
    use dialradio_messages::Percent;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        SetMedia(String),
        Play,
        Stop,
        Volume(Percent),
        Release,
    }

    #[derive(Default)]
    struct Script {
        calls: Vec<Call>,
        fail_play: bool,
        fail_stop: bool,
    }

    #[derive(Clone, Default)]
    struct MockPlayer(Rc<RefCell<Script>>);

    impl MockPlayer {
        fn calls(&self) -> Vec<Call> {
            self.0.borrow().calls.clone()
        }

        fn count(&self, call: &Call) -> usize {
            self.0.borrow().calls.iter().filter(|c| *c == call).count()
        }

        fn record(&self, call: Call) {
            self.0.borrow_mut().calls.push(call);
        }
    }

    impl PlayerHandle for MockPlayer {
        fn set_media(&mut self, uri: &str) -> Result<(), PlayerError> {
            self.record(Call::SetMedia(uri.to_string()));
            Ok(())
        }

        fn play(&mut self) -> Result<(), PlayerError> {
            self.record(Call::Play);
            if self.0.borrow().fail_play {
                return Err(PlayerError::Backend("no route to host".to_string()));
            }
            Ok(())
        }

        fn stop(&mut self) -> Result<(), PlayerError> {
            self.record(Call::Stop);
            if self.0.borrow().fail_stop {
                return Err(PlayerError::Disconnected);
            }
            Ok(())
        }

        fn set_volume_percent(&mut self, percent: Percent) -> Result<(), PlayerError> {
            self.record(Call::Volume(percent));
            Ok(())
        }

        fn release(self) -> Result<(), PlayerError> {
            self.record(Call::Release);
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingLabel(Rc<RefCell<Vec<String>>>);

    impl LabelSink for RecordingLabel {
        fn set_text(&mut self, text: &str) {
            self.0.borrow_mut().push(text.to_string());
        }
    }

    impl RecordingLabel {
        fn last(&self) -> String {
            self.0.borrow().last().cloned().unwrap_or_default()
        }

        fn writes(&self) -> usize {
            self.0.borrow().len()
        }
    }

    fn registry() -> ChannelRegistry {
        let station = |index: u8, name: &str| {
            (
                index,
                ChannelSlot::Station(ChannelEntry {
                    index,
                    name: name.to_string(),
                    uri: format!("https://example.com/{index}"),
                }),
            )
        };
        ChannelRegistry::new([
            station(1, "City Radio"),
            station(2, "Retro Radio"),
            (5, ChannelSlot::Disabled),
        ])
        .unwrap()
    }

    fn controller() -> (
        PlaybackController<MockPlayer, RecordingLabel>,
        MockPlayer,
        RecordingLabel,
    ) {
        let player = MockPlayer::default();
        let label = RecordingLabel::default();
        let controller = PlaybackController::new(
            registry(),
            player.clone(),
            label.clone(),
            "Select channel",
            Gain(0.2),
        );
        (controller, player, label)
    }

    #[test]
    fn test_starts_idle_at_initial_volume() {
        let (controller, player, label) = controller();
        assert_eq!(
            controller.state(),
            &PlaybackState {
                current_channel: None,
                is_playing: false,
                current_volume: Gain(0.2),
            }
        );
        assert_eq!(player.calls(), vec![Call::Volume(Percent(20))]);
        assert_eq!(label.last(), "Select channel");
    }

    #[test]
    fn test_select_channel_loads_and_plays() {
        let (mut controller, player, label) = controller();
        controller.apply(Action::SelectChannel(2));

        assert!(controller.state().is_playing);
        assert_eq!(
            controller.state().current_channel.as_ref().map(|e| e.index),
            Some(2)
        );
        assert_eq!(label.last(), "Retro Radio");
        assert_eq!(
            player.calls()[1..],
            [
                Call::SetMedia("https://example.com/2".to_string()),
                Call::Play
            ]
        );
    }

    #[test]
    fn test_switching_channels_stops_previous_stream_first() {
        let (mut controller, player, _label) = controller();
        controller.apply(Action::SelectChannel(1));
        controller.apply(Action::SelectChannel(2));

        assert_eq!(
            player.calls()[3..],
            [
                Call::Stop,
                Call::SetMedia("https://example.com/2".to_string()),
                Call::Play
            ]
        );
    }

    #[test]
    fn test_disabled_channel_changes_nothing() {
        let (mut controller, player, label) = controller();
        controller.apply(Action::SelectChannel(1));
        let before = controller.state().clone();
        let calls_before = player.calls().len();
        let writes_before = label.writes();

        controller.apply(Action::SelectChannel(5));
        controller.apply(Action::SelectChannel(9));

        assert_eq!(controller.state(), &before);
        assert_eq!(player.calls().len(), calls_before);
        assert_eq!(label.writes(), writes_before);
    }

    #[test]
    fn test_stop_clears_channel_and_resets_label() {
        let (mut controller, player, label) = controller();
        controller.apply(Action::SelectChannel(1));
        controller.apply(Action::Stop);

        assert_eq!(controller.state().current_channel, None);
        assert!(!controller.state().is_playing);
        assert_eq!(label.last(), "Select channel");
        assert_eq!(player.calls().last(), Some(&Call::Stop));
    }

    #[test]
    fn test_set_volume_is_idempotent_and_leaves_label_alone() {
        let (mut controller, player, label) = controller();
        let writes_before = label.writes();

        controller.apply(Action::SetVolume(Gain(0.35)));
        let once = controller.state().clone();
        controller.apply(Action::SetVolume(Gain(0.35)));

        assert_eq!(controller.state(), &once);
        assert_eq!(controller.state().current_volume, Gain(0.35));
        assert_eq!(player.count(&Call::Volume(Percent(35))), 2);
        assert_eq!(label.writes(), writes_before);
    }

    #[test]
    fn test_select_stop_select_round_trip() {
        let (mut single, _, _) = controller();
        single.apply(Action::SelectChannel(1));

        let (mut round_trip, _, _) = controller();
        round_trip.apply(Action::SelectChannel(1));
        round_trip.apply(Action::Stop);
        round_trip.apply(Action::SelectChannel(1));

        assert_eq!(round_trip.state(), single.state());
    }

    #[test]
    fn test_no_action_has_no_effect() {
        let (mut controller, player, label) = controller();
        let before = controller.state().clone();
        controller.apply(Action::NoAction);
        assert_eq!(controller.state(), &before);
        assert_eq!(player.calls().len(), 1);
        assert_eq!(label.writes(), 1);
    }

    #[test]
    fn test_open_failure_reverts_to_no_selection() {
        let (mut controller, player, label) = controller();
        player.0.borrow_mut().fail_play = true;

        controller.apply(Action::SelectChannel(1));

        assert!(!controller.state().is_playing);
        assert_eq!(controller.state().current_channel, None);
        assert_eq!(label.last(), "Select channel");

        // Still interactive afterwards.
        player.0.borrow_mut().fail_play = false;
        controller.apply(Action::SelectChannel(2));
        assert!(controller.state().is_playing);
    }

    #[test]
    fn test_async_open_failure_for_current_stream() {
        let (mut controller, _player, label) = controller();
        controller.apply(Action::SelectChannel(1));

        controller.handle_event(Event::OpenFailed {
            uri: "https://example.com/1".to_string(),
            reason: "404".to_string(),
        });

        assert!(!controller.state().is_playing);
        assert_eq!(label.last(), "Select channel");
    }

    #[test]
    fn test_stale_open_failure_is_ignored() {
        let (mut controller, _player, label) = controller();
        controller.apply(Action::SelectChannel(2));

        controller.handle_event(Event::OpenFailed {
            uri: "https://example.com/1".to_string(),
            reason: "404".to_string(),
        });

        assert!(controller.state().is_playing);
        assert_eq!(label.last(), "Retro Radio");
    }

    #[test]
    fn test_shutdown_releases_player_exactly_once() {
        let (mut controller, player, _label) = controller();
        controller.apply(Action::SelectChannel(1));

        controller.shutdown();
        controller.shutdown();
        assert!(!controller.state().is_playing);
        assert!(controller.is_released());
        drop(controller);

        assert_eq!(player.count(&Call::Release), 1);
        assert_eq!(player.count(&Call::Stop), 1);
    }

    #[test]
    fn test_shutdown_releases_even_if_stop_fails() {
        let (mut controller, player, _label) = controller();
        controller.apply(Action::SelectChannel(1));
        player.0.borrow_mut().fail_stop = true;

        controller.shutdown();

        assert_eq!(player.count(&Call::Release), 1);
        assert!(!controller.state().is_playing);
    }

    #[test]
    fn test_drop_releases_player() {
        let (controller, player, _label) = controller();
        drop(controller);
        assert_eq!(player.count(&Call::Release), 1);
    }

    #[test]
    fn test_actions_after_shutdown_do_not_play() {
        let (mut controller, player, label) = controller();
        controller.shutdown();
        controller.apply(Action::SelectChannel(1));

        assert!(!controller.state().is_playing);
        assert_eq!(label.last(), "Select channel");
        assert_eq!(player.count(&Call::Play), 0);
    }
}
