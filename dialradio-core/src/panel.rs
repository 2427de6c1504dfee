use log::trace;

use crate::action::ActionTables;
use crate::config::WidgetConfig;
use crate::controller::PlaybackController;
use crate::error::ConfigError;
use crate::knob::{Knob, KnobId, WheelPolarity};
use crate::player::{LabelSink, PlayerHandle};

/// A pointer-wheel tick in widget coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub x: f32,
    pub y: f32,
    pub delta: f32,
}

/// Both knobs, their action tables and the playback controller.
///
/// Routes wheel ticks to the knob under the pointer and applies whatever the
/// new position resolves to.
pub struct Panel<P, L>
where
    P: PlayerHandle,
    L: LabelSink,
{
    volume: Knob,
    channel: Knob,
    volume_center: [f32; 2],
    channel_center: [f32; 2],
    proximity: f32,
    polarity: WheelPolarity,
    actions: ActionTables,
    controller: PlaybackController<P, L>,
}

impl<P, L> Panel<P, L>
where
    P: PlayerHandle,
    L: LabelSink,
{
    pub fn from_config(config: &WidgetConfig, player: P, label: L) -> Result<Self, ConfigError> {
        let volume = Knob::new(
            KnobId::Volume,
            config.volume_knob.steps,
            config.volume_knob.detent,
        )?;
        let channel = Knob::new(
            KnobId::Channel,
            config.channel_knob.steps,
            config.channel_knob.detent,
        )?;
        let levels = config.volume_levels()?;
        let registry = config.channel_registry()?;
        let actions = ActionTables::new(&levels, channel.steps());

        // Both knobs start at position 0; the volume knob's position 0
        // resolves to the quietest level.
        let controller = PlaybackController::new(
            registry,
            player,
            label,
            config.skin.default_label.clone(),
            levels.quietest(),
        );

        Ok(Self {
            volume,
            channel,
            volume_center: config.volume_knob.center,
            channel_center: config.channel_knob.center,
            proximity: config.input.proximity,
            polarity: config.input.wheel,
            actions,
            controller,
        })
    }

    /// Which knob, if any, sits under `(x, y)`. The volume knob wins ties.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<KnobId> {
        let near = |[cx, cy]: [f32; 2]| (x - cx).abs() < self.proximity && (y - cy).abs() < self.proximity;
        if near(self.volume_center) {
            Some(KnobId::Volume)
        } else if near(self.channel_center) {
            Some(KnobId::Channel)
        } else {
            None
        }
    }

    /// Handle one wheel tick. Returns the knob it landed on, if any.
    pub fn on_wheel(&mut self, event: WheelEvent) -> Option<KnobId> {
        let id = self.hit_test(event.x, event.y)?;
        let direction = self.polarity.direction(event.delta)?;

        let knob = self.knob_mut(id);
        let before = knob.position();
        let position = knob.advance(direction);
        if position == before {
            trace!("{} knob did not move", id);
            return Some(id);
        }

        let action = self.actions.resolve(id, position);
        trace!("{} knob -> position {} -> {:?}", id, position, action);
        self.controller.apply(action);
        Some(id)
    }

    pub fn knob(&self, id: KnobId) -> &Knob {
        match id {
            KnobId::Volume => &self.volume,
            KnobId::Channel => &self.channel,
        }
    }

    fn knob_mut(&mut self, id: KnobId) -> &mut Knob {
        match id {
            KnobId::Volume => &mut self.volume,
            KnobId::Channel => &mut self.channel,
        }
    }

    pub fn center(&self, id: KnobId) -> [f32; 2] {
        match id {
            KnobId::Volume => self.volume_center,
            KnobId::Channel => self.channel_center,
        }
    }

    pub fn actions(&self) -> &ActionTables {
        &self.actions
    }

    pub fn controller(&self) -> &PlaybackController<P, L> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController<P, L> {
        &mut self.controller
    }

    pub fn label(&self) -> &L {
        self.controller.label()
    }

    pub fn shutdown(&mut self) {
        self.controller.shutdown();
    }
}
