use dialradio_messages::Gain;
use log::warn;

use crate::error::DialError;
use crate::knob::KnobId;
use crate::volume::VolumeLevels;

/// Semantic effect of a knob position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    SelectChannel(u8),
    Stop,
    SetVolume(Gain),
    NoAction,
}

/// Position → action lookup for a single knob.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionTable {
    knob: KnobId,
    actions: Vec<Action>,
}

impl ActionTable {
    /// Position 0 stops playback; each following position selects the next
    /// lower channel index, from `steps - 1` down to 1.
    pub fn channel(steps: usize) -> Self {
        let actions = (0..steps)
            .map(|position| match position {
                0 => Action::Stop,
                p => u8::try_from(steps - p).map_or(Action::NoAction, Action::SelectChannel),
            })
            .collect();
        Self {
            knob: KnobId::Channel,
            actions,
        }
    }

    /// Position `p` sets level `p`; position 0 shares the last level since
    /// a full turn lands back on it.
    pub fn volume(levels: &VolumeLevels) -> Self {
        let steps = levels.len();
        let actions = (0..steps)
            .map(|position| {
                let stop = if position == 0 { steps } else { position };
                levels
                    .level(stop)
                    .map_or(Action::NoAction, Action::SetVolume)
            })
            .collect();
        Self {
            knob: KnobId::Volume,
            actions,
        }
    }

    /// Total over all positions: anything out of range is logged and
    /// resolves to [`Action::NoAction`].
    pub fn resolve(&self, position: usize) -> Action {
        match self.actions.get(position) {
            Some(action) => *action,
            None => {
                let err = DialError::InvalidPosition {
                    knob: self.knob,
                    position,
                    steps: self.actions.len(),
                };
                warn!("{err}");
                Action::NoAction
            }
        }
    }
}

/// Action tables for both knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionTables {
    volume: ActionTable,
    channel: ActionTable,
}

impl ActionTables {
    pub fn new(levels: &VolumeLevels, channel_steps: usize) -> Self {
        Self {
            volume: ActionTable::volume(levels),
            channel: ActionTable::channel(channel_steps),
        }
    }

    pub fn resolve(&self, knob: KnobId, position: usize) -> Action {
        self.table(knob).resolve(position)
    }

    pub fn table(&self, knob: KnobId) -> &ActionTable {
        match knob {
            KnobId::Volume => &self.volume,
            KnobId::Channel => &self.channel,
        }
    }
}
