//! Rotary dial core: quantized knobs, position → action tables, the channel
//! registry and the playback controller that ties them to a player.

mod action;
mod channels;
mod config;
mod controller;
mod error;
mod knob;
mod panel;
mod player;
mod volume;

pub use action::{Action, ActionTable, ActionTables};
pub use channels::{ChannelEntry, ChannelRegistry, ChannelSlot};
pub use config::{
    ChannelConfig, ChannelKnobConfig, InputConfig, SkinConfig, VolumeKnobConfig, WidgetConfig,
    WindowConfig,
};
pub use controller::{PlaybackController, PlaybackState};
pub use error::{ConfigError, DialError, PlayerError};
pub use knob::{Direction, Knob, KnobId, WheelPolarity};
pub use panel::{Panel, WheelEvent};
pub use player::{DisplayLabel, EnginePlayer, LabelSink, PlayerHandle};
pub use volume::VolumeLevels;
