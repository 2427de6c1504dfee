mod command;
mod event;
mod units;

pub use command::Command;
pub use event::Event;
pub use units::{Degrees, Gain, Percent};
