use dialradio_messages::Degrees;
use log::trace;
use serde::Deserialize;

use crate::error::ConfigError;

/// Which of the two physical knobs an event or action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnobId {
    Volume,
    Channel,
}

impl std::fmt::Display for KnobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Volume => write!(f, "volume"),
            Self::Channel => write!(f, "channel"),
        }
    }
}

/// One detent of rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// +1 step.
    Forward,
    /// -1 step.
    Backward,
}

/// How the sign of a raw wheel delta maps onto a rotation direction.
///
/// Applies to both knobs alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelPolarity {
    /// Positive delta turns the knob forward.
    Natural,
    /// Positive delta turns the knob backward.
    #[default]
    Inverted,
}

impl WheelPolarity {
    /// Returns `None` for a zero delta.
    pub fn direction(self, delta: f32) -> Option<Direction> {
        if delta == 0.0 || delta.is_nan() {
            return None;
        }
        let forward = match self {
            Self::Natural => delta > 0.0,
            Self::Inverted => delta < 0.0,
        };
        Some(if forward {
            Direction::Forward
        } else {
            Direction::Backward
        })
    }
}

/// Quantized rotary control.
///
/// Tracks one knob's position among `steps` evenly spaced stops. A knob with
/// a detent refuses to move between its last stop and stop 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Knob {
    steps: usize,
    detent: bool,
    position: usize,
}

impl Knob {
    pub fn new(id: KnobId, steps: usize, detent: bool) -> Result<Self, ConfigError> {
        if steps < 2 {
            return Err(ConfigError::TooFewSteps { knob: id, steps });
        }
        Ok(Self {
            steps,
            detent,
            position: 0,
        })
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn step_degrees(&self) -> f32 {
        360.0 / self.steps as f32
    }

    /// Rendered rotation of the knob.
    pub fn angle(&self) -> Degrees {
        Degrees((self.position as f32 * self.step_degrees()) % 360.0)
    }

    /// Turn one stop and return the resulting position.
    ///
    /// Crossing the detent is a no-op that returns the unchanged position.
    pub fn advance(&mut self, direction: Direction) -> usize {
        let last = self.steps - 1;
        let candidate = match direction {
            Direction::Forward => (self.position + 1) % self.steps,
            Direction::Backward => (self.position + last) % self.steps,
        };

        let crosses_detent = match direction {
            Direction::Forward => self.position == last,
            Direction::Backward => self.position == 0,
        };
        if self.detent && crosses_detent {
            trace!("detent holds knob at position {}", self.position);
            return self.position;
        }

        self.position = candidate;
        self.position
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }
}
