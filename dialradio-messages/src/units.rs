/// Fractional output gain in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Gain(pub f32);

impl std::fmt::Display for Gain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Gain {
    /// Integer percentage as understood by media players, `round(gain * 100)`.
    pub fn to_percent(self) -> Percent {
        Percent((self.0.clamp(0.0, 1.0) * 100.0).round() as u8)
    }
}

/// Volume percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percent(pub u8);

impl std::fmt::Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Percent {
    pub const fn as_u8(self) -> u8 {
        self.0
    }
}

/// Rotation angle in degrees, counter-clockwise from the knob's rest position.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Degrees(pub f32);

impl std::fmt::Display for Degrees {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}°", self.0)
    }
}

impl Degrees {
    pub fn to_radians(self) -> f32 {
        self.0.to_radians()
    }

    pub const fn as_degrees(self) -> f32 {
        self.0
    }
}
