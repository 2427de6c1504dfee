use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::channels::{ChannelEntry, ChannelRegistry, ChannelSlot};
use crate::error::ConfigError;
use crate::knob::{Knob, KnobId, WheelPolarity};
use crate::volume::VolumeLevels;

const EMBEDDED: &str = include_str!("../widget.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct WidgetConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub skin: SkinConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub volume_knob: VolumeKnobConfig,
    #[serde(default)]
    pub channel_knob: ChannelKnobConfig,
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_always_on_top")]
    pub always_on_top: bool,
    /// Window size used when the background image cannot be loaded.
    #[serde(default = "default_fallback_size")]
    pub fallback_size: [f32; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkinConfig {
    #[serde(default = "default_background")]
    pub background: PathBuf,
    #[serde(default = "default_knob")]
    pub knob: PathBuf,
    #[serde(default = "default_close_button")]
    pub close_button: PathBuf,
    #[serde(default = "default_font")]
    pub font: PathBuf,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_label_color")]
    pub label_color: [u8; 3],
    #[serde(default = "default_label_y")]
    pub label_y: f32,
    #[serde(default = "default_label")]
    pub default_label: String,
    #[serde(default = "default_close_center")]
    pub close_center: [f32; 2],
    #[serde(default = "default_close_radius")]
    pub close_radius: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub wheel: WheelPolarity,
    /// Half-width of the square around each knob centre that accepts wheel
    /// ticks.
    #[serde(default = "default_proximity")]
    pub proximity: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VolumeKnobConfig {
    #[serde(default = "default_volume_center")]
    pub center: [f32; 2],
    #[serde(default = "default_steps")]
    pub steps: usize,
    #[serde(default)]
    pub detent: bool,
    #[serde(default = "default_levels")]
    pub levels: Vec<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelKnobConfig {
    #[serde(default = "default_channel_center")]
    pub center: [f32; 2],
    #[serde(default = "default_steps")]
    pub steps: usize,
    #[serde(default = "default_channel_detent")]
    pub detent: bool,
}

/// One `[[channels]]` entry. An entry with neither name nor uri is a
/// disabled stop.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    pub index: u8,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            always_on_top: default_always_on_top(),
            fallback_size: default_fallback_size(),
        }
    }
}

impl Default for SkinConfig {
    fn default() -> Self {
        Self {
            background: default_background(),
            knob: default_knob(),
            close_button: default_close_button(),
            font: default_font(),
            font_size: default_font_size(),
            label_color: default_label_color(),
            label_y: default_label_y(),
            default_label: default_label(),
            close_center: default_close_center(),
            close_radius: default_close_radius(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            wheel: WheelPolarity::default(),
            proximity: default_proximity(),
        }
    }
}

impl Default for VolumeKnobConfig {
    fn default() -> Self {
        Self {
            center: default_volume_center(),
            steps: default_steps(),
            detent: false,
            levels: default_levels(),
        }
    }
}

impl Default for ChannelKnobConfig {
    fn default() -> Self {
        Self {
            center: default_channel_center(),
            steps: default_steps(),
            detent: default_channel_detent(),
        }
    }
}

fn default_title() -> String {
    "Dial Radio".to_string()
}

fn default_always_on_top() -> bool {
    true
}

fn default_fallback_size() -> [f32; 2] {
    [330.0, 170.0]
}

fn default_background() -> PathBuf {
    PathBuf::from("images/radio.png")
}

fn default_knob() -> PathBuf {
    PathBuf::from("images/knob.png")
}

fn default_close_button() -> PathBuf {
    PathBuf::from("images/button.png")
}

fn default_font() -> PathBuf {
    PathBuf::from("SevenSegment.ttf")
}

fn default_font_size() -> f32 {
    12.0
}

fn default_label_color() -> [u8; 3] {
    [255, 0, 0]
}

fn default_label_y() -> f32 {
    47.0
}

fn default_label() -> String {
    "Select channel".to_string()
}

fn default_close_center() -> [f32; 2] {
    [258.0, 26.0]
}

fn default_close_radius() -> f32 {
    12.0
}

fn default_proximity() -> f32 {
    50.0
}

fn default_volume_center() -> [f32; 2] {
    [72.0, 77.0]
}

fn default_channel_center() -> [f32; 2] {
    [252.0, 77.0]
}

fn default_steps() -> usize {
    5
}

fn default_channel_detent() -> bool {
    true
}

fn default_levels() -> Vec<f32> {
    vec![1.0, 0.85, 0.60, 0.35, 0.2]
}

impl WidgetConfig {
    /// The configuration compiled into the binary.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml_str(EMBEDDED)
    }

    /// Load `path` if given, the embedded configuration otherwise.
    ///
    /// Relative skin paths in a config file are taken relative to the file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Self::embedded();
        };

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        if let Some(base) = path.parent() {
            config.skin.rebase(base);
        }
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        Knob::new(KnobId::Volume, self.volume_knob.steps, self.volume_knob.detent)?;
        Knob::new(
            KnobId::Channel,
            self.channel_knob.steps,
            self.channel_knob.detent,
        )?;
        self.volume_levels()?;
        self.channel_registry()?;
        Ok(())
    }

    pub fn volume_levels(&self) -> Result<VolumeLevels, ConfigError> {
        VolumeLevels::new(self.volume_knob.levels.clone(), self.volume_knob.steps)
    }

    pub fn channel_registry(&self) -> Result<ChannelRegistry, ConfigError> {
        ChannelRegistry::new(self.channels.iter().map(|channel| {
            let slot = match (&channel.name, &channel.uri) {
                (None, None) => ChannelSlot::Disabled,
                (name, uri) => ChannelSlot::Station(ChannelEntry {
                    index: channel.index,
                    name: name.clone().unwrap_or_default(),
                    uri: uri.clone().unwrap_or_default(),
                }),
            };
            (channel.index, slot)
        }))
    }
}

impl SkinConfig {
    fn rebase(&mut self, base: &Path) {
        for path in [
            &mut self.background,
            &mut self.knob,
            &mut self.close_button,
            &mut self.font,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}
