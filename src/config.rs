use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    bitmap::Color,
    effects::EdgeSelector,
    error::{ConfigError, Result},
    pipeline::TransformKind,
};

/// Environment variable holding the tab-separated input paths in file mode
pub const FILES_ENV: &str = "files";

/// Environment variable holding the text drawn by `pad_text`
pub const TEXT_ENV: &str = "text";

/// Main configuration for pastefx
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rounded corners and gradient background
    pub beautify: BeautifyConfig,

    /// Torn-edge silhouette transfer
    pub torn_edge: TornEdgeConfig,

    /// Text band appended below the image
    pub pad_text: PadTextConfig,

    /// Encoder settings
    pub output: OutputConfig,

    /// Notification titles
    pub workflow: WorkflowNames,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use the defaults; validates either way.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.beautify.validate()?;
        self.torn_edge.validate()?;
        self.pad_text.validate()?;
        Ok(())
    }

    /// Title used for notifications about `kind`
    pub fn workflow_name(&self, kind: TransformKind) -> &str {
        match kind {
            TransformKind::Beautify => &self.workflow.beautify,
            TransformKind::TornEdge => &self.workflow.torn_edge,
            TransformKind::WhiteBg => &self.workflow.whitebg,
            TransformKind::PadText => &self.workflow.pad_text,
        }
    }
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn check_ratio(key: &str, ratio: f32) -> Result<()> {
    if !(ratio > 0.0 && ratio <= 1.0) {
        return Err(invalid(key, ratio).into());
    }
    Ok(())
}

/// Rounded-corner and gradient settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeautifyConfig {
    /// Corner radius as a fraction of the image width
    pub radius_ratio: f32,

    /// Upper bound on the corner radius (pixels)
    pub max_radius: u32,

    /// Padding as a fraction of the rounded image width
    pub padding_ratio: f32,

    /// Upper bound on the padding (pixels)
    pub max_padding: u32,

    /// Gradient colour at the top row
    pub start_color: Color,

    /// Gradient colour at the bottom row
    pub end_color: Color,
}

impl Default for BeautifyConfig {
    fn default() -> Self {
        Self {
            radius_ratio: 0.05,
            max_radius: 15,
            padding_ratio: 0.05,
            max_padding: 10,
            start_color: Color::rgb(102, 42, 197),
            end_color: Color::rgb(238, 61, 165),
        }
    }
}

impl BeautifyConfig {
    fn validate(&self) -> Result<()> {
        check_ratio("beautify.radius_ratio", self.radius_ratio)?;
        check_ratio("beautify.padding_ratio", self.padding_ratio)?;
        Ok(())
    }

    /// `min(width * radius_ratio, max_radius)`, truncated
    pub fn radius_for(&self, width: u32) -> u32 {
        ((width as f32 * self.radius_ratio) as u32).min(self.max_radius)
    }

    /// `min(width * padding_ratio, max_padding)`, truncated
    pub fn padding_for(&self, width: u32) -> u32 {
        ((width as f32 * self.padding_ratio) as u32).min(self.max_padding)
    }
}

/// Torn-edge settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TornEdgeConfig {
    /// Strip thickness in pixels
    pub thickness: u32,

    /// Which borders to tear
    pub edge: EdgeSelector,

    /// Bitmap whose border alpha defines the torn silhouette
    pub reference_path: PathBuf,
}

impl Default for TornEdgeConfig {
    fn default() -> Self {
        Self {
            thickness: 80,
            edge: EdgeSelector::All,
            reference_path: PathBuf::from("base.png"),
        }
    }
}

impl TornEdgeConfig {
    fn validate(&self) -> Result<()> {
        if self.reference_path.as_os_str().is_empty() {
            return Err(invalid("torn_edge.reference_path", "").into());
        }
        Ok(())
    }
}

/// Text band settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PadTextConfig {
    pub font_path: PathBuf,

    /// Em size in pixels
    pub font_size: f32,

    /// Background of the added band
    pub pad_color: Color,

    pub text_color: Color,

    /// Wrapping width as a fraction of the image width
    pub max_width_ratio: f32,

    /// Vertical space around the text block, split evenly above and below
    pub margin: u32,

    /// Text used when none is supplied by the environment
    pub default_text: String,
}

impl Default for PadTextConfig {
    fn default() -> Self {
        Self {
            font_path: PathBuf::from("/System/Library/Fonts/Hiragino Sans GB.ttc"),
            font_size: 24.0,
            pad_color: Color::WHITE,
            text_color: Color::BLACK,
            max_width_ratio: 0.9,
            margin: 20,
            default_text: "默认文本：你好世界".to_string(),
        }
    }
}

impl PadTextConfig {
    fn validate(&self) -> Result<()> {
        if !(self.font_size > 0.0) {
            return Err(invalid("pad_text.font_size", self.font_size).into());
        }
        check_ratio("pad_text.max_width_ratio", self.max_width_ratio)?;
        Ok(())
    }
}

/// Encoder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Frame duration used when a GIF frame carries none (ms)
    pub default_frame_ms: u32,

    /// Floyd-Steinberg dithering when mapping GIF frames onto the shared palette
    pub dither: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_frame_ms: 100,
            dither: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowNames {
    pub beautify: String,
    pub torn_edge: String,
    pub whitebg: String,
    pub pad_text: String,
}

impl Default for WorkflowNames {
    fn default() -> Self {
        Self {
            beautify: "Beautify Screenshot".to_string(),
            torn_edge: "Torn Edge Effect".to_string(),
            whitebg: "WhiteBG Processor".to_string(),
            pad_text: "Pad Text Processor".to_string(),
        }
    }
}
