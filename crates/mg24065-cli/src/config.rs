//! Configuration management.

use anyhow::{Context, Result};
use mg24065_hw::lcd::{default_labels, DEFAULT_CURSOR};
use mg24065_hw::transport::DEFAULT_BAUD_RATE;
use mg24065_hw::{CombineMode, LoadOptions, Preset, RowBatching, Session, TextLabel};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Transport configuration
    #[serde(default)]
    pub transport: TransportConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Transport kind: hid, serial or file
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Device path (hidraw node, tty, or file; "-" for stdout)
    #[serde(default)]
    pub device: Option<String>,

    /// Serial baud rate
    #[serde(default = "default_baud")]
    pub baud: u32,

    /// HID vendor id, used when no device path is given
    #[serde(default)]
    pub vid: Option<u16>,

    /// HID product id, used when no device path is given
    #[serde(default)]
    pub pid: Option<u16>,

    /// Delay after reset in milliseconds (transport default when unset)
    #[serde(default)]
    pub settle_ms: Option<u64>,

    /// Prefix frames with the HID report number (file transport only)
    #[serde(default)]
    pub report_prefix: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            device: None,
            baud: default_baud(),
            vid: None,
            pid: None,
            settle_ms: None,
            report_prefix: false,
        }
    }
}

/// Display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Preset name
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Row batching override: bulk or per-byte
    #[serde(default)]
    pub batching: Option<String>,

    /// Require the bitmap to be exactly 240x64
    #[serde(default)]
    pub strict_dimensions: bool,

    /// Combine mode override: or, xor, and, text-attribute
    #[serde(default)]
    pub combine: Option<String>,

    /// Send the cursor position for presets that show the cursor
    #[serde(default = "default_true")]
    pub show_cursor: bool,

    /// Cursor cell for presets that show the cursor
    #[serde(default)]
    pub cursor: Option<CellConfig>,

    /// Cursor height in lines (1-8); left to the controller when unset
    #[serde(default)]
    pub cursor_lines: Option<u8>,

    /// Text layer labels (built-in greeting when unset)
    #[serde(default)]
    pub labels: Option<Vec<LabelConfig>>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            batching: None,
            strict_dimensions: false,
            combine: None,
            show_cursor: true,
            cursor: None,
            cursor_lines: None,
            labels: None,
        }
    }
}

/// A text layer cell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CellConfig {
    pub column: u8,
    pub row: u8,
}

/// A text layer label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    pub column: u8,
    pub row: u8,
    pub text: String,
}

// Default value functions
fn default_kind() -> String {
    "hid".to_string()
}

fn default_baud() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_true() -> bool {
    true
}

fn default_preset() -> String {
    Preset::default().to_string()
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }
}

impl DisplayConfig {
    /// Builds the upload session described by this configuration.
    pub fn session(&self) -> Result<Session> {
        let preset: Preset = self.preset.parse()?;
        let mut session = Session::new(preset);

        if let Some(batching) = &self.batching {
            session = session.with_batching(batching.parse::<RowBatching>()?);
        }

        if let Some(combine) = &self.combine {
            session = session.with_combine(combine.parse::<CombineMode>()?);
        }
        if let Some(lines) = self.cursor_lines {
            session = session.with_cursor_lines(lines);
        }

        let cursor = self
            .show_cursor
            .then(|| self.cursor.map_or(DEFAULT_CURSOR, |cell| (cell.column, cell.row)));
        session = session.with_cursor(cursor);

        let labels = match &self.labels {
            Some(labels) => labels
                .iter()
                .map(|l| TextLabel::new(l.column, l.row, l.text.clone()))
                .collect(),
            None => default_labels(),
        };
        Ok(session.with_labels(labels))
    }

    /// Returns the bitmap load options.
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            strict_dimensions: self.strict_dimensions,
        }
    }
}
