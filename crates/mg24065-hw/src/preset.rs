//! Display session presets.
//!
//! Each preset fixes the display mode, combine mode, number of graphic rows
//! and default row batching of an upload. The two text presets leave the
//! bottom text rows free by only drawing 60 graphic rows.

use crate::lcd::protocol::{CombineMode, DisplayMode};
use crate::{Error, Result, LCD_HEIGHT};
use std::str::FromStr;

/// Graphic rows drawn by the text presets.
pub const TEXT_PRESET_ROWS: usize = 60;

/// Upload preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// All 64 rows of graphics, no text layer, one write per byte.
    GraphicsOnly64,
    /// 60 graphic rows XORed with the text layer, cursor hidden.
    GraphicsText60Xor,
    /// 60 graphic rows XORed with the text layer, blinking cursor shown.
    #[default]
    GraphicsText60Blink,
}

/// How a row of packed bytes is put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowBatching {
    /// One length-prefixed bulk frame per row.
    Bulk,
    /// One single-byte write frame per packed byte.
    PerByte,
}

impl Preset {
    /// All presets, in display order.
    pub const ALL: [Preset; 3] = [
        Preset::GraphicsOnly64,
        Preset::GraphicsText60Xor,
        Preset::GraphicsText60Blink,
    ];

    /// Returns the display mode flags sent after reset.
    pub fn display_mode(&self) -> DisplayMode {
        match self {
            Preset::GraphicsOnly64 => DisplayMode::GRAPHICS,
            Preset::GraphicsText60Xor => DisplayMode::GRAPHICS | DisplayMode::TEXT,
            Preset::GraphicsText60Blink => DisplayMode::all(),
        }
    }

    /// Returns how the text layer is combined with graphics.
    pub fn combine_mode(&self) -> CombineMode {
        match self {
            Preset::GraphicsOnly64 => CombineMode::Or,
            Preset::GraphicsText60Xor | Preset::GraphicsText60Blink => CombineMode::Xor,
        }
    }

    /// Returns the number of graphic rows drawn.
    pub fn rows(&self) -> usize {
        match self {
            Preset::GraphicsOnly64 => LCD_HEIGHT,
            Preset::GraphicsText60Xor | Preset::GraphicsText60Blink => TEXT_PRESET_ROWS,
        }
    }

    /// Returns the row batching used unless overridden.
    pub fn default_batching(&self) -> RowBatching {
        match self {
            Preset::GraphicsOnly64 => RowBatching::PerByte,
            Preset::GraphicsText60Xor | Preset::GraphicsText60Blink => RowBatching::Bulk,
        }
    }

    /// Returns true if text labels are written after the graphics.
    pub fn has_text_layer(&self) -> bool {
        self.display_mode().contains(DisplayMode::TEXT)
    }

    /// Returns true if the cursor is shown and so gets positioned.
    pub fn shows_cursor(&self) -> bool {
        self.display_mode().contains(DisplayMode::CURSOR)
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "graphics-only-64" | "graphics_only_64" => Ok(Preset::GraphicsOnly64),
            "graphics-text-60-xor" | "graphics_text_60_xor" => Ok(Preset::GraphicsText60Xor),
            "graphics-text-60-blink" | "graphics_text_60_blink" => {
                Ok(Preset::GraphicsText60Blink)
            }
            _ => Err(Error::InvalidPreset(s.to_string())),
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Preset::GraphicsOnly64 => write!(f, "graphics-only-64"),
            Preset::GraphicsText60Xor => write!(f, "graphics-text-60-xor"),
            Preset::GraphicsText60Blink => write!(f, "graphics-text-60-blink"),
        }
    }
}

impl FromStr for RowBatching {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bulk" => Ok(RowBatching::Bulk),
            "per-byte" | "per_byte" => Ok(RowBatching::PerByte),
            _ => Err(Error::InvalidBatching(s.to_string())),
        }
    }
}

impl std::fmt::Display for RowBatching {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowBatching::Bulk => write!(f, "bulk"),
            RowBatching::PerByte => write!(f, "per-byte"),
        }
    }
}
