//! MG24065 Hardware Library
//!
//! Encodes monochrome bitmaps into the command stream understood by the AVR
//! bridge in front of an Everbouquet MG24065G 240x64 graphic LCD, and writes
//! that stream over USB HID or a serial port.

pub mod bitmap;
pub mod error;
pub mod lcd;
pub mod preset;
pub mod transport;

pub use bitmap::{Bitmap, LoadOptions};
pub use error::{Error, Result};
pub use lcd::{CombineMode, Encoder, Frame, LcdDevice, Session, TextLabel};
pub use preset::{Preset, RowBatching};
pub use transport::{FileTransport, HidTransport, SerialTransport, Transport, TransportKind};

/// LCD display dimensions
pub const LCD_WIDTH: usize = 240;
pub const LCD_HEIGHT: usize = 64;

/// Horizontal pixels packed into one controller byte.
pub const PIXELS_PER_BYTE: usize = 6;

/// Bytes per display line, shared by the text and graphics areas.
pub const BYTES_PER_ROW: usize = LCD_WIDTH / PIXELS_PER_BYTE;

/// Text rows addressable in the text area (one per 8 pixel lines).
pub const TEXT_ROWS: usize = LCD_HEIGHT / 8;

/// Controller address where the graphics area begins (right after the text area).
pub const GRAPHICS_BASE: u16 = (BYTES_PER_ROW * TEXT_ROWS) as u16;
