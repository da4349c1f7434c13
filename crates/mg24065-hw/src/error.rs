//! Error types for the MG24065 hardware library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, encoding or transmitting an image.
#[derive(Error, Debug)]
pub enum Error {
    /// Bitmap does not start with the plain PBM tag.
    #[error("Only P1 ASCII format is supported, not {tag:?}")]
    Format { tag: String },

    /// Bitmap source could not be read.
    #[error("Failed to read bitmap: {0}")]
    BitmapRead(#[source] std::io::Error),

    /// Bitmap size line could not be parsed.
    #[error("Invalid bitmap size line: {0:?}")]
    Header(String),

    /// Bitmap declares a resolution the display does not have.
    #[error("Only 240x64 pixel is supported, not {width} x {height}")]
    Dimension { width: usize, height: usize },

    /// Pixel digit count differs from the declared size.
    #[error("Too little or too much data read; want {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Pixel data contains something other than '0' or '1'.
    #[error("Invalid pixel digit {0:?}")]
    InvalidPixel(char),

    /// Bitmap passed loading but cannot fill the rows a preset draws.
    #[error("Bitmap {width}x{height} cannot fill {rows} rows of 240 pixels")]
    Geometry {
        width: usize,
        height: usize,
        rows: usize,
    },

    /// Length-prefixed payload does not fit its length byte.
    #[error("Payload of {0} bytes does not fit a length byte")]
    PayloadTooLong(usize),

    /// Literal text the controller would interpret as commands.
    #[error("Text {0:?} must be printable ASCII without spaces or control bytes")]
    InvalidText(String),

    /// Text position outside the 40x8 text area.
    #[error("Text position {column}:{row} is outside the 40x8 text area")]
    TextPosition { column: u8, row: u8 },

    /// Cursor height outside 1-8 lines.
    #[error("Invalid cursor pattern (must be 1-8 lines): {0}")]
    InvalidCursorPattern(u8),

    /// Unknown preset name.
    #[error("Invalid preset: {0}")]
    InvalidPreset(String),

    /// Unknown combine mode name.
    #[error("Invalid combine mode: {0}")]
    InvalidCombineMode(String),

    /// Unknown row batching name.
    #[error("Invalid row batching: {0}")]
    InvalidBatching(String),

    /// Unknown transport kind.
    #[error("Invalid transport: {0}")]
    InvalidTransport(String),

    /// Transport device not found or could not be opened.
    #[error("Transport device not found at {0}")]
    TransportNotFound(String),

    /// USB HID communication error.
    #[error("USB HID error: {0}")]
    Hid(#[from] hidapi::HidError),

    /// Serial port communication error.
    #[error("Serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// I/O error while writing to a device.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true for failures of the underlying byte sink.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::TransportNotFound(_) | Error::Hid(_) | Error::Serial(_) | Error::Io(_)
        )
    }
}
