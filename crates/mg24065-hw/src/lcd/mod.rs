//! LCD display module.
//!
//! Encodes bitmaps for the 240x64 MG24065G and drives uploads over a transport.

mod device;
mod encoder;

pub mod protocol;

pub use device::LcdDevice;
pub use encoder::{default_labels, Encoder, Session, TextLabel, DEFAULT_CURSOR};
pub use protocol::{CombineMode, DisplayMode, Frame, Opcode};
