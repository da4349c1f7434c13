//! LCD bridge protocol definitions and encoding.
//!
//! Protocol structure:
//! - Every command is one opcode byte followed by a fixed payload, except bulk
//!   writes which carry a length byte and up to 255 data bytes
//! - Bytes above 0x20 outside a command are written to display memory as text
//! - Nothing is ever read back
//! - HID transports prefix each frame with report id 0x00

use crate::{Error, Result, BYTES_PER_ROW, PIXELS_PER_BYTE, TEXT_ROWS};
use bitflags::bitflags;
use std::str::FromStr;

/// HID report number sent ahead of every frame.
pub const REPORT_ID: u8 = 0x00;

/// Largest payload a bulk write can carry.
pub const MAX_BULK_LEN: usize = u8::MAX as usize;

/// Bridge opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    /// Write one byte at the write pointer and advance it.
    WriteByte = 0x01,
    /// Set the write pointer (low byte, high byte).
    SetWritePointer = 0x03,
    /// Re-run controller initialisation, clearing display memory.
    Reset = 0x05,
    /// Set how text and graphics are combined.
    SetCombineMode = 0x06,
    /// Set which layers, cursor and blink are shown.
    SetDisplayMode = 0x07,
    /// Set the cursor height in lines.
    SetCursorPattern = 0x08,
    /// Write a length-prefixed run of bytes.
    BulkWrite = 0x09,
    /// Move the text cursor (column, row).
    SetCursorPosition = 0x10,
}

bitflags! {
    /// Display mode flags; the bridge keeps only the low nibble.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DisplayMode: u8 {
        const BLINK    = 0x01;
        const CURSOR   = 0x02;
        const TEXT     = 0x04;
        const GRAPHICS = 0x08;
    }
}

/// Text/graphics combine modes; the bridge keeps only the low three bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CombineMode {
    Or = 0x00,
    Xor = 0x01,
    And = 0x03,
    /// Graphics area holds text attributes instead of pixels.
    TextAttribute = 0x04,
}

impl CombineMode {
    /// All combine modes, in opcode value order.
    pub const ALL: [CombineMode; 4] = [
        CombineMode::Or,
        CombineMode::Xor,
        CombineMode::And,
        CombineMode::TextAttribute,
    ];
}

impl FromStr for CombineMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "or" => Ok(CombineMode::Or),
            "xor" => Ok(CombineMode::Xor),
            "and" => Ok(CombineMode::And),
            "text-attribute" | "text_attribute" => Ok(CombineMode::TextAttribute),
            _ => Err(Error::InvalidCombineMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for CombineMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CombineMode::Or => write!(f, "or"),
            CombineMode::Xor => write!(f, "xor"),
            CombineMode::And => write!(f, "and"),
            CombineMode::TextAttribute => write!(f, "text-attribute"),
        }
    }
}

/// One command for the bridge.
///
/// A frame without an opcode is a literal text write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    opcode: Option<Opcode>,
    payload: Vec<u8>,
}

impl Frame {
    fn command(opcode: Opcode, payload: Vec<u8>) -> Self {
        Self {
            opcode: Some(opcode),
            payload,
        }
    }

    /// Builds a reset frame.
    pub fn reset() -> Self {
        Self::command(Opcode::Reset, Vec::new())
    }

    /// Builds a display mode frame.
    pub fn display_mode(mode: DisplayMode) -> Self {
        Self::command(Opcode::SetDisplayMode, vec![mode.bits()])
    }

    /// Builds a combine mode frame.
    pub fn combine_mode(mode: CombineMode) -> Self {
        Self::command(Opcode::SetCombineMode, vec![mode as u8])
    }

    /// Builds a write pointer frame (little-endian address).
    pub fn write_pointer(address: u16) -> Self {
        Self::command(Opcode::SetWritePointer, address.to_le_bytes().to_vec())
    }

    /// Builds a single byte write frame.
    pub fn write_byte(byte: u8) -> Self {
        Self::command(Opcode::WriteByte, vec![byte])
    }

    /// Builds a bulk write frame.
    pub fn bulk(data: &[u8]) -> Result<Self> {
        if data.len() > MAX_BULK_LEN {
            return Err(Error::PayloadTooLong(data.len()));
        }
        let mut payload = Vec::with_capacity(data.len() + 1);
        payload.push(data.len() as u8);
        payload.extend_from_slice(data);
        Ok(Self::command(Opcode::BulkWrite, payload))
    }

    /// Builds a cursor pattern frame for a cursor 1-8 lines high.
    pub fn cursor_pattern(lines: u8) -> Result<Self> {
        if !(1..=8).contains(&lines) {
            return Err(Error::InvalidCursorPattern(lines));
        }
        Ok(Self::command(Opcode::SetCursorPattern, vec![lines - 1]))
    }

    /// Builds a cursor position frame.
    pub fn cursor_position(column: u8, row: u8) -> Result<Self> {
        check_text_position(column, row)?;
        Ok(Self::command(Opcode::SetCursorPosition, vec![column, row]))
    }

    /// Builds a literal text frame.
    ///
    /// The bridge treats bytes up to 0x20 as commands, so spaces and control
    /// characters cannot be written this way.
    pub fn text(text: &str) -> Result<Self> {
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(Error::InvalidText(text.to_string()));
        }
        Ok(Self {
            opcode: None,
            payload: text.as_bytes().to_vec(),
        })
    }

    /// Returns the opcode, or None for literal text.
    pub fn opcode(&self) -> Option<Opcode> {
        self.opcode
    }

    /// Returns the bytes following the opcode.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Returns true for the reset command.
    pub fn is_reset(&self) -> bool {
        self.opcode == Some(Opcode::Reset)
    }

    /// Returns the number of bytes this frame occupies on the wire.
    pub fn wire_len(&self) -> usize {
        usize::from(self.opcode.is_some()) + self.payload.len()
    }

    /// Appends the wire bytes to a buffer.
    pub fn encode_into(&self, buffer: &mut Vec<u8>) {
        if let Some(opcode) = self.opcode {
            buffer.push(opcode as u8);
        }
        buffer.extend_from_slice(&self.payload);
    }

    /// Returns the wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.wire_len());
        self.encode_into(&mut buffer);
        buffer
    }
}

/// Packs pixels into controller bytes, six per byte, leftmost pixel in bit 5.
///
/// A bit is set for pixels whose source digit was `0`.
// TODO: check the ink polarity against a real panel; PBM uses 1 for black,
// yet 0 is what lights a pixel here.
pub fn pack_pixels(pixels: &[bool]) -> Vec<u8> {
    pixels
        .chunks(PIXELS_PER_BYTE)
        .map(|group| {
            group
                .iter()
                .enumerate()
                .filter(|&(_, &pixel)| !pixel)
                .fold(0u8, |byte, (i, _)| byte | 1 << (PIXELS_PER_BYTE - 1 - i))
        })
        .collect()
}

/// Returns the text area address of a character cell.
pub fn text_offset(column: u8, row: u8) -> Result<u16> {
    check_text_position(column, row)?;
    Ok(u16::from(row) * BYTES_PER_ROW as u16 + u16::from(column))
}

fn check_text_position(column: u8, row: u8) -> Result<()> {
    if usize::from(column) >= BYTES_PER_ROW || usize::from(row) >= TEXT_ROWS {
        return Err(Error::TextPosition { column, row });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn test_pack_alternating_group() {
        assert_eq!(pack_pixels(&digits("010101")), vec![0x2A]);
        assert_eq!(pack_pixels(&digits("111111")), vec![0x00]);
        assert_eq!(pack_pixels(&digits("011111")), vec![0x20]);
        assert_eq!(pack_pixels(&digits("111110")), vec![0x01]);
    }

    #[test]
    fn test_lit_row_bulk_frame() {
        let row = pack_pixels(&vec![false; 240]);
        assert_eq!(row.len(), BYTES_PER_ROW);

        let bytes = Frame::bulk(&row).unwrap().to_bytes();
        assert_eq!(bytes.len(), 42);
        assert_eq!(&bytes[..2], &[0x09, 0x28]);
        assert!(bytes[2..].iter().all(|&b| b == 0x3F));
    }

    #[test]
    fn test_bulk_length_must_fit_a_byte() {
        assert_eq!(Frame::bulk(&[0; 255]).unwrap().wire_len(), 257);
        assert!(matches!(
            Frame::bulk(&[0; 256]),
            Err(Error::PayloadTooLong(256))
        ));
    }

    #[test]
    fn test_fixed_frames() {
        assert_eq!(Frame::reset().to_bytes(), vec![0x05]);
        assert_eq!(Frame::display_mode(DisplayMode::all()).to_bytes(), vec![0x07, 0x0f]);
        assert_eq!(Frame::combine_mode(CombineMode::Xor).to_bytes(), vec![0x06, 0x01]);
        assert_eq!(Frame::write_pointer(0x0140).to_bytes(), vec![0x03, 0x40, 0x01]);
        assert_eq!(Frame::write_byte(0x3F).to_bytes(), vec![0x01, 0x3F]);
        assert_eq!(
            Frame::cursor_position(27, 2).unwrap().to_bytes(),
            vec![0x10, 27, 2]
        );
        assert_eq!(Frame::cursor_pattern(4).unwrap().to_bytes(), vec![0x08, 0x03]);
        assert!(Frame::reset().is_reset());
        assert!(!Frame::write_byte(0x05).is_reset());
    }

    #[test]
    fn test_cursor_pattern_range() {
        assert!(Frame::cursor_pattern(1).is_ok());
        assert!(Frame::cursor_pattern(8).is_ok());
        assert!(matches!(
            Frame::cursor_pattern(0),
            Err(Error::InvalidCursorPattern(0))
        ));
        assert!(Frame::cursor_pattern(9).is_err());
    }

    #[test]
    fn test_combine_mode_names() {
        for mode in CombineMode::ALL {
            assert_eq!(mode.to_string().parse::<CombineMode>().unwrap(), mode);
        }
        assert_eq!("AND".parse::<CombineMode>().unwrap(), CombineMode::And);
        assert_eq!(
            "text_attribute".parse::<CombineMode>().unwrap(),
            CombineMode::TextAttribute
        );
        assert_eq!(
            Frame::combine_mode(CombineMode::TextAttribute).to_bytes(),
            vec![0x06, 0x04]
        );
        assert!(matches!(
            "nand".parse::<CombineMode>(),
            Err(Error::InvalidCombineMode(_))
        ));
    }

    #[test]
    fn test_text_frame() {
        let frame = Frame::text("Text_Layer.").unwrap();
        assert_eq!(frame.opcode(), None);
        assert_eq!(frame.to_bytes(), b"Text_Layer.".to_vec());

        assert!(matches!(Frame::text("Hello world"), Err(Error::InvalidText(_))));
        assert!(Frame::text("tab\there").is_err());
        assert!(Frame::text("").is_err());
        assert!(Frame::text("caf\u{e9}").is_err());
    }

    #[test]
    fn test_text_offset() {
        assert_eq!(text_offset(17, 2).unwrap(), 97);
        assert_eq!(text_offset(0, 0).unwrap(), 0);
        assert_eq!(text_offset(39, 7).unwrap(), 319);
        assert!(matches!(
            text_offset(40, 0),
            Err(Error::TextPosition { column: 40, row: 0 })
        ));
        assert!(text_offset(0, 8).is_err());
    }
}
