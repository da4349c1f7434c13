//! Bitmap to frame sequence encoding.

use super::protocol::{pack_pixels, text_offset, CombineMode, Frame};
use crate::bitmap::Bitmap;
use crate::preset::{Preset, RowBatching};
use crate::{Error, Result, GRAPHICS_BASE, LCD_WIDTH};
use tracing::debug;

/// Cursor cell used when none is configured.
pub const DEFAULT_CURSOR: (u8, u8) = (27, 2);

/// Literal text placed in the text layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLabel {
    pub column: u8,
    pub row: u8,
    pub text: String,
}

impl TextLabel {
    pub fn new(column: u8, row: u8, text: impl Into<String>) -> Self {
        Self {
            column,
            row,
            text: text.into(),
        }
    }
}

/// Labels written when none are configured.
pub fn default_labels() -> Vec<TextLabel> {
    vec![
        TextLabel::new(0, 0, "Hello."),
        TextLabel::new(17, 2, "Text_Layer."),
    ]
}

/// Everything about an upload except the image itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub preset: Preset,
    /// Overrides the preset's row batching.
    pub batching: Option<RowBatching>,
    /// Text layer contents, ignored by presets without a text layer.
    pub labels: Vec<TextLabel>,
    /// Cursor cell, ignored by presets that hide the cursor.
    pub cursor: Option<(u8, u8)>,
    /// Cursor height in lines (1-8); the controller keeps its own when unset.
    pub cursor_lines: Option<u8>,
    /// Overrides the preset's combine mode.
    pub combine: Option<CombineMode>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Preset::default())
    }
}

impl Session {
    /// Creates a session with the default labels and cursor.
    pub fn new(preset: Preset) -> Self {
        Self {
            preset,
            batching: None,
            labels: default_labels(),
            cursor: Some(DEFAULT_CURSOR),
            cursor_lines: None,
            combine: None,
        }
    }

    pub fn with_batching(mut self, batching: RowBatching) -> Self {
        self.batching = Some(batching);
        self
    }

    pub fn with_labels(mut self, labels: Vec<TextLabel>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_cursor(mut self, cursor: Option<(u8, u8)>) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn with_cursor_lines(mut self, lines: u8) -> Self {
        self.cursor_lines = Some(lines);
        self
    }

    pub fn with_combine(mut self, combine: CombineMode) -> Self {
        self.combine = Some(combine);
        self
    }

    /// Returns the combine mode in effect.
    pub fn combine_mode(&self) -> CombineMode {
        self.combine.unwrap_or(self.preset.combine_mode())
    }

    /// Returns the row batching in effect.
    pub fn batching(&self) -> RowBatching {
        self.batching.unwrap_or(self.preset.default_batching())
    }
}

/// Turns a bitmap into the frames of one upload.
pub struct Encoder<'a> {
    bitmap: &'a Bitmap,
    preset: Preset,
    batching: RowBatching,
    setup: Vec<Frame>,
    text: Vec<Frame>,
}

impl<'a> Encoder<'a> {
    /// Validates the bitmap and text layer against the session.
    pub fn new(bitmap: &'a Bitmap, session: &Session) -> Result<Self> {
        let rows = session.preset.rows();
        if bitmap.width() != LCD_WIDTH || bitmap.height() < rows {
            return Err(Error::Geometry {
                width: bitmap.width(),
                height: bitmap.height(),
                rows,
            });
        }

        let setup = setup_frames(session)?;
        let text = text_frames(session)?;
        debug!(
            "Encoding {} rows with {} batching, {} combine, {} text frames",
            rows,
            session.batching(),
            session.combine_mode(),
            text.len()
        );

        Ok(Self {
            bitmap,
            preset: session.preset,
            batching: session.batching(),
            setup,
            text,
        })
    }

    /// Returns the frames in transmission order.
    ///
    /// Frames are produced lazily, one display row at a time.
    pub fn frames(&self) -> impl Iterator<Item = Result<Frame>> + '_ {
        self.setup
            .iter()
            .cloned()
            .map(Ok)
            .chain((0..self.preset.rows()).flat_map(move |y| self.row_frames(y)))
            .chain(self.text.iter().cloned().map(Ok))
    }

    fn row_frames(&self, y: usize) -> Vec<Result<Frame>> {
        let Some(row) = self.bitmap.row(y) else {
            return Vec::new();
        };
        let packed = pack_pixels(row);
        match self.batching {
            RowBatching::Bulk => vec![Frame::bulk(&packed)],
            RowBatching::PerByte => packed.into_iter().map(|b| Ok(Frame::write_byte(b))).collect(),
        }
    }
}

/// Builds the frames that precede the graphics rows.
fn setup_frames(session: &Session) -> Result<Vec<Frame>> {
    let mut frames = vec![
        Frame::reset(),
        Frame::display_mode(session.preset.display_mode()),
    ];
    if let Some(lines) = session.cursor_lines {
        frames.push(Frame::cursor_pattern(lines)?);
    }
    frames.push(Frame::combine_mode(session.combine_mode()));
    frames.push(Frame::write_pointer(GRAPHICS_BASE));
    Ok(frames)
}

/// Builds the text layer frames; the cursor follows the first label.
fn text_frames(session: &Session) -> Result<Vec<Frame>> {
    let mut frames = Vec::new();
    if !session.preset.has_text_layer() {
        return Ok(frames);
    }

    let mut cursor = session.cursor.filter(|_| session.preset.shows_cursor());
    for label in &session.labels {
        frames.push(Frame::write_pointer(text_offset(label.column, label.row)?));
        frames.push(Frame::text(&label.text)?);
        if let Some((column, row)) = cursor.take() {
            frames.push(Frame::cursor_position(column, row)?);
        }
    }
    if let Some((column, row)) = cursor {
        frames.push(Frame::cursor_position(column, row)?);
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcd::protocol::Opcode;

    fn encode(bitmap: &Bitmap, session: &Session) -> Vec<Frame> {
        Encoder::new(bitmap, session)
            .unwrap()
            .frames()
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    fn count(frames: &[Frame], opcode: Opcode) -> usize {
        frames.iter().filter(|f| f.opcode() == Some(opcode)).count()
    }

    #[test]
    fn test_blank_bitmap_graphics_only_writes_bytes() {
        let bitmap = Bitmap::filled(true);
        let frames = encode(&bitmap, &Session::new(Preset::GraphicsOnly64));

        let writes: Vec<_> = frames
            .iter()
            .filter(|f| f.opcode() == Some(Opcode::WriteByte))
            .collect();
        assert_eq!(writes.len(), 64 * 40);
        assert!(writes.iter().all(|f| f.payload() == [0x00]));
        assert_eq!(count(&frames, Opcode::BulkWrite), 0);
        assert_eq!(frames.len(), 4 + 2560);
    }

    #[test]
    fn test_graphics_only_has_no_text_layer() {
        let bitmap = Bitmap::filled(false);
        let frames = encode(&bitmap, &Session::new(Preset::GraphicsOnly64));

        assert_eq!(frames[0], Frame::reset());
        assert_eq!(frames[1].to_bytes(), vec![0x07, 0x08]);
        assert_eq!(frames[2].to_bytes(), vec![0x06, 0x00]);
        assert_eq!(frames[3].to_bytes(), vec![0x03, 0x40, 0x01]);
        assert!(frames.iter().all(|f| f.opcode().is_some()));
        assert_eq!(count(&frames, Opcode::SetCursorPosition), 0);
    }

    #[test]
    fn test_blink_session_byte_stream() {
        let mut digits = vec![true; 240 * 64];
        // light the first six pixels of the first row
        digits[..6].fill(false);
        let bitmap = Bitmap::new(240, 64, digits).unwrap();

        let stream: Vec<u8> = encode(&bitmap, &Session::new(Preset::GraphicsText60Blink))
            .iter()
            .flat_map(Frame::to_bytes)
            .collect();

        let mut expected = vec![0x05, 0x07, 0x0f, 0x06, 0x01, 0x03, 0x40, 0x01];
        for y in 0..60 {
            expected.extend([0x09, 0x28]);
            let mut row = [0u8; 40];
            if y == 0 {
                row[0] = 0x3F;
            }
            expected.extend(row);
        }
        expected.extend([0x03, 0x00, 0x00]);
        expected.extend(b"Hello.");
        expected.extend([0x10, 27, 2]);
        expected.extend([0x03, 97, 0x00]);
        expected.extend(b"Text_Layer.");

        assert_eq!(stream, expected);
    }

    #[test]
    fn test_xor_session_skips_cursor() {
        let bitmap = Bitmap::filled(true);
        let frames = encode(&bitmap, &Session::new(Preset::GraphicsText60Xor));

        assert_eq!(frames[1].to_bytes(), vec![0x07, 0x0c]);
        assert_eq!(count(&frames, Opcode::BulkWrite), 60);
        assert_eq!(count(&frames, Opcode::SetCursorPosition), 0);
        assert_eq!(frames.iter().filter(|f| f.opcode().is_none()).count(), 2);
    }

    #[test]
    fn test_batching_override() {
        let bitmap = Bitmap::filled(true);
        let session = Session::new(Preset::GraphicsText60Xor)
            .with_batching(RowBatching::PerByte)
            .with_labels(Vec::new());
        let frames = encode(&bitmap, &session);

        assert_eq!(count(&frames, Opcode::WriteByte), 60 * 40);
        assert_eq!(count(&frames, Opcode::BulkWrite), 0);
        assert_eq!(frames.len(), 4 + 2400);
    }

    #[test]
    fn test_cursor_without_labels() {
        let bitmap = Bitmap::filled(true);
        let session = Session::new(Preset::GraphicsText60Blink).with_labels(Vec::new());
        let frames = encode(&bitmap, &session);

        assert_eq!(frames.last().unwrap().to_bytes(), vec![0x10, 27, 2]);
    }

    #[test]
    fn test_combine_override() {
        let bitmap = Bitmap::filled(true);
        let session = Session::new(Preset::GraphicsText60Xor).with_combine(CombineMode::And);
        assert_eq!(session.combine_mode(), CombineMode::And);
        let frames = encode(&bitmap, &session);

        assert_eq!(frames[2].to_bytes(), vec![0x06, 0x03]);
        assert_eq!(count(&frames, Opcode::SetCombineMode), 1);

        let session =
            Session::new(Preset::GraphicsOnly64).with_combine(CombineMode::TextAttribute);
        let frames = encode(&bitmap, &session);
        assert_eq!(frames[2].to_bytes(), vec![0x06, 0x04]);
    }

    #[test]
    fn test_cursor_pattern_follows_display_mode() {
        let bitmap = Bitmap::filled(true);
        let session = Session::new(Preset::GraphicsText60Blink).with_cursor_lines(8);
        let frames = encode(&bitmap, &session);

        assert_eq!(frames[1].to_bytes(), vec![0x07, 0x0f]);
        assert_eq!(frames[2].to_bytes(), vec![0x08, 0x07]);
        assert_eq!(frames[3].to_bytes(), vec![0x06, 0x01]);
        assert_eq!(frames[4].to_bytes(), vec![0x03, 0x40, 0x01]);
        assert_eq!(count(&frames, Opcode::SetCursorPattern), 1);

        // No pattern frame unless asked for.
        let frames = encode(&bitmap, &Session::new(Preset::GraphicsText60Blink));
        assert_eq!(count(&frames, Opcode::SetCursorPattern), 0);
    }

    #[test]
    fn test_invalid_cursor_lines_rejected_up_front() {
        let bitmap = Bitmap::filled(true);
        let session = Session::new(Preset::GraphicsText60Blink).with_cursor_lines(9);
        assert!(matches!(
            Encoder::new(&bitmap, &session),
            Err(Error::InvalidCursorPattern(9))
        ));
    }

    #[test]
    fn test_short_bitmap_rejected_by_preset() {
        // Loads under the lenient header check, but cannot fill 60 rows.
        let bitmap = Bitmap::new(240, 10, vec![true; 2400]).unwrap();
        let err = Encoder::new(&bitmap, &Session::new(Preset::GraphicsText60Xor))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            Error::Geometry {
                width: 240,
                height: 10,
                rows: 60
            }
        ));

        let bitmap = Bitmap::new(120, 64, vec![true; 120 * 64]).unwrap();
        assert!(Encoder::new(&bitmap, &Session::new(Preset::GraphicsOnly64)).is_err());
    }

    #[test]
    fn test_invalid_labels_rejected_up_front() {
        let bitmap = Bitmap::filled(true);
        let session = Session::new(Preset::GraphicsText60Xor)
            .with_labels(vec![TextLabel::new(0, 0, "two words")]);
        assert!(matches!(
            Encoder::new(&bitmap, &session),
            Err(Error::InvalidText(_))
        ));

        let session = Session::new(Preset::GraphicsText60Xor)
            .with_labels(vec![TextLabel::new(40, 0, "x")]);
        assert!(matches!(
            Encoder::new(&bitmap, &session),
            Err(Error::TextPosition { .. })
        ));

        // Labels are not checked when the preset has no text layer.
        let session =
            Session::new(Preset::GraphicsOnly64).with_labels(vec![TextLabel::new(99, 99, " ")]);
        assert!(Encoder::new(&bitmap, &session).is_ok());
    }
}
