//! Plain PBM (P1) bitmap loading.
//!
//! Only the ASCII variant is understood: a `P1` tag line, a `width height`
//! line, then rows of `0`/`1` digits. Blank lines and `#` comment lines may
//! appear anywhere.

use crate::{Error, Result, LCD_HEIGHT, LCD_WIDTH};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Format tag of an ASCII plain bitmap.
pub const PBM_TAG: &str = "P1";

/// Options controlling how strictly a bitmap header is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Require both width and height to match the display.
    ///
    /// Off by default, in which case a bitmap is only rejected when *neither*
    /// dimension matches.
    pub strict_dimensions: bool,
}

/// Monochrome bitmap, stored row-major.
///
/// A pixel is `true` when its source digit was `1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
}

impl Bitmap {
    /// Creates a bitmap from row-major pixel values.
    pub fn new(width: usize, height: usize, pixels: Vec<bool>) -> Result<Self> {
        let expected = width.saturating_mul(height);
        if pixels.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Creates a bitmap of the display's size with every pixel set to `value`.
    pub fn filled(value: bool) -> Self {
        Self {
            width: LCD_WIDTH,
            height: LCD_HEIGHT,
            pixels: vec![value; LCD_WIDTH * LCD_HEIGHT],
        }
    }

    /// Loads a bitmap from a file.
    pub fn load<P: AsRef<Path>>(path: P, options: LoadOptions) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(Error::BitmapRead)?;
        let bitmap = Self::parse(BufReader::new(file), options)?;
        debug!(
            "Loaded {}x{} bitmap from {}",
            bitmap.width,
            bitmap.height,
            path.as_ref().display()
        );
        Ok(bitmap)
    }

    /// Parses a bitmap from a line-oriented reader.
    pub fn parse<R: BufRead>(reader: R, options: LoadOptions) -> Result<Self> {
        let mut tag_seen = false;
        let mut size: Option<(usize, usize)> = None;
        let mut pixels = Vec::new();

        for line in reader.lines() {
            let line = line.map_err(Error::BitmapRead)?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if !tag_seen {
                if line != PBM_TAG {
                    return Err(Error::Format {
                        tag: line.to_string(),
                    });
                }
                tag_seen = true;
                continue;
            }

            if size.is_none() {
                let (width, height) = parse_size(line)?;
                check_dimensions(width, height, options)?;
                pixels.reserve(width.saturating_mul(height).min(LCD_WIDTH * LCD_HEIGHT));
                size = Some((width, height));
                continue;
            }

            for c in line.chars().filter(|c| !c.is_whitespace()) {
                match c {
                    '0' => pixels.push(false),
                    '1' => pixels.push(true),
                    other => return Err(Error::InvalidPixel(other)),
                }
            }
        }

        if !tag_seen {
            return Err(Error::Format { tag: String::new() });
        }
        let (width, height) = size.ok_or_else(|| Error::Header(String::new()))?;
        Self::new(width, height, pixels)
    }

    /// Returns the width of the bitmap.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height of the bitmap.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns all pixels, row-major.
    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    /// Gets a pixel at the given coordinates.
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<bool> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Returns one row of pixels.
    pub fn row(&self, y: usize) -> Option<&[bool]> {
        if y < self.height {
            let start = y * self.width;
            Some(&self.pixels[start..start + self.width])
        } else {
            None
        }
    }
}

fn parse_size(line: &str) -> Result<(usize, usize)> {
    let mut fields = line.split_whitespace().map(str::parse::<usize>);
    match (fields.next(), fields.next(), fields.next()) {
        (Some(Ok(width)), Some(Ok(height)), None) => Ok((width, height)),
        _ => Err(Error::Header(line.to_string())),
    }
}

fn check_dimensions(width: usize, height: usize, options: LoadOptions) -> Result<()> {
    // TODO: confirm on hardware whether a bitmap matching only one dimension
    // should be refused by default; the lenient check only rejects when both differ.
    let unsupported = if options.strict_dimensions {
        width != LCD_WIDTH || height != LCD_HEIGHT
    } else {
        width != LCD_WIDTH && height != LCD_HEIGHT
    };
    if unsupported {
        return Err(Error::Dimension { width, height });
    }
    Ok(())
}
