//! Column-major bitmap images for readerboard matrices.

use serde::{Deserialize, Serialize};

use crate::constants::MATRIX_ROWS;
use crate::error::ProtocolError;

/// A monochrome or color bitmap as the matrix hardware stores it.
///
/// Each plane holds one byte per column; bit `1<<row` of a column byte
/// is the pixel in that row, with the LSB at the top. Depth 2 means
/// mono+flash planes, depth 4 means red/green/blue/flash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBitmap {
    /// Number of bitplanes: 2 or 4.
    pub depth: usize,
    /// Image width in columns.
    pub width: usize,
    /// Column data, one `Vec<u8>` per plane.
    pub planes: Vec<Vec<u8>>,
}

/// Pixel glyphs for color sketches, indexed by the r/g/b bit triple.
const COLOR_GLYPHS: &[u8] = b".RGYBMCW.rgybmcw";

impl ImageBitmap {
    /// Read a bitmap from ASCII art, one string per pixel row.
    ///
    /// Monochrome sources (depth 2) use `.` (off), `@` (on), and `#`
    /// (flashing). Color sources (depth 4) use `.` plus `R`, `G`, `B`,
    /// `Y`, `M`, `C`, `W`, with lowercase letters marking flashing
    /// pixels. The image width is the longest row; short rows are
    /// padded with off pixels.
    pub fn from_ascii(rows: &[&str], depth: usize) -> Result<ImageBitmap, ProtocolError> {
        if depth != 2 && depth != 4 {
            return Err(ProtocolError::BadBitmapDepth(depth));
        }
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut planes = vec![vec![0u8; width]; depth];

        for (row, rowdata) in rows.iter().enumerate().take(MATRIX_ROWS) {
            let bit = 1u8 << row;
            for (col, pixel) in rowdata.chars().enumerate() {
                if depth == 2 {
                    match pixel {
                        '.' => {}
                        '@' => planes[0][col] |= bit,
                        '#' => {
                            planes[0][col] |= bit;
                            planes[1][col] |= bit;
                        }
                        _ => return Err(ProtocolError::BadPixelChar { pixel, row, col }),
                    }
                } else {
                    if pixel == '.' {
                        continue;
                    }
                    let flash = pixel.is_ascii_lowercase();
                    let rgb = match pixel.to_ascii_uppercase() {
                        'R' => 1,
                        'G' => 2,
                        'Y' => 3,
                        'B' => 4,
                        'M' => 5,
                        'C' => 6,
                        'W' => 7,
                        _ => return Err(ProtocolError::BadPixelChar { pixel, row, col }),
                    };
                    if rgb & 1 != 0 {
                        planes[0][col] |= bit;
                    }
                    if rgb & 2 != 0 {
                        planes[1][col] |= bit;
                    }
                    if rgb & 4 != 0 {
                        planes[2][col] |= bit;
                    }
                    if flash {
                        planes[3][col] |= bit;
                    }
                }
            }
        }

        Ok(ImageBitmap {
            depth,
            width,
            planes,
        })
    }

    /// Render the bitmap as ASCII art, one string per pixel row.
    ///
    /// With `colorize` set, lit pixels are wrapped in ANSI color codes
    /// (blinking for flash pixels). An empty image sketches to nothing.
    pub fn sketch(&self, colorize: bool) -> Result<Vec<String>, ProtocolError> {
        if self.width == 0 || self.depth == 0 {
            return Ok(Vec::new());
        }
        if self.depth != 2 && self.depth != 4 {
            return Err(ProtocolError::BadBitmapDepth(self.depth));
        }
        if self.planes.len() != self.depth {
            return Err(ProtocolError::WrongPlaneCount {
                expected: self.depth,
                actual: self.planes.len(),
                model: crate::types::HardwareModel::Unknown,
            });
        }

        let mut sketch = Vec::with_capacity(MATRIX_ROWS);
        for row in 0..MATRIX_ROWS {
            let bit = 1u8 << row;
            let mut line = String::new();
            for col in 0..self.width {
                if self.depth == 2 {
                    line.push_str(&sketch_mono(
                        colorize,
                        self.planes[0][col],
                        self.planes[1][col],
                        bit,
                    ));
                } else {
                    line.push_str(&sketch_color(
                        colorize,
                        self.planes[0][col],
                        self.planes[1][col],
                        self.planes[2][col],
                        self.planes[3][col],
                        bit,
                    ));
                }
            }
            sketch.push(line);
        }
        Ok(sketch)
    }
}

fn sketch_mono(colorize: bool, on: u8, flash: u8, bit: u8) -> String {
    if on & bit == 0 {
        return ".".to_string();
    }
    if flash & bit != 0 {
        if colorize {
            return "\x1b[1;5m#\x1b[0m".to_string();
        }
        return "#".to_string();
    }
    "@".to_string()
}

fn sketch_color(colorize: bool, r: u8, g: u8, b: u8, f: u8, bit: u8) -> String {
    let mut c = 0usize;
    if r & bit != 0 {
        c |= 1;
    }
    if g & bit != 0 {
        c |= 2;
    }
    if b & bit != 0 {
        c |= 4;
    }
    if f & bit != 0 {
        c |= 8;
    }

    let glyph = COLOR_GLYPHS[c] as char;
    if colorize && c != 0 {
        let blink = if c & 8 != 0 { "5;" } else { "" };
        return format!("\x1b[{}3{}m{}\x1b[0m", blink, c & 0x07, glyph);
    }
    glyph.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_ascii_round_trips_through_sketch() {
        let art = ["@.#", ".@.", "@.@"];
        let img = ImageBitmap::from_ascii(&art, 2).unwrap();
        assert_eq!(img.width, 3);
        assert_eq!(img.planes[0], vec![0b101, 0b010, 0b101]);
        assert_eq!(img.planes[1], vec![0b000, 0b000, 0b001]);

        let sketch = img.sketch(false).unwrap();
        assert_eq!(sketch[0], "@.#");
        assert_eq!(sketch[1], ".@.");
        assert_eq!(sketch[2], "@.@");
        assert_eq!(sketch[7], "...");
    }

    #[test]
    fn color_ascii_sets_component_planes() {
        let img = ImageBitmap::from_ascii(&["RWb"], 4).unwrap();
        // R: red only; W: all three; b: blue + flash
        assert_eq!(img.planes[0], vec![1, 1, 0]);
        assert_eq!(img.planes[1], vec![0, 1, 0]);
        assert_eq!(img.planes[2], vec![0, 1, 1]);
        assert_eq!(img.planes[3], vec![0, 0, 1]);

        let sketch = img.sketch(false).unwrap();
        assert_eq!(sketch[0], "RWb");
    }

    #[test]
    fn bad_depth_and_pixels_are_rejected() {
        assert!(ImageBitmap::from_ascii(&["@"], 3).is_err());
        assert!(matches!(
            ImageBitmap::from_ascii(&["Z"], 4),
            Err(ProtocolError::BadPixelChar { pixel: 'Z', .. })
        ));
        assert!(ImageBitmap::from_ascii(&["%"], 2).is_err());
    }
}
