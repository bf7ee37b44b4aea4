use crate::error::Error;
use crate::pixel::Color;

/// Bytes per pixel of every buffer this crate reads or produces.
pub const RGBA_CHANNELS: usize = 4;

/// A decoded image: its dimensions and row-major RGBA pixel data, one byte
/// per channel. Colors are assumed to be un-premultiplied.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBuffer {
  /// The image's width.
  pub width: u32,
  /// The image's height.
  pub height: u32,
  /// Row-major RGBA bytes, `width * height * 4` of them.
  pub pixels: Vec<u8>,
}

impl ImageBuffer {
  pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
    Self { width, height, pixels }
  }

  /// Builds a buffer from a slice of colors, e.g. for palettes assembled in
  /// code.
  pub fn from_colors(width: u32, height: u32, colors: &[Color]) -> Self {
    let pixels = colors.iter().flat_map(|c| c.to_rgba()).collect();
    Self { width, height, pixels }
  }

  /// Returns the total number of pixels that make up the image.
  pub fn num_pixels(&self) -> usize {
    self.width as usize * self.height as usize
  }

  // Ensures `pixels` holds exactly one RGBA quadruple per pixel.
  pub(crate) fn check_len(&self) -> Result<(), Error> {
    let expected = self.num_pixels() * RGBA_CHANNELS;

    if self.pixels.len() != expected {
      return Err(Error::BufferSizeMismatch { expected, actual: self.pixels.len() });
    }

    Ok(())
  }

  /// Iterates the buffer's colors in row-major order.
  pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
    self.pixels.chunks_exact(RGBA_CHANNELS).map(Color::from_rgba)
  }
}
