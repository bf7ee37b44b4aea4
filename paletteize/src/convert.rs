use log::debug;

use crate::buffer::ImageBuffer;
use crate::encode::encode_to_string;
use crate::error::Error;
use crate::palette::Palette;
use crate::quantize::Algorithm;
use crate::raster::{MarkerGrid, Raster};
use crate::scan::{default_batch_size, Scan};

/// Settings for a single conversion.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConvertOptions {
  /// Pixels with an alpha strictly below this value become transparent.
  pub min_alpha: u8,
  /// Apply Floyd-Steinberg error diffusion.
  pub dither: bool,
  /// Pixels processed between progress reports. Defaults to 1% of the image
  /// when `None`.
  pub batch_size: Option<usize>,
}

impl ConvertOptions {
  pub fn algorithm(&self) -> Algorithm {
    Algorithm::from_dither_flag(self.dither)
  }
}

/// The result of a finished conversion.
#[derive(Clone, Debug, PartialEq)]
pub struct Conversion {
  /// The run-length encoded token stream.
  pub tokens: String,
  /// The palette index, or transparency, assigned to each pixel.
  pub markers: MarkerGrid,
  /// The quantized image, i.e. every pixel replaced by its palette color.
  pub preview: ImageBuffer,
}

/// A conversion that runs one batch of pixels at a time.
///
/// Iterating a `Converter` processes the next batch and yields the progress
/// percentage. Once iteration ends, `finish` encodes the result. Dropping a
/// converter part way abandons the conversion.
pub struct Converter {
  scan: Scan,
}

impl Converter {
  /// Validates the inputs and prepares the palette and raster. Fails before
  /// any pixel is processed if the image is empty or the palette image
  /// doesn't hold exactly 256 pixels.
  pub fn new(image: &ImageBuffer, palette: &ImageBuffer, options: &ConvertOptions) -> Result<Self, Error> {
    let palette = Palette::from_image(palette)?;
    Ok(Self::with_palette(Raster::from_image(image)?, palette, options))
  }

  /// Prepares a conversion against an already built palette of any size.
  pub fn with_palette(raster: Raster, palette: Palette, options: &ConvertOptions) -> Self {
    let batch_size = options
      .batch_size
      .unwrap_or_else(|| default_batch_size(raster.num_pixels()));

    debug!(
      "converting {}x{} image against {} colors ({:?}, min alpha {}, batch size {})",
      raster.width(),
      raster.height(),
      palette.len(),
      options.algorithm(),
      options.min_alpha,
      batch_size,
    );

    Self {
      scan: Scan::new(raster, palette, options.algorithm(), options.min_alpha, batch_size),
    }
  }

  pub fn is_complete(&self) -> bool {
    self.scan.is_complete()
  }

  pub fn progress(&self) -> u8 {
    self.scan.progress()
  }

  /// Processes any remaining batches and encodes the result.
  pub fn finish(self) -> Conversion {
    let raster = self.scan.run(|_| {});
    let (preview, markers) = raster.into_parts();
    let tokens = encode_to_string(&markers);

    debug!("encoded {}x{} image into {} bytes", markers.width, markers.height, tokens.len());

    Conversion { tokens, markers, preview }
  }
}

impl Iterator for Converter {
  type Item = u8;

  fn next(&mut self) -> Option<u8> {
    self.scan.next()
  }
}

/// Converts `image` against the 256 colors of `palette`, blocking until
/// every pixel is processed. `on_progress` is called with the percentage of
/// pixels processed after each batch.
pub fn convert<F: FnMut(u8)>(
  image: &ImageBuffer,
  palette: &ImageBuffer,
  options: &ConvertOptions,
  mut on_progress: F,
) -> Result<Conversion, Error> {
  let mut converter = Converter::new(image, palette, options)?;

  for percent in converter.by_ref() {
    on_progress(percent);
  }

  Ok(converter.finish())
}
