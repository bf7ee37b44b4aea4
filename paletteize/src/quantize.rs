use crate::palette::Palette;
use crate::pixel::{Color, ColorError};
use crate::raster::{Marker, Raster};

/// Floyd-Steinberg error diffusion kernel as `(dx, dy, weight)` offsets from
/// the pixel being quantized. Only pixels later in scan order are touched.
pub const FLOYD_STEINBERG: [(i64, u32, f64); 4] = [
  (1, 0, 7.0 / 16.0),
  (-1, 1, 3.0 / 16.0),
  (0, 1, 5.0 / 16.0),
  (1, 1, 1.0 / 16.0),
];

/// How a single pixel gets mapped onto the palette.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Algorithm {
  /// Nearest palette color, nothing else.
  #[default]
  Plain,
  /// Nearest palette color, with the quantization error diffused into the
  /// unvisited neighbors (Floyd-Steinberg).
  Dithered,
}

impl Algorithm {
  pub fn from_dither_flag(dither: bool) -> Self {
    if dither {
      Algorithm::Dithered
    } else {
      Algorithm::Plain
    }
  }

  /// Quantizes the pixel at `(x, y)` in place and records its marker.
  ///
  /// A pixel whose alpha is strictly below `min_alpha` becomes
  /// `Color::TRANSPARENT` and is marked transparent. Any other pixel is
  /// matched as fully opaque and replaced by its palette color, also stored
  /// fully opaque; if the palette has nothing to offer the pixel is marked
  /// transparent and left as is.
  pub fn apply(self, raster: &mut Raster, palette: &mut Palette, x: u32, y: u32, min_alpha: u8) {
    let pixel = raster.pixel(x, y);

    if pixel.a < min_alpha {
      raster.set_pixel(x, y, Color::TRANSPARENT);
      raster.set_marker(x, y, Marker::Transparent);
      return;
    }

    let pixel = pixel.opaque();

    let Some((index, target)) = palette
      .closest(pixel)
      .and_then(|index| palette.get(index).map(|color| (index, color.opaque())))
    else {
      raster.set_marker(x, y, Marker::Transparent);
      return;
    };

    raster.set_pixel(x, y, target);
    raster.set_marker(x, y, Marker::Index(index));

    if self == Algorithm::Dithered {
      diffuse_error(raster, x, y, pixel.error_to(&target));
    }
  }
}

// Spreads `error` over the kernel's neighbors of `(x, y)`, skipping those
// outside the raster.
fn diffuse_error(raster: &mut Raster, x: u32, y: u32, error: ColorError) {
  for (dx, dy, weight) in FLOYD_STEINBERG {
    let nx = x as i64 + dx;
    let ny = y + dy;

    if nx < 0 || nx >= raster.width() as i64 || ny >= raster.height() {
      continue;
    }

    let nx = nx as u32;
    let neighbor = raster.pixel(nx, ny);
    raster.set_pixel(nx, ny, neighbor.diffuse(error, weight));
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::buffer::ImageBuffer;

  fn raster(width: u32, height: u32, colors: &[Color]) -> Raster {
    Raster::from_image(&ImageBuffer::from_colors(width, height, colors))
      .expect("Failed to build raster")
  }

  fn black_white() -> Palette {
    Palette::new(vec![Color::new(0, 0, 0, 255), Color::new(255, 255, 255, 255)])
  }

  #[test]
  fn test_alpha_threshold_is_exclusive() {
    let mut palette = black_white();
    let mut r = raster(2, 1, &[Color::new(250, 250, 250, 10), Color::new(250, 250, 250, 9)]);

    Algorithm::Plain.apply(&mut r, &mut palette, 0, 0, 10);
    Algorithm::Plain.apply(&mut r, &mut palette, 1, 0, 10);

    assert_eq!(r.marker(0, 0), Marker::Index(1));
    assert_eq!(r.pixel(0, 0), Color::new(255, 255, 255, 255));
    assert_eq!(r.marker(1, 0), Marker::Transparent);
    assert_eq!(r.pixel(1, 0), Color::TRANSPARENT);
  }

  #[test]
  fn test_translucent_palette_entry_is_stored_opaque() {
    let mut palette = Palette::new(vec![Color::new(10, 20, 30, 40)]);
    let mut r = raster(1, 1, &[Color::new(12, 22, 32, 255)]);

    Algorithm::Plain.apply(&mut r, &mut palette, 0, 0, 0);

    assert_eq!(r.marker(0, 0), Marker::Index(0));
    assert_eq!(r.pixel(0, 0), Color::new(10, 20, 30, 255));
  }

  #[test]
  fn test_transparent_pixels_do_not_diffuse() {
    let mut palette = black_white();
    let mut r = raster(2, 1, &[Color::new(120, 120, 120, 0), Color::new(40, 40, 40, 255)]);

    Algorithm::Dithered.apply(&mut r, &mut palette, 0, 0, 1);

    assert_eq!(r.pixel(1, 0), Color::new(40, 40, 40, 255));
  }

  #[test]
  fn test_empty_palette_marks_transparent() {
    let mut palette = Palette::new(Vec::new());
    let mut r = raster(2, 1, &[Color::new(1, 2, 3, 200), Color::new(4, 5, 6, 255)]);

    Algorithm::Dithered.apply(&mut r, &mut palette, 0, 0, 0);

    assert_eq!(r.marker(0, 0), Marker::Transparent);
    assert_eq!(r.pixel(0, 0), Color::new(1, 2, 3, 200));
    assert_eq!(r.pixel(1, 0), Color::new(4, 5, 6, 255));
  }

  #[test]
  fn test_plain_is_idempotent() {
    let mut palette = Palette::new(vec![
      Color::new(0, 0, 0, 255),
      Color::new(200, 30, 30, 255),
      Color::new(30, 200, 30, 255),
    ]);
    let colors: Vec<Color> = (0..12u8)
      .map(|i| Color::new(i * 20, 255 - i * 20, i * 7, if i == 5 { 0 } else { 255 }))
      .collect();
    let mut r = raster(4, 3, &colors);

    for pass in 0..2 {
      let before = r.to_image();

      for y in 0..3 {
        for x in 0..4 {
          Algorithm::Plain.apply(&mut r, &mut palette, x, y, 1);
        }
      }

      if pass == 1 {
        assert_eq!(r.to_image(), before);
      }
    }
  }

  #[test]
  fn test_dithering_diffuses_to_all_neighbors() {
    let mut palette = black_white();
    let gray = Color::new(100, 100, 100, 255);
    let mut r = raster(3, 2, &[gray; 6]);

    // Quantize the center of the top row: 100 -> 0, error is +100.
    Algorithm::Dithered.apply(&mut r, &mut palette, 1, 0, 0);

    assert_eq!(r.pixel(1, 0), Color::new(0, 0, 0, 255));
    // 100 + 43.75, 100 + 18.75, 100 + 31.25, 100 + 6.25
    assert_eq!(r.pixel(2, 0), Color::new(144, 144, 144, 255));
    assert_eq!(r.pixel(0, 1), Color::new(119, 119, 119, 255));
    assert_eq!(r.pixel(1, 1), Color::new(131, 131, 131, 255));
    assert_eq!(r.pixel(2, 1), Color::new(106, 106, 106, 255));
    // Already processed in scan order, never touched.
    assert_eq!(r.pixel(0, 0), gray);
  }

  #[test]
  fn test_dithering_skips_out_of_bounds_neighbors() {
    let mut palette = black_white();
    let gray = Color::new(100, 100, 100, 255);
    let mut r = raster(2, 2, &[gray; 4]);

    // Bottom-right corner has no neighbors at all.
    Algorithm::Dithered.apply(&mut r, &mut palette, 1, 1, 0);
    assert_eq!(r.pixel(0, 0), gray);
    assert_eq!(r.pixel(1, 0), gray);
    assert_eq!(r.pixel(0, 1), gray);

    // Left edge loses the (x-1, y+1) share.
    Algorithm::Dithered.apply(&mut r, &mut palette, 0, 0, 0);
    assert_eq!(r.pixel(1, 0), Color::new(144, 144, 144, 255));
    assert_eq!(r.pixel(0, 1), Color::new(131, 131, 131, 255));
  }

  #[test]
  fn test_diffused_error_keeps_neighbor_alpha() {
    let mut palette = black_white();
    let mut r = raster(2, 1, &[Color::new(100, 100, 100, 255), Color::new(10, 10, 10, 77)]);

    Algorithm::Dithered.apply(&mut r, &mut palette, 0, 0, 0);

    assert_eq!(r.pixel(1, 0).a, 77);
  }

  #[test]
  fn test_kernel_conserves_error() {
    let weights: f64 = FLOYD_STEINBERG.iter().map(|(_, _, w)| w).sum();
    assert_eq!(weights, 1.0);

    for error in [-255i32, -97, -1, 0, 1, 13, 200, 255] {
      let total: f64 = FLOYD_STEINBERG.iter().map(|(_, _, w)| error as f64 * w).sum();
      assert_eq!(total, error as f64);
    }
  }
}
