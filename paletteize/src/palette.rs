use std::collections::HashMap;

use crate::buffer::ImageBuffer;
use crate::error::Error;
use crate::pixel::Color;

/// The number of pixels a palette image must contain.
pub const PALETTE_SIZE: usize = 256;

/// An ordered list of candidate output colors, answering nearest-color
/// queries.
///
/// Entries keep their insertion order and duplicates are allowed; an entry's
/// position is its palette index. Every `closest` result is memoized by the
/// query's exact RGB value for the lifetime of the palette.
#[derive(Clone, Debug)]
pub struct Palette {
  colors: Vec<Color>,
  // Previously answered queries, keyed by RGB (alpha excluded).
  cache: HashMap<[u8; 3], Option<usize>>,
}

impl Palette {
  pub fn new(colors: Vec<Color>) -> Self {
    Self { colors, cache: HashMap::new() }
  }

  /// Reads the palette colors out of a decoded palette image in row-major
  /// order. The image must hold exactly 256 pixels.
  pub fn from_image(image: &ImageBuffer) -> Result<Self, Error> {
    image.check_len()?;

    if image.num_pixels() != PALETTE_SIZE {
      return Err(Error::InvalidPaletteSize(image.num_pixels()));
    }

    Ok(Self::new(image.colors().collect()))
  }

  /// A 256 step ramp from black to white.
  pub fn grayscale() -> Self {
    let colors = (0..=255u8).map(|v| Color::new(v, v, v, 255)).collect();
    Self::new(colors)
  }

  /// A 256 step ramp from black through brown tones to a pale cream, the
  /// gray ramp run through the usual sepia tone matrix.
  pub fn sepia() -> Self {
    let tone = |v: u8, weight: f64| (v as f64 * weight).round().min(255.0) as u8;

    let colors = (0..=255u8)
      .map(|v| Color::new(tone(v, 1.351), tone(v, 1.203), tone(v, 0.937), 255))
      .collect();

    Self::new(colors)
  }

  /// The default 256 color VGA palette of mode 13h: the 16 EGA colors, a
  /// 16 step gray ramp, 216 colors in 9 hue rings of 24, and 8 blacks.
  pub fn vga() -> Self {
    let mut dac: Vec<[u8; 3]> = Vec::with_capacity(PALETTE_SIZE);

    dac.extend_from_slice(&VGA_EGA);
    dac.extend(VGA_GRAYS.iter().map(|&v| [v, v, v]));

    for levels in VGA_RING_LEVELS {
      dac.extend(hue_ring(levels));
    }

    dac.resize(PALETTE_SIZE, [0, 0, 0]);

    let colors = dac
      .into_iter()
      .map(|[r, g, b]| Color::new(dac_to_8bit(r), dac_to_8bit(g), dac_to_8bit(b), 255))
      .collect();

    Self::new(colors)
  }

  pub fn colors(&self) -> &[Color] {
    &self.colors
  }

  pub fn get(&self, index: usize) -> Option<Color> {
    self.colors.get(index).copied()
  }

  pub fn len(&self) -> usize {
    self.colors.len()
  }

  pub fn is_empty(&self) -> bool {
    self.colors.is_empty()
  }

  /// Returns the index of the palette color closest to `color`, or `None`
  /// if the palette is empty.
  ///
  /// Distance is the squared RGB distance; alpha takes no part in matching
  /// or in the cache key. On ties the lowest index wins.
  pub fn closest(&mut self, color: Color) -> Option<usize> {
    let key = color.rgb();

    if let Some(index) = self.cache.get(&key) {
      return *index;
    }

    let index = self.search(color);
    self.cache.insert(key, index);

    index
  }

  // Linear scan with a strict less-than, so the first minimum sticks.
  fn search(&self, color: Color) -> Option<usize> {
    let mut closest: Option<(usize, u32)> = None;

    for (index, candidate) in self.colors.iter().enumerate() {
      let distance = color.squared_distance(candidate);

      match closest {
        Some((_, min)) if distance >= min => {}
        _ => closest = Some((index, distance)),
      }
    }

    closest.map(|(index, _)| index)
  }

  #[cfg(test)]
  pub(crate) fn cached(&self) -> usize {
    self.cache.len()
  }
}

// VGA DAC registers hold 6-bit channel values.
const VGA_EGA: [[u8; 3]; 16] = [
  [0, 0, 0],
  [0, 0, 42],
  [0, 42, 0],
  [0, 42, 42],
  [42, 0, 0],
  [42, 0, 42],
  [42, 21, 0],
  [42, 42, 42],
  [21, 21, 21],
  [21, 21, 63],
  [21, 63, 21],
  [21, 63, 63],
  [63, 21, 21],
  [63, 21, 63],
  [63, 63, 21],
  [63, 63, 63],
];

const VGA_GRAYS: [u8; 16] = [0, 5, 8, 11, 14, 17, 20, 24, 28, 32, 36, 40, 45, 50, 56, 63];

// Channel levels, low to high, of each hue ring: high, medium and low
// intensity, each at high, medium and low saturation.
const VGA_RING_LEVELS: [[u8; 5]; 9] = [
  [0, 16, 31, 47, 63],
  [31, 39, 47, 55, 63],
  [45, 49, 54, 58, 63],
  [0, 7, 14, 21, 28],
  [14, 17, 21, 24, 28],
  [20, 22, 24, 26, 28],
  [0, 4, 8, 12, 16],
  [8, 10, 12, 14, 16],
  [11, 12, 13, 15, 16],
];

// 24 hues from blue through magenta, red, yellow, green and cyan, stepping
// one channel at a time through `levels`.
fn hue_ring(levels: [u8; 5]) -> Vec<[u8; 3]> {
  let lo = levels[0];
  let hi = levels[4];
  let up = &levels[1..];
  let down = || levels[..4].iter().rev().copied();

  let mut ring = vec![[lo, lo, hi]];
  ring.extend(up.iter().map(|&v| [v, lo, hi]));
  ring.extend(down().map(|v| [hi, lo, v]));
  ring.extend(up.iter().map(|&v| [hi, v, lo]));
  ring.extend(down().map(|v| [v, hi, lo]));
  ring.extend(up.iter().map(|&v| [lo, hi, v]));
  ring.extend(down().take(3).map(|v| [lo, v, hi]));

  ring
}

// Widens a 6-bit DAC value by bit replication, 63 -> 255.
fn dac_to_8bit(value: u8) -> u8 {
  value << 2 | value >> 4
}

impl From<Vec<Color>> for Palette {
  fn from(colors: Vec<Color>) -> Self {
    Self::new(colors)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::new(r, g, b, 255)
  }

  #[test]
  fn test_first_minimum_wins_ties() {
    let mut palette = Palette::new(vec![rgb(0, 0, 0), rgb(0, 0, 1), rgb(0, 0, 0)]);

    assert_eq!(palette.closest(rgb(0, 0, 0)), Some(0));
  }

  #[test]
  fn test_equidistant_entries_keep_first() {
    let mut palette = Palette::new(vec![rgb(10, 0, 0), rgb(0, 0, 0), rgb(20, 0, 0)]);

    // 15 is equally close to index 0 and 2, but 0 comes first.
    assert_eq!(palette.closest(rgb(15, 0, 0)), Some(0));
    assert_eq!(palette.closest(rgb(3, 0, 0)), Some(1));
  }

  #[test]
  fn test_empty_palette_has_no_match() {
    let mut palette = Palette::new(Vec::new());

    assert_eq!(palette.closest(rgb(1, 2, 3)), None);
    assert_eq!(palette.closest(rgb(1, 2, 3)), None);
  }

  #[test]
  fn test_max_distance_still_matches() {
    let mut palette = Palette::new(vec![rgb(0, 0, 0)]);

    assert_eq!(palette.closest(rgb(255, 255, 255)), Some(0));
  }

  #[test]
  fn test_cache_ignores_alpha() {
    let mut palette = Palette::new(vec![rgb(0, 0, 0), rgb(255, 255, 255)]);

    assert_eq!(palette.closest(Color::new(200, 200, 200, 255)), Some(1));
    assert_eq!(palette.closest(Color::new(200, 200, 200, 3)), Some(1));
    assert_eq!(palette.cached(), 1);
  }

  #[test]
  fn test_from_image_requires_256_pixels() {
    let image = ImageBuffer::new(16, 8, vec![0; 16 * 8 * 4]);
    assert_eq!(Palette::from_image(&image).unwrap_err(), Error::InvalidPaletteSize(128));

    let image = ImageBuffer::new(16, 16, vec![0; 16 * 16 * 4]);
    assert_eq!(Palette::from_image(&image).map(|p| p.len()).ok(), Some(256));
  }

  #[test]
  fn test_from_image_preserves_order_and_duplicates() {
    let mut colors = vec![rgb(9, 9, 9); 256];
    colors[0] = rgb(1, 1, 1);
    colors[255] = rgb(1, 1, 1);

    let palette = Palette::from_image(&ImageBuffer::from_colors(256, 1, &colors))
      .expect("Failed to read palette");

    assert_eq!(palette.get(0), Some(rgb(1, 1, 1)));
    assert_eq!(palette.get(255), Some(rgb(1, 1, 1)));
    assert_eq!(palette.colors(), colors.as_slice());
  }

  #[test]
  fn test_vga() {
    let palette = Palette::vga();
    let hex = |i: usize| {
      let c = palette.get(i).expect("Missing VGA entry");
      (c.r as u32) << 16 | (c.g as u32) << 8 | c.b as u32
    };

    assert_eq!(palette.len(), 256);
    assert!(palette.colors().iter().all(|c| c.a == 255));

    // EGA colors.
    assert_eq!(hex(1), 0x0000aa);
    assert_eq!(hex(6), 0xaa5500);
    assert_eq!(hex(9), 0x5555ff);
    assert_eq!(hex(15), 0xffffff);
    // Gray ramp.
    assert_eq!(hex(17), 0x141414);
    assert_eq!(hex(24), 0x717171);
    assert_eq!(hex(30), 0xe3e3e3);
    assert_eq!(hex(31), 0xffffff);
    // Bright, saturated ring.
    assert_eq!(hex(32), 0x0000ff);
    assert_eq!(hex(33), 0x4100ff);
    assert_eq!(hex(36), 0xff00ff);
    assert_eq!(hex(40), 0xff0000);
    assert_eq!(hex(44), 0xffff00);
    assert_eq!(hex(48), 0x00ff00);
    assert_eq!(hex(52), 0x00ffff);
    assert_eq!(hex(55), 0x0041ff);
    // First entries of later rings.
    assert_eq!(hex(56), 0x7d7dff);
    assert_eq!(hex(104), 0x000071);
    assert_eq!(hex(176), 0x000041);
    assert_eq!(hex(247), 0x2c3041);
    // Trailing blacks.
    assert!((248..256).all(|i| hex(i) == 0));
  }

  #[test]
  fn test_sepia() {
    let palette = Palette::sepia();

    assert_eq!(palette.len(), 256);
    assert_eq!(palette.get(0), Some(rgb(0, 0, 0)));
    assert_eq!(palette.get(100), Some(rgb(135, 120, 94)));
    assert_eq!(palette.get(255), Some(rgb(255, 255, 239)));
    assert!(palette.colors().windows(2).all(|w| w[0].b <= w[1].b && w[0].r <= w[1].r));
  }

  #[test]
  fn test_grayscale() {
    let mut palette = Palette::grayscale();

    assert_eq!(palette.len(), 256);
    assert_eq!(palette.closest(rgb(100, 100, 100)), Some(100));
  }
}
