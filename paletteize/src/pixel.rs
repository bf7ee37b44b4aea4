/// A single RGBA color. Channels are un-premultiplied 8-bit values.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Color {
  /// Red channel value.
  pub r: u8,
  /// Green channel value.
  pub g: u8,
  /// Blue channel value.
  pub b: u8,
  /// Alpha channel value.
  pub a: u8,
}

// The per-channel difference between a color and the palette color it was
// quantized to. Alpha never takes part in error diffusion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorError {
  pub r: i32,
  pub g: i32,
  pub b: i32,
}

impl Color {
  /// A fully transparent black, written to pixels that fall below the
  /// minimum alpha threshold.
  pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

  pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
    Self { r, g, b, a }
  }

  /// Reads a color from the first four bytes of an RGBA chunk.
  pub fn from_rgba(chunk: &[u8]) -> Self {
    Self { r: chunk[0], g: chunk[1], b: chunk[2], a: chunk[3] }
  }

  pub fn to_rgba(self) -> [u8; 4] {
    [self.r, self.g, self.b, self.a]
  }

  // Key used by the palette's match cache.
  pub(crate) fn rgb(self) -> [u8; 3] {
    [self.r, self.g, self.b]
  }

  /// Returns the same color with its alpha channel forced to 255.
  pub fn opaque(self) -> Self {
    Self { a: 255, ..self }
  }

  /// Sum of the squared differences of the red, green and blue channels.
  /// Alpha is ignored.
  pub fn squared_distance(&self, other: &Color) -> u32 {
    let dr = self.r as i32 - other.r as i32;
    let dg = self.g as i32 - other.g as i32;
    let db = self.b as i32 - other.b as i32;

    (dr * dr + dg * dg + db * db) as u32
  }

  // Per-channel `self - target`.
  pub(crate) fn error_to(&self, target: &Color) -> ColorError {
    ColorError {
      r: self.r as i32 - target.r as i32,
      g: self.g as i32 - target.g as i32,
      b: self.b as i32 - target.b as i32,
    }
  }

  // Adds a scaled share of `error` to the color. Each channel is clamped to
  // [0, 255] and rounded half-to-even back to a byte; alpha is kept.
  pub(crate) fn diffuse(&self, error: ColorError, weight: f64) -> Self {
    let add = |channel: u8, err: i32| -> u8 {
      let value = channel as f64 + err as f64 * weight;
      value.clamp(0.0, 255.0).round_ties_even() as u8
    };

    Self {
      r: add(self.r, error.r),
      g: add(self.g, error.g),
      b: add(self.b, error.b),
      a: self.a,
    }
  }
}
