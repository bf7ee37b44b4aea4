use crate::buffer::ImageBuffer;
use crate::error::Error;
use crate::pixel::Color;

/// The outcome of quantizing one pixel.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Marker {
  /// The pixel fell below the minimum alpha, or nothing in the palette
  /// matched it.
  #[default]
  Transparent,
  /// The pixel was mapped to the palette entry at this index.
  Index(usize),
}

/// A width * height grid of markers addressed row-major.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarkerGrid {
  pub width: u32,
  pub height: u32,
  pub markers: Vec<Marker>,
}

impl MarkerGrid {
  /// A grid with every cell transparent.
  pub fn new(width: u32, height: u32) -> Self {
    let len = width as usize * height as usize;
    Self { width, height, markers: vec![Marker::Transparent; len] }
  }

  pub fn get(&self, x: u32, y: u32) -> Marker {
    self.markers[self.offset(x, y)]
  }

  pub fn set(&mut self, x: u32, y: u32, marker: Marker) {
    let offset = self.offset(x, y);
    self.markers[offset] = marker;
  }

  fn offset(&self, x: u32, y: u32) -> usize {
    y as usize * self.width as usize + x as usize
  }
}

/// The pixel grid under processing together with its marker grid.
///
/// Pixels are rewritten in place as they are quantized, and dithering
/// pushes error into pixels that have not been visited yet.
#[derive(Clone, Debug)]
pub struct Raster {
  width: u32,
  height: u32,
  pixels: Vec<Color>,
  grid: MarkerGrid,
}

impl Raster {
  /// Copies a decoded image into a new raster. Fails if either dimension is
  /// zero or the pixel data doesn't match the dimensions.
  pub fn from_image(image: &ImageBuffer) -> Result<Self, Error> {
    if image.width == 0 || image.height == 0 {
      return Err(Error::InvalidDimensions);
    }

    image.check_len()?;

    Ok(Self {
      width: image.width,
      height: image.height,
      pixels: image.colors().collect(),
      grid: MarkerGrid::new(image.width, image.height),
    })
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn num_pixels(&self) -> usize {
    self.pixels.len()
  }

  pub fn pixel(&self, x: u32, y: u32) -> Color {
    self.pixels[self.offset(x, y)]
  }

  pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
    let offset = self.offset(x, y);
    self.pixels[offset] = color;
  }

  pub fn marker(&self, x: u32, y: u32) -> Marker {
    self.grid.get(x, y)
  }

  pub fn set_marker(&mut self, x: u32, y: u32, marker: Marker) {
    self.grid.set(x, y, marker);
  }

  pub fn markers(&self) -> &MarkerGrid {
    &self.grid
  }

  /// The current pixels as row-major RGBA bytes.
  pub fn to_image(&self) -> ImageBuffer {
    ImageBuffer::from_colors(self.width, self.height, &self.pixels)
  }

  /// Splits the raster into its pixel image and marker grid.
  pub fn into_parts(self) -> (ImageBuffer, MarkerGrid) {
    (self.to_image(), self.grid)
  }

  fn offset(&self, x: u32, y: u32) -> usize {
    y as usize * self.width as usize + x as usize
  }
}
