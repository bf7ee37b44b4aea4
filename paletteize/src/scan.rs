use log::trace;

use crate::palette::Palette;
use crate::quantize::Algorithm;
use crate::raster::Raster;

/// Returns the default number of pixels processed per batch: 1% of the
/// image, at least one.
pub fn default_batch_size(num_pixels: usize) -> usize {
  (num_pixels / 100).max(1)
}

/// A resumable raster-scan over every pixel of a `Raster`.
///
/// Each call to `next` quantizes one batch of pixels in row-major order and
/// yields the overall progress as a percentage. The iterator ends once every
/// pixel has been visited exactly once, so a host can hand control back to
/// its own scheduler between batches, or simply stop pulling batches.
pub struct Scan {
  raster: Raster,
  palette: Palette,
  algorithm: Algorithm,
  min_alpha: u8,
  batch_size: usize,
  // Number of pixels visited so far, also the offset of the next pixel.
  position: usize,
}

impl Scan {
  /// Creates a scan. A `batch_size` of zero is treated as one.
  pub fn new(
    raster: Raster,
    palette: Palette,
    algorithm: Algorithm,
    min_alpha: u8,
    batch_size: usize,
  ) -> Self {
    Self {
      raster,
      palette,
      algorithm,
      min_alpha,
      batch_size: batch_size.max(1),
      position: 0,
    }
  }

  pub fn batch_size(&self) -> usize {
    self.batch_size
  }

  /// Number of pixels visited so far.
  pub fn processed(&self) -> usize {
    self.position
  }

  pub fn is_complete(&self) -> bool {
    self.position >= self.raster.num_pixels()
  }

  pub fn raster(&self) -> &Raster {
    &self.raster
  }

  /// Percentage of pixels visited so far, rounded down.
  pub fn progress(&self) -> u8 {
    let total = self.raster.num_pixels() as u64;
    (100 * self.position as u64 / total.max(1)) as u8
  }

  /// Drives the scan to completion, calling `on_progress` after each batch,
  /// and returns the processed raster.
  pub fn run<F: FnMut(u8)>(mut self, mut on_progress: F) -> Raster {
    for percent in self.by_ref() {
      on_progress(percent);
    }

    self.raster
  }

  /// Stops the scan where it is and returns the raster, which may be only
  /// partially processed.
  pub fn into_raster(self) -> Raster {
    self.raster
  }

  fn process_batch(&mut self) {
    let width = self.raster.width() as usize;
    let end = (self.position + self.batch_size).min(self.raster.num_pixels());

    for offset in self.position..end {
      let x = (offset % width) as u32;
      let y = (offset / width) as u32;
      self.algorithm.apply(&mut self.raster, &mut self.palette, x, y, self.min_alpha);
    }

    self.position = end;
  }
}

impl Iterator for Scan {
  type Item = u8;

  fn next(&mut self) -> Option<u8> {
    if self.is_complete() {
      return None;
    }

    self.process_batch();

    let percent = self.progress();
    trace!("processed {} of {} pixels ({}%)", self.position, self.raster.num_pixels(), percent);

    Some(percent)
  }
}
