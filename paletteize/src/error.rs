use std::io;

use thiserror::Error;

/// An enumeration of all error values this crate may produce.
#[derive(Debug, Error)]
pub enum Error {
  /// Failed to start a conversion because the image has zero width or
  /// height.
  #[error("invalid image width or height")]
  InvalidDimensions,
  /// Failed to start a conversion because the palette image does not contain
  /// exactly 256 pixels.
  #[error("invalid palette size {0}, pixel count must be 256")]
  InvalidPaletteSize(usize),
  /// A pixel buffer's byte length does not match its width * height * 4.
  #[error("pixel buffer holds {actual} bytes, expected {expected}")]
  BufferSizeMismatch { expected: usize, actual: usize },
  /// Failed to decode a token stream that does not start with a width and a
  /// height.
  #[error("missing or malformed width and height tokens")]
  MissingDimensions,
  /// Failed to decode a run token, e.g. one without a `:` separator or with a
  /// non-numeric index or count.
  #[error("invalid run token `{0}`")]
  InvalidToken(String),
  /// The runs of a decoded token stream do not add up to width * height.
  #[error("runs cover {actual} cells, expected {expected}")]
  RunLengthMismatch { expected: usize, actual: usize },
  /// Any `std::io::Error` that occurs while writing an encoded token stream.
  #[error(transparent)]
  Io(#[from] io::Error),
}

#[cfg(test)]
impl PartialEq for Error {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Error::InvalidDimensions, Error::InvalidDimensions) => true,
      (Error::InvalidPaletteSize(a), Error::InvalidPaletteSize(b)) => a == b,
      (
        Error::BufferSizeMismatch { expected: a, actual: b },
        Error::BufferSizeMismatch { expected: c, actual: d },
      ) => a == c && b == d,
      (Error::MissingDimensions, Error::MissingDimensions) => true,
      (Error::InvalidToken(a), Error::InvalidToken(b)) => a == b,
      (
        Error::RunLengthMismatch { expected: a, actual: b },
        Error::RunLengthMismatch { expected: c, actual: d },
      ) => a == c && b == d,
      (Error::Io(..), Error::Io(..)) => true,
      _ => false,
    }
  }
}
