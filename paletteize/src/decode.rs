use crate::error::Error;
use crate::raster::MarkerGrid;
use crate::run::Run;

/// Decodes a run-length token stream produced by
/// [`encode_markers`](crate::encode_markers) back into its marker grid.
///
/// Tokens may be separated by any amount of whitespace. Fails if the width
/// and height are missing, a run token is malformed, or the runs don't cover
/// exactly width * height cells.
pub fn decode_markers(stream: &str) -> Result<MarkerGrid, Error> {
  let mut tokens = stream.split_whitespace();

  let width = decode_dimension(tokens.next())?;
  let height = decode_dimension(tokens.next())?;
  let expected = (width as usize)
    .checked_mul(height as usize)
    .ok_or(Error::MissingDimensions)?;

  // Dimensions are untrusted, so grow with the runs instead of reserving
  // width * height up front.
  let mut markers = Vec::new();

  for token in tokens {
    let run: Run = token.parse()?;

    if run.count > expected - markers.len() {
      return Err(Error::RunLengthMismatch {
        expected,
        actual: markers.len().saturating_add(run.count),
      });
    }

    markers.extend(std::iter::repeat(run.marker).take(run.count));
  }

  if markers.len() != expected {
    return Err(Error::RunLengthMismatch { expected, actual: markers.len() });
  }

  Ok(MarkerGrid { width, height, markers })
}

fn decode_dimension(token: Option<&str>) -> Result<u32, Error> {
  token
    .filter(|t| t.bytes().all(|b| b.is_ascii_digit()))
    .and_then(|t| t.parse().ok())
    .ok_or(Error::MissingDimensions)
}
