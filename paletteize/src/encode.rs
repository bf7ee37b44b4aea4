use std::io;

use crate::error::Error;
use crate::raster::{Marker, MarkerGrid};
use crate::run::Run;

/// Encodes a marker grid as a run-length token stream and writes it to the
/// provided `writer`.
///
/// The stream is the grid's width and height followed by one `<index>:<count>`
/// token per run of identical markers in row-major order, all separated by a
/// single space. Runs continue across row boundaries. The index is left empty
/// for transparent runs and the count is left empty for runs of one.
pub fn encode_markers<W: io::Write>(grid: &MarkerGrid, mut writer: W) -> Result<(), Error> {
  write!(writer, "{} {}", grid.width, grid.height)?;

  for run in runs(&grid.markers) {
    write!(writer, " {}", run)?;
  }

  writer.flush()?;

  Ok(())
}

/// Encodes a marker grid into an in-memory token stream, see
/// [`encode_markers`].
pub fn encode_to_string(grid: &MarkerGrid) -> String {
  let mut tokens = vec![grid.width.to_string(), grid.height.to_string()];
  tokens.extend(runs(&grid.markers).map(|run| run.to_string()));
  tokens.join(" ")
}

// Collapses consecutive equal markers into runs.
pub(crate) fn runs(markers: &[Marker]) -> impl Iterator<Item = Run> + '_ {
  let mut markers = markers.iter().copied().peekable();

  std::iter::from_fn(move || {
    let mut run = Run::new(markers.next()?);

    while markers.next_if_eq(&run.marker).is_some() {
      run.count += 1;
    }

    Some(run)
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  use crate::raster::Marker::{Index, Transparent};

  fn grid(width: u32, height: u32, markers: Vec<Marker>) -> MarkerGrid {
    MarkerGrid { width, height, markers }
  }

  #[test]
  fn test_runs_span_rows() {
    let markers = [Index(1), Index(1), Index(1), Index(1), Transparent, Index(1)];

    assert_eq!(
      runs(&markers).collect::<Vec<_>>(),
      vec![
        Run { marker: Index(1), count: 4 },
        Run { marker: Transparent, count: 1 },
        Run { marker: Index(1), count: 1 },
      ]
    );
    assert_eq!(encode_to_string(&grid(2, 3, markers.to_vec())), "2 3 1:4 : 1:");
  }

  #[test]
  fn test_single_opaque_pixel() {
    assert_eq!(encode_to_string(&grid(1, 1, vec![Index(1)])), "1 1 1:");
  }

  #[test]
  fn test_all_transparent() {
    assert_eq!(encode_to_string(&grid(2, 2, vec![Transparent; 4])), "2 2 :4");
  }

  #[test]
  fn test_alternating() {
    let markers = vec![Transparent, Index(5), Transparent, Index(0)];

    assert_eq!(encode_to_string(&grid(4, 1, markers)), "4 1 : 5: : 0:");
  }

  #[test]
  fn test_empty_grid_has_only_dimensions() {
    assert_eq!(encode_to_string(&grid(0, 0, Vec::new())), "0 0");
  }

  #[test]
  fn test_writer_matches_string() {
    let g = grid(3, 1, vec![Index(2), Index(2), Transparent]);
    let mut dest = Vec::new();

    encode_markers(&g, &mut dest).expect("Failed to encode markers");

    assert_eq!(dest, b"3 1 2:2 :");
    assert_eq!(String::from_utf8(dest).ok(), Some(encode_to_string(&g)));
  }
}
