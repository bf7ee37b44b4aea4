use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::raster::Marker;

// A run of identical markers, serialized as a single `<index>:<count>`
// token.
//
// | marker           | count | token |
// |------------------|-------|-------|
// | Index(3)         | 2     | `3:2` |
// | Index(3)         | 1     | `3:`  |
// | Transparent      | 4     | `:4`  |
// | Transparent      | 1     | `:`   |
//
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Run {
  pub marker: Marker,
  pub count: usize,
}

impl Run {
  pub fn new(marker: Marker) -> Self {
    Self { marker, count: 1 }
  }
}

impl fmt::Display for Run {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Marker::Index(index) = self.marker {
      write!(f, "{}", index)?;
    }

    f.write_str(":")?;

    if self.count != 1 {
      write!(f, "{}", self.count)?;
    }

    Ok(())
  }
}

impl FromStr for Run {
  type Err = Error;

  fn from_str(token: &str) -> Result<Self, Self::Err> {
    let invalid = || Error::InvalidToken(token.to_string());
    let (index, count) = token.split_once(':').ok_or_else(invalid)?;

    let marker = match index {
      "" => Marker::Transparent,
      digits => Marker::Index(parse_decimal(digits).ok_or_else(invalid)?),
    };

    let count = match count {
      "" => 1,
      digits => parse_decimal(digits).filter(|&n| n > 0).ok_or_else(invalid)?,
    };

    Ok(Self { marker, count })
  }
}

// `usize::from_str` also accepts a leading `+`, which never appears in an
// encoded stream.
fn parse_decimal(digits: &str) -> Option<usize> {
  if !digits.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }

  digits.parse().ok()
}
