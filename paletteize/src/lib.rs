//! This crate maps images onto a fixed 256 color palette and serializes the
//! result as a compact run-length encoded token stream.
//!
//! Every pixel is matched to its nearest palette color by squared RGB
//! distance, optionally with Floyd-Steinberg dithering. Pixels whose alpha
//! falls below a threshold are marked transparent instead. The resulting
//! grid of palette indices is written as:
//!
//! ```text
//! <width> <height> <index>:<count> <index>:<count> ...
//! ```
//!
//! where the index is empty for transparent runs and the count is empty for
//! runs of a single pixel.
//!
//! To keep this crate simple, it does not decode image files. Images and
//! palettes are handed over as already decoded RGBA buffers.
//!
//! # Blocking conversion example
//!
//! ```rust
//! use paletteize::{convert, Color, ConvertOptions, ImageBuffer};
//!
//! // A 1x1 image made up of an opaque, mostly red pixel.
//! let image = ImageBuffer::new(1, 1, vec![200, 10, 10, 255]);
//!
//! // A palette image must hold exactly 256 pixels.
//! let mut colors = vec![Color::new(0, 0, 0, 255); 256];
//! colors[1] = Color::new(255, 0, 0, 255);
//! let palette = ImageBuffer::from_colors(16, 16, &colors);
//!
//! let conversion = convert(&image, &palette, &ConvertOptions::default(), |percent| {
//!   println!("{}%", percent);
//! })
//! .expect("Failed to convert image");
//!
//! assert_eq!(conversion.tokens, "1 1 1:");
//! ```
//!
//! # Stepwise conversion example
//!
//! Hosts that must stay responsive, such as a browser, can drive the
//! conversion one batch at a time and yield between batches.
//!
//! ```rust
//! use paletteize::{ConvertOptions, Converter, ImageBuffer};
//!
//! let image = ImageBuffer::new(2, 2, vec![0; 16]);
//! let palette = ImageBuffer::new(256, 1, vec![255; 1024]);
//! let options = ConvertOptions { min_alpha: 10, batch_size: Some(1), ..Default::default() };
//!
//! let mut converter = Converter::new(&image, &palette, &options)
//!   .expect("Invalid image or palette");
//!
//! while let Some(percent) = converter.next() {
//!   // Hand control back to the host's scheduler here.
//!   println!("{}%", percent);
//! }
//!
//! assert_eq!(converter.finish().tokens, "2 2 :4");
//! ```
//!

pub use crate::buffer::ImageBuffer;
pub use crate::convert::{convert, ConvertOptions, Conversion, Converter};
pub use crate::decode::decode_markers;
pub use crate::encode::{encode_markers, encode_to_string};
pub use crate::error::Error;
pub use crate::palette::{Palette, PALETTE_SIZE};
pub use crate::pixel::Color;
pub use crate::quantize::{Algorithm, FLOYD_STEINBERG};
pub use crate::raster::{Marker, MarkerGrid, Raster};
pub use crate::run::Run;
pub use crate::scan::{default_batch_size, Scan};

mod buffer;
mod convert;
mod decode;
mod encode;
mod error;
mod palette;
mod pixel;
mod quantize;
mod raster;
mod run;
mod scan;
