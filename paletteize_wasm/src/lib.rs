//! A [WebAssembly](https://developer.mozilla.org/en-US/docs/WebAssembly)
//! wrapper of the paletteize crate, so that images can be converted inside a
//! web browser without blocking its event loop.
//!
//! Passing rich data types through the WASM FFI boundary isn't supported, so
//! image data is copied in and out of the instance's memory manually, and
//! results are handed back through imported callbacks. These steps involve
//! manually allocating and deallocating raw memory and must run in order.
//!
//! A conversion is started with `paletteize_begin`, which returns an opaque
//! job pointer. The host then calls `paletteize_step` with that pointer once
//! per turn of its event loop, e.g. from `setTimeout`, until
//! `on_convert_complete` fires. Each step processes one batch of pixels.
//!
//! # JavaScript WebAssembly example
//!
//! ```js
//! let wasm = await WebAssembly.instantiateStreaming(fetch('./paletteize.wasm'), {
//!   env: {
//!     // Invoked after every batch with the percentage of pixels processed.
//!     on_convert_progress: (percent) => {
//!       console.log(`Progress: ${percent}%`);
//!     },
//!
//!     // Invoked once when the last batch is done. The job pointer is no
//!     // longer valid at this point.
//!     on_convert_complete: (textPtr, textSize, pixelsPtr, pixelsSize) => {
//!       let memory = wasm.instance.exports.memory.buffer;
//!
//!       // The run-length encoded token stream.
//!       let text = new TextDecoder().decode(new Uint8Array(memory, textPtr, textSize));
//!
//!       // The quantized image as RGBA bytes, e.g. for an `ImageData`.
//!       let preview = new Uint8ClampedArray(memory.slice(pixelsPtr, pixelsPtr + pixelsSize));
//!
//!       wasm.instance.exports.paletteize_dealloc(textPtr, textSize);
//!       wasm.instance.exports.paletteize_dealloc(pixelsPtr, pixelsSize);
//!     },
//!
//!     // Error code that maps to the type of error that occured.
//!     on_convert_error: (code) => {
//!       console.error(code);
//!     },
//!   },
//! });
//!
//! // Copy both RGBA buffers into the WASM instance's memory.
//! function copyIn(bytes) {
//!   let pointer = wasm.instance.exports.paletteize_malloc(bytes.byteLength);
//!   new Uint8Array(wasm.instance.exports.memory.buffer, pointer, bytes.byteLength).set(bytes);
//!   return pointer;
//! }
//!
//! let imagePtr = copyIn(image.data);
//! let palettePtr = copyIn(palette.data);
//!
//! // Takes ownership of both buffers, no need to deallocate them.
//! let job = wasm.instance.exports.paletteize_begin(
//!   image.width, image.height, imagePtr, image.data.byteLength,
//!   palette.width, palette.height, palettePtr, palette.data.byteLength,
//!   minAlpha, dithering ? 1 : 0, 0,
//! );
//!
//! function next() {
//!   if (wasm.instance.exports.paletteize_step(job)) {
//!     setTimeout(next, 0);
//!   }
//! }
//!
//! if (job !== 0) {
//!   next();
//! }
//! ```
//!

use std::mem;
use std::ptr;

use paletteize::{Conversion, ConvertOptions, Converter, Error, ImageBuffer};

// Maps a paletteize error into an integer that can be trivially passed
// through the WASM FFI boundary.
struct ErrorCode {
  code: u8,
}

impl From<Error> for ErrorCode {
  fn from(error: Error) -> Self {
    match error {
      Error::InvalidDimensions => ErrorCode { code: 1 },
      Error::InvalidPaletteSize(_) => ErrorCode { code: 2 },
      Error::BufferSizeMismatch { .. } => ErrorCode { code: 3 },
      Error::MissingDimensions => ErrorCode { code: 4 },
      Error::InvalidToken(_) => ErrorCode { code: 5 },
      Error::RunLengthMismatch { .. } => ErrorCode { code: 6 },
      Error::Io(_) => ErrorCode { code: 7 },
    }
  }
}

// External functions that are expected to be imported into the WASM instance
// from the host.
extern "C" {
  fn on_convert_progress(percent: u8);
  fn on_convert_complete(text_ptr: *mut u8, text_size: usize, pixels_ptr: *mut u8, pixels_size: usize);
  fn on_convert_error(err_code: u8);
}

/// Allocates a chunk of linear memory of the given `size`, intended to contain
/// byte (u8) values.
#[no_mangle]
pub extern "C" fn paletteize_malloc(size: usize) -> *mut u8 {
  let mut buf = Vec::with_capacity(size);
  let ptr = buf.as_mut_ptr();

  mem::forget(buf);

  ptr
}

/// Deallocates the memory starting at `ptr` up to `size`.
///
/// # Safety
///
/// This function should only be called once for each allocation created with
/// `paletteize_malloc`, or handed out by `on_convert_complete`, using the same
/// `size` and the returned `ptr`, otherwise the WASM instance's memory will be
/// corrupted.
#[no_mangle]
pub unsafe extern "C" fn paletteize_dealloc(ptr: *mut u8, size: usize) {
  drop(Vec::from_raw_parts(ptr, size, size));
}

/// Takes an image and a 256 pixel palette image, both as RGBA pixel data
/// created with `paletteize_malloc`, and starts converting the image.
///
/// Both buffers are owned by the conversion from here on. A `batch_size` of
/// zero picks the default of 1% of the image.
///
/// Returns a job pointer to pass to `paletteize_step`, or null after calling
/// `on_convert_error` with an error code if the inputs are invalid.
///
/// # Safety
///
/// Requires creating `Vec`s of pixel data from raw memory created by calling
/// `paletteize_malloc`. Providing an invalid pointer or size will result in
/// corrupted memory and likely crash the WASM instance.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn paletteize_begin(
  width: u32,
  height: u32,
  image_ptr: *mut u8,
  image_size: usize,
  palette_width: u32,
  palette_height: u32,
  palette_ptr: *mut u8,
  palette_size: usize,
  min_alpha: u8,
  dither: u8,
  batch_size: usize,
) -> *mut Converter {
  let image = ImageBuffer::new(width, height, Vec::from_raw_parts(image_ptr, image_size, image_size));
  let palette = ImageBuffer::new(
    palette_width,
    palette_height,
    Vec::from_raw_parts(palette_ptr, palette_size, palette_size),
  );

  let options = ConvertOptions {
    min_alpha,
    dither: dither != 0,
    batch_size: (batch_size > 0).then_some(batch_size),
  };

  match Converter::new(&image, &palette, &options) {
    Ok(converter) => Box::into_raw(Box::new(converter)),
    Err(e) => {
      on_convert_error(ErrorCode::from(e).code);
      ptr::null_mut()
    }
  }
}

/// Processes one batch of pixels of the conversion behind `job` and calls
/// `on_convert_progress`.
///
/// Returns 1 while there is work left. After the last batch, calls
/// `on_convert_complete` with the encoded token stream and the quantized
/// image, frees the job and returns 0.
///
/// # Safety
///
/// `job` must be a pointer returned by `paletteize_begin` that hasn't been
/// completed or cancelled yet.
#[no_mangle]
pub unsafe extern "C" fn paletteize_step(job: *mut Converter) -> u8 {
  let converter = &mut *job;

  if let Some(percent) = converter.next() {
    on_convert_progress(percent);

    if !converter.is_complete() {
      return 1;
    }
  }

  let Conversion { tokens, preview, .. } = Box::from_raw(job).finish();
  let (text_ptr, text_size) = into_raw_bytes(tokens.into_bytes());
  let (pixels_ptr, pixels_size) = into_raw_bytes(preview.pixels);

  on_convert_complete(text_ptr, text_size, pixels_ptr, pixels_size);

  0
}

// Leaks `bytes` with capacity == length, as `paletteize_dealloc` expects.
fn into_raw_bytes(bytes: Vec<u8>) -> (*mut u8, usize) {
  let bytes = bytes.into_boxed_slice();
  let size = bytes.len();

  (Box::into_raw(bytes) as *mut u8, size)
}

/// Abandons the conversion behind `job` and frees it.
///
/// # Safety
///
/// `job` must be a pointer returned by `paletteize_begin` that hasn't been
/// completed or cancelled yet.
#[no_mangle]
pub unsafe extern "C" fn paletteize_cancel(job: *mut Converter) {
  drop(Box::from_raw(job));
}
