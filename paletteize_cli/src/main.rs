use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{debug, info};
use paletteize::{convert, encode_markers, ConvertOptions, ImageBuffer, MarkerGrid, Palette};

#[derive(Parser, Debug)]
#[command(name = "paletteize")]
#[command(about = "Map an image onto a 256 color palette and print it as run-length encoded indices")]
struct Args {
  /// Image to convert
  #[arg(long, value_name = "FILE")]
  image: PathBuf,

  /// Palette image holding exactly 256 pixels, or one of the built-in
  /// palettes: `vga`, `grayscale`, `sepia`
  #[arg(long, value_name = "FILE", default_value = "vga")]
  palette: String,

  /// Pixels with an alpha below this value become transparent
  #[arg(long, default_value = "0")]
  min_alpha: u8,

  /// Apply Floyd-Steinberg dithering
  #[arg(long)]
  dither: bool,

  /// Pixels processed between progress reports (default: 1% of the image)
  #[arg(long)]
  batch_size: Option<usize>,

  /// Write the token stream here instead of stdout
  #[arg(long, value_name = "FILE")]
  out: Option<PathBuf>,

  /// Also save the quantized image as a PNG
  #[arg(long, value_name = "FILE")]
  preview: Option<PathBuf>,
}

fn main() -> Result<()> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
  let args = Args::parse();

  let image = load_rgba(&args.image)?;
  let palette = load_palette(&args.palette)?;
  info!("Image: {:?} ({}x{})", args.image, image.width, image.height);

  let options = ConvertOptions {
    min_alpha: args.min_alpha,
    dither: args.dither,
    batch_size: args.batch_size,
  };

  let mut last_reported = 0;
  let conversion = convert(&image, &palette, &options, |percent| {
    if percent / 10 > last_reported / 10 {
      info!("Progress: {}%", percent);
      last_reported = percent;
    }
  })
  .context("Failed to convert image")?;

  match &args.out {
    Some(path) => {
      let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
      write_tokens(BufWriter::new(file), &conversion.markers)?;
      info!("Wrote {} bytes to {:?}", conversion.tokens.len(), path);
    }
    None => write_tokens(io::stdout().lock(), &conversion.markers)?,
  }

  if let Some(path) = &args.preview {
    let ImageBuffer { width, height, pixels } = conversion.preview;
    let preview = image::RgbaImage::from_raw(width, height, pixels)
      .ok_or_else(|| anyhow!("Preview buffer does not match {}x{}", width, height))?;
    preview.save(path).with_context(|| format!("Failed to save preview {:?}", path))?;
    info!("Saved preview: {:?}", path);
  }

  Ok(())
}

fn load_rgba(path: &Path) -> Result<ImageBuffer> {
  let decoded = image::open(path)
    .with_context(|| format!("Failed to decode image {:?}", path))?
    .to_rgba8();
  let (width, height) = decoded.dimensions();

  debug!("Decoded {:?}: {}x{}", path, width, height);

  Ok(ImageBuffer::new(width, height, decoded.into_raw()))
}

fn load_palette(source: &str) -> Result<ImageBuffer> {
  if let Some(preset) = preset_palette(source) {
    info!("Palette: {} (built-in)", source);
    return Ok(ImageBuffer::from_colors(16, 16, preset.colors()));
  }

  let palette = load_rgba(Path::new(source))?;
  info!("Palette: {} ({}x{})", source, palette.width, palette.height);

  Ok(palette)
}

fn preset_palette(name: &str) -> Option<Palette> {
  match name {
    "vga" => Some(Palette::vga()),
    "grayscale" => Some(Palette::grayscale()),
    "sepia" => Some(Palette::sepia()),
    _ => None,
  }
}

fn write_tokens<W: Write>(mut writer: W, markers: &MarkerGrid) -> Result<()> {
  encode_markers(markers, &mut writer).context("Failed to write token stream")?;
  writer.write_all(b"\n")?;
  writer.flush()?;
  Ok(())
}
