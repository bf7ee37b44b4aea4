//! Utility commands for building and developing the paletteize WASM site.
//!
//! # Commands
//!
//! ```sh
//! cargo run -- build
//! ```
//!
//! Compiles the `paletteize_wasm` crate and copies the built WASM file into
//! the `site` directory.
//!
//! ```sh
//! cargo run -- dev
//! ```
//!
//! Does the same thing as the `build` command and also starts a local
//! development server that serves content out of the `site` directory.
//! Modifying a source file in the `paletteize_wasm` or `paletteize` crates
//! rebuilds the WASM file, and any change in `site` refreshes the page.
//!

use std::env;
use std::error::Error;
use std::fs;
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4, TcpListener};
use std::path::PathBuf;
use std::process::Command;

use hotwatch::{Event, Hotwatch};

#[derive(Clone)]
struct Paths {
  core_src: PathBuf,
  root_dir: PathBuf,
  site_dir: PathBuf,
  wasm_build: PathBuf,
  wasm_src: PathBuf,
  wasm_target: PathBuf,
}

impl Paths {
  fn try_new() -> Result<Self, io::Error> {
    let root_dir = fs::canonicalize("../")?;

    Ok(Self {
      core_src: root_dir.join("paletteize/src"),
      site_dir: root_dir.join("site"),
      wasm_src: root_dir.join("paletteize_wasm/src"),
      wasm_build: root_dir.join("target/wasm32-unknown-unknown/release-wasm/paletteize_wasm.wasm"),
      wasm_target: root_dir.join("site/paletteize.wasm"),
      root_dir,
    })
  }
}

fn main() -> Result<(), Box<dyn Error>> {
  let paths = Paths::try_new()?;

  let command = env::args()
    .nth(1)
    .ok_or("Expected to be called with a `build` or `dev` argument, but received none instead")?;

  match command.as_str() {
    "build" => {
      build_and_copy(&paths)?;
    }
    "dev" => {
      build_and_copy(&paths)?;

      let mut watcher = Hotwatch::new()?;

      for src in [&paths.wasm_src, &paths.core_src] {
        let p = paths.clone();

        watcher.watch(src, move |e: Event| {
          if let Event::Write(_) = e {
            // Keep serving the last good build if this one fails.
            if let Err(err) = build_and_copy(&p) {
              eprintln!("==> Build failed: {}", err);
            }
          }
        })?;
      }

      start_dev_server(&paths)?;
    }
    other => {
      return Err(format!(
        "Expected to be called with a `build` or `dev` argument, but received `{}` instead",
        other
      )
      .into());
    }
  };

  Ok(())
}

fn build_and_copy(paths: &Paths) -> Result<(), Box<dyn Error>> {
  println!("==> Building crate paletteize_wasm");

  let build_args = [
    "build",
    "--package",
    "paletteize_wasm",
    // Use the custom `release-wasm` build profile defined in the workspace's
    // root `Cargo.toml`.
    "--profile",
    "release-wasm",
    // Target WASM architecture.
    "--target",
    "wasm32-unknown-unknown",
  ];

  let build_status = Command::new("cargo")
    .current_dir(&paths.root_dir)
    .args(build_args)
    .status()?;

  if !build_status.success() {
    return Err(format!("Build command exited with status code `{:?}`", build_status.code()).into());
  }

  println!(
    "==> Copying {} to {}",
    paths.wasm_build.display(),
    paths.wasm_target.display(),
  );

  fs::copy(&paths.wasm_build, &paths.wasm_target)?;

  Ok(())
}

fn start_dev_server(paths: &Paths) -> Result<(), Box<dyn Error>> {
  let port = get_open_port().ok_or("Failed to find an open port between 7000 and 8000")?;
  let site_dir = paths.site_dir.to_str().ok_or("Site directory is not valid UTF-8")?;

  println!("==> Starting dev server at http://localhost:{}", port);
  println!("==> Press ctrl+c to stop");

  devserver_lib::run("localhost", port.into(), site_dir, true, "");

  Ok(())
}

fn get_open_port() -> Option<u16> {
  (7000..=8000).find(|&port| TcpListener::bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port)).is_ok())
}
