//! Shared helpers for integration tests.
//!
//! Provides [`FakeConverter`], a scripted converter that records every call
//! and the options it received, plus small filesystem fixtures.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use webpconv::{ConversionOptions, Converter, ConverterRegistry, Error, Result};

/// What a [`FakeConverter`] does when invoked.
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    Succeed,
    Decline,
    NotOperational,
    Fail,
}

/// A converter with scripted behavior that doubles as a spy.
pub struct FakeConverter {
    id: String,
    behavior: Behavior,
    calls: AtomicUsize,
    seen: Mutex<Vec<ConversionOptions>>,
}

impl FakeConverter {
    pub fn new(id: &str, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            behavior,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    /// How many times `convert` ran.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Options received, one per call.
    pub fn seen_options(&self) -> Vec<ConversionOptions> {
        self.seen.lock().clone()
    }
}

impl Converter for FakeConverter {
    fn id(&self) -> &str {
        &self.id
    }

    fn convert(
        &self,
        _source: &Path,
        destination: &Path,
        options: &ConversionOptions,
    ) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(options.clone());

        match self.behavior {
            Behavior::Succeed => {
                fs::write(destination, b"RIFF\0\0\0\0WEBP")?;
                Ok(())
            }
            Behavior::Decline => Err(Error::declined(&self.id, format!("{} said no", self.id))),
            Behavior::NotOperational => Err(Error::not_operational(
                &self.id,
                format!("{} is not installed", self.id),
            )),
            Behavior::Fail => Err(Error::failed(&self.id, format!("{} exploded", self.id))),
        }
    }
}

/// Registry containing exactly `fakes`.
pub fn registry(fakes: &[Arc<FakeConverter>]) -> ConverterRegistry {
    let mut registry = ConverterRegistry::new();
    for fake in fakes {
        registry.register(fake.clone());
    }
    registry
}

/// Write a placeholder JPEG source into `dir`.
pub fn jpeg_source(dir: &Path) -> PathBuf {
    let source = dir.join("a.jpg");
    fs::write(&source, b"\xFF\xD8\xFF\xE0 placeholder").unwrap();
    source
}

/// Write a small real PNG into `dir`.
pub fn png_source(dir: &Path) -> PathBuf {
    let source = dir.join("logo.png");
    let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([10, 200, 30, 255]));
    img.save(&source).unwrap();
    source
}

/// Body shared by the cwebp stand-ins: finds the `-o` argument.
#[cfg(unix)]
const FIND_OUTPUT: &str = r#"#!/bin/sh
out=""
while [ "$#" -gt 0 ]; do
  if [ "$1" = "-o" ]; then shift; out="$1"; fi
  shift
done
"#;

#[cfg(unix)]
fn write_cwebp(dir: &Path, tail: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("cwebp");
    fs::write(&path, format!("{FIND_OUTPUT}{tail}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Write an executable cwebp stand-in that writes a RIFF header to its
/// `-o` argument.
#[cfg(unix)]
pub fn fake_cwebp(dir: &Path) -> PathBuf {
    write_cwebp(dir, r#"printf 'RIFF\000\000\000\000WEBP' > "$out""#)
}

/// Write a cwebp stand-in that leaves a truncated file at `-o` and fails.
#[cfg(unix)]
pub fn truncating_cwebp(dir: &Path) -> PathBuf {
    write_cwebp(dir, "printf 'RIFFgarbage' > \"$out\"\nexit 1")
}
