//! The ImageMagick converter.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, OnceLock};

use webpconv_common::{paths::is_png, ConversionOptions, Converter, Error, Result};

use crate::command::build_imagemagick;
use crate::runner::describe_exit_code;
use crate::ProcessRunner;

/// Identifier of the ImageMagick converter.
pub const IMAGEMAGICK_ID: &str = "imagemagick";

/// Binary names tried on `PATH`, newest first.
const BINARY_NAMES: &[&str] = &["magick", "convert"];

/// Converts by running ImageMagick (`magick`, or the legacy `convert`).
///
/// The binary is resolved once and must list WEBP among its formats.
#[derive(Debug)]
pub struct ImageMagickConverter {
    configured_path: Option<PathBuf>,
    runner: Arc<ProcessRunner>,
    resolved: OnceLock<std::result::Result<PathBuf, String>>,
}

impl ImageMagickConverter {
    /// Create a converter, preferring `configured_path` over a `PATH` lookup.
    pub fn new(configured_path: Option<PathBuf>, runner: Arc<ProcessRunner>) -> Self {
        Self {
            configured_path,
            runner,
            resolved: OnceLock::new(),
        }
    }

    /// Resolve the ImageMagick binary, checking WebP support once.
    pub fn binary(&self) -> Result<&Path> {
        self.resolved
            .get_or_init(|| self.resolve())
            .as_deref()
            .map_err(|reason| Error::not_operational(IMAGEMAGICK_ID, reason.clone()))
    }

    fn resolve(&self) -> std::result::Result<PathBuf, String> {
        let path = match &self.configured_path {
            Some(p) if p.exists() => p.clone(),
            _ => BINARY_NAMES
                .iter()
                .find_map(|name| which::which(name).ok())
                .ok_or_else(|| "neither magick nor convert was found in PATH".to_string())?,
        };

        let output = Command::new(&path)
            .args(["-list", "format"])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| format!("failed to run {}: {e}", path.display()))?;

        let formats = String::from_utf8_lossy(&output.stdout);
        let has_webp = formats
            .lines()
            .any(|line| line.trim_start().starts_with("WEBP"));
        if !output.status.success() || !has_webp {
            return Err(format!("{} was built without WebP support", path.display()));
        }

        tracing::debug!(binary = %path.display(), "resolved ImageMagick");
        Ok(path)
    }
}

impl Converter for ImageMagickConverter {
    fn id(&self) -> &str {
        IMAGEMAGICK_ID
    }

    fn convert(
        &self,
        source: &Path,
        destination: &Path,
        options: &ConversionOptions,
    ) -> Result<()> {
        if options.skip_pngs && is_png(source) {
            return Err(Error::declined(
                IMAGEMAGICK_ID,
                "configured to skip PNG sources",
            ));
        }

        let binary = self.binary()?;
        let command = build_imagemagick(binary, source, destination, options);

        let out = self
            .runner
            .run_to(&command, destination, options.use_nice)
            .map_err(|e| Error::failed(IMAGEMAGICK_ID, format!("failed to execute: {e}")))?;

        if !out.success() {
            return Err(Error::failed(
                IMAGEMAGICK_ID,
                format!("{}: {}", describe_exit_code(out.exit_code), out.output.trim()),
            ));
        }

        Ok(())
    }
}
