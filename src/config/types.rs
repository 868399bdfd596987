use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use webpconv_common::{ConversionOptions, ConverterSpec};
use webpconv_exec::locator::CWEBP_SYSTEM_PATHS;
use webpconv_exec::{BinaryLocator, BundledBinary, Platform};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Global defaults applied to every converter entry.
    #[serde(default)]
    pub options: ConversionOptions,

    /// Converters to try, in priority order.
    #[serde(default = "default_converters")]
    pub converters: Vec<ConverterSpec>,

    #[serde(default)]
    pub cwebp: CwebpConfig,

    #[serde(default)]
    pub imagemagick: ImageMagickConfig,
}

fn default_converters() -> Vec<ConverterSpec> {
    vec!["cwebp".into(), "imagemagick".into(), "native".into()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            options: ConversionOptions::default(),
            converters: default_converters(),
            cwebp: CwebpConfig::default(),
            imagemagick: ImageMagickConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CwebpConfig {
    /// Directory holding the bundled, checksum-pinned binaries.
    #[serde(default = "default_bundled_dir")]
    pub bundled_dir: PathBuf,

    /// Platform table: which bundled file to use per OS, and its SHA-256.
    #[serde(default)]
    pub bundled: Vec<BundledBinary>,

    /// Conventional install locations, tried in order.
    #[serde(default = "default_system_paths")]
    pub system_paths: Vec<PathBuf>,

    /// Also look cwebp up on `PATH`.
    #[serde(default = "default_search_path")]
    pub search_path: bool,
}

/// `binaries/` next to the running executable.
fn default_bundled_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("binaries")))
        .unwrap_or_else(|| PathBuf::from("binaries"))
}

fn default_system_paths() -> Vec<PathBuf> {
    CWEBP_SYSTEM_PATHS.iter().map(PathBuf::from).collect()
}

fn default_search_path() -> bool {
    true
}

impl Default for CwebpConfig {
    fn default() -> Self {
        Self {
            bundled_dir: default_bundled_dir(),
            bundled: Vec::new(),
            system_paths: default_system_paths(),
            search_path: default_search_path(),
        }
    }
}

impl CwebpConfig {
    /// Build a locator for the current platform from this section.
    pub fn locator(&self) -> BinaryLocator {
        BinaryLocator::new("cwebp", Platform::current())
            .with_bundled_dir(self.bundled_dir.clone())
            .with_bundled(self.bundled.clone())
            .with_system_paths(self.system_paths.clone())
            .with_path_search(self.search_path)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImageMagickConfig {
    /// Explicit path to `magick` or `convert`; `PATH` is searched otherwise.
    #[serde(default)]
    pub path: Option<PathBuf>,
}
