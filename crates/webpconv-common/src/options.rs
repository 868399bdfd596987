//! Conversion options and converter specifications.
//!
//! [`ConversionOptions`] holds the global defaults for one top-level
//! conversion. Each [`ConverterSpec`] entry may carry [`OptionOverrides`];
//! the orchestrator computes a fresh merged copy per entry so overrides never
//! leak between converters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Which metadata the encoder should copy from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metadata {
    /// Copy all metadata.
    All,
    /// Strip all metadata.
    #[default]
    None,
    /// Copy EXIF only.
    Exif,
    /// Copy the ICC profile only.
    Icc,
    /// Copy XMP only.
    Xmp,
}

impl Metadata {
    /// Get the value as encoders expect it on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metadata::All => "all",
            Metadata::None => "none",
            Metadata::Exif => "exif",
            Metadata::Icc => "icc",
            Metadata::Xmp => "xmp",
        }
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metadata {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Metadata::All),
            "none" => Ok(Metadata::None),
            "exif" => Ok(Metadata::Exif),
            "icc" => Ok(Metadata::Icc),
            "xmp" => Ok(Metadata::Xmp),
            other => Err(Error::invalid_input(format!(
                "unknown metadata mode '{other}' (expected all, none, exif, icc or xmp)"
            ))),
        }
    }
}

fn default_quality() -> i64 {
    85
}

fn default_method() -> i64 {
    6
}

fn default_true() -> bool {
    true
}

/// Options for a single conversion attempt.
///
/// `quality` and `method` are deliberately plain integers: values outside
/// 0-100 and 0-6 are handed to the encoder verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConversionOptions {
    /// Encoder quality, nominally 0-100.
    #[serde(default = "default_quality")]
    pub quality: i64,

    /// Metadata to preserve.
    #[serde(default)]
    pub metadata: Metadata,

    /// Encoder effort, nominally 0-6.
    #[serde(default = "default_method")]
    pub method: i64,

    /// Ask the encoder to reduce memory usage.
    #[serde(default)]
    pub low_memory: bool,

    /// Converters decline PNG sources when set.
    #[serde(default)]
    pub skip_pngs: bool,

    /// Run external encoders under `nice` when available.
    #[serde(default = "default_true")]
    pub use_nice: bool,

    /// Consider the checksum-pinned binary shipped for this platform.
    #[serde(default = "default_true")]
    pub try_supplied_binary_for_os: bool,

    /// Consider binaries at the conventional system locations.
    #[serde(default = "default_true")]
    pub try_common_system_paths: bool,

    /// Converter-specific keys (API keys and the like).
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            quality: default_quality(),
            metadata: Metadata::default(),
            method: default_method(),
            low_memory: false,
            skip_pngs: false,
            use_nice: true,
            try_supplied_binary_for_os: true,
            try_common_system_paths: true,
            extra: BTreeMap::new(),
        }
    }
}

impl ConversionOptions {
    /// Return a copy of these options with `overrides` applied on top.
    ///
    /// Present override fields win; `extra` keys are merged key by key.
    #[must_use]
    pub fn merged(&self, overrides: &OptionOverrides) -> Self {
        let mut merged = self.clone();

        if let Some(quality) = overrides.quality {
            merged.quality = quality;
        }
        if let Some(metadata) = overrides.metadata {
            merged.metadata = metadata;
        }
        if let Some(method) = overrides.method {
            merged.method = method;
        }
        if let Some(low_memory) = overrides.low_memory {
            merged.low_memory = low_memory;
        }
        if let Some(skip_pngs) = overrides.skip_pngs {
            merged.skip_pngs = skip_pngs;
        }
        if let Some(use_nice) = overrides.use_nice {
            merged.use_nice = use_nice;
        }
        if let Some(try_supplied) = overrides.try_supplied_binary_for_os {
            merged.try_supplied_binary_for_os = try_supplied;
        }
        if let Some(try_system) = overrides.try_common_system_paths {
            merged.try_common_system_paths = try_system;
        }
        for (key, value) in &overrides.extra {
            merged.extra.insert(key.clone(), value.clone());
        }

        merged
    }

    /// Look up a converter-specific string option.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }

    /// Look up a converter-specific boolean option.
    pub fn extra_bool(&self, key: &str) -> Option<bool> {
        self.extra.get(key).and_then(|v| v.as_bool())
    }
}

/// Per-entry option overrides. Absent fields keep the global default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OptionOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_memory: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_pngs: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_nice: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub try_supplied_binary_for_os: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub try_common_system_paths: Option<bool>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One entry of the ordered converter list.
///
/// Deserializes from either a bare string (`"cwebp"`) or a table
/// (`{ converter = "cwebp", options = { quality = 70 } }`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConverterSpec {
    /// A converter identifier with no overrides.
    Id(String),
    /// A converter identifier with option overrides.
    WithOptions {
        converter: String,
        #[serde(default)]
        options: OptionOverrides,
    },
}

impl ConverterSpec {
    /// Create a spec carrying overrides.
    pub fn with_options(converter: impl Into<String>, options: OptionOverrides) -> Self {
        Self::WithOptions {
            converter: converter.into(),
            options,
        }
    }

    /// The converter identifier.
    pub fn id(&self) -> &str {
        match self {
            ConverterSpec::Id(id) => id,
            ConverterSpec::WithOptions { converter, .. } => converter,
        }
    }

    /// The overrides for this entry, if any.
    pub fn overrides(&self) -> Option<&OptionOverrides> {
        match self {
            ConverterSpec::Id(_) => None,
            ConverterSpec::WithOptions { options, .. } => Some(options),
        }
    }
}

impl From<&str> for ConverterSpec {
    fn from(id: &str) -> Self {
        ConverterSpec::Id(id.to_string())
    }
}

impl From<String> for ConverterSpec {
    fn from(id: String) -> Self {
        ConverterSpec::Id(id)
    }
}
