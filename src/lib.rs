//! Webpconv - JPEG/PNG to WebP conversion through a fallback chain.
//!
//! This library crate exposes the orchestrator, registry and configuration
//! used by the `webpconv` binary, for embedding and integration testing.

pub mod config;
pub mod converters;
pub mod orchestrator;
pub mod preflight;
pub mod registry;

pub use orchestrator::FallbackOrchestrator;
pub use registry::ConverterRegistry;
pub use webpconv_common::{
    ConversionOptions, Converter, ConverterOutcome, ConverterSpec, Error, Metadata,
    OptionOverrides, Result,
};

use std::path::Path;

/// Convert `source` to `destination` using the converters and defaults from
/// `config`.
///
/// Returns `Ok(false)` when no configured converter is operational.
pub fn convert(source: &Path, destination: &Path, config: &config::Config) -> Result<bool> {
    let registry = ConverterRegistry::from_config(config);
    FallbackOrchestrator::new(&registry, &config.converters).convert(
        source,
        destination,
        &config.options,
    )
}
