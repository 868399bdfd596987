//! Webpconv-Common: shared types for the webpconv converters.
//!
//! This crate provides the pieces every converter backend and the fallback
//! orchestrator agree on:
//!
//! - **Options**: [`ConversionOptions`] with per-entry [`OptionOverrides`]
//! - **Converter specs**: [`ConverterSpec`], a bare id or an id with overrides
//! - **The converter contract**: the [`Converter`] trait and
//!   [`ConverterOutcome`] classification
//! - **Error Handling**: the shared [`Error`] type and result alias
//! - **Path Utilities**: source format detection by extension
//!
//! # Examples
//!
//! ```
//! use webpconv_common::{ConversionOptions, OptionOverrides};
//!
//! let defaults = ConversionOptions::default();
//! let overrides = OptionOverrides {
//!     quality: Some(60),
//!     ..Default::default()
//! };
//!
//! let merged = defaults.merged(&overrides);
//! assert_eq!(merged.quality, 60);
//! assert_eq!(defaults.quality, 85);
//! ```

pub mod converter;
pub mod error;
pub mod options;
pub mod paths;

pub use converter::{Converter, ConverterOutcome};
pub use error::{Error, Result};
pub use options::{ConversionOptions, ConverterSpec, Metadata, OptionOverrides};
pub use paths::SourceFormat;
