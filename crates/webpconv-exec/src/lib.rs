//! # webpconv-exec
//!
//! External encoder support for webpconv.
//!
//! This crate provides:
//!
//! - **Binary location** ([`BinaryLocator`]) -- resolve a checksum-pinned
//!   bundled binary for a [`Platform`], then conventional system paths.
//! - **Command building** ([`EncoderCommand`], [`command::build_cwebp`]) --
//!   argument vectors for cwebp and ImageMagick with escaped log rendering.
//! - **Process execution** ([`ProcessRunner`]) -- run an encoder, optionally
//!   under `nice`, and capture exit code and merged output.
//! - **Converters** ([`CwebpConverter`], [`ImageMagickConverter`]) --
//!   [`webpconv_common::Converter`] implementations built on the above.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use webpconv_common::{ConversionOptions, Converter};
//! use webpconv_exec::{BinaryLocator, CwebpConverter, Platform, ProcessRunner};
//!
//! let locator = BinaryLocator::cwebp(Platform::current());
//! let converter = CwebpConverter::new(locator, Arc::new(ProcessRunner::new()));
//!
//! let options = ConversionOptions {
//!     try_supplied_binary_for_os: false,
//!     ..Default::default()
//! };
//! converter.convert("photo.jpg".as_ref(), "photo.webp".as_ref(), &options)?;
//! # Ok::<(), webpconv_common::Error>(())
//! ```

pub mod command;
pub mod converters;
pub mod locator;
pub mod platform;
pub mod runner;

// ---- Re-exports for convenience ----

pub use command::EncoderCommand;
pub use converters::{CwebpConverter, ImageMagickConverter};
pub use locator::{BinaryCandidate, BinaryLocator, BundledBinary, Verification};
pub use platform::Platform;
pub use runner::{ProcessOutput, ProcessRunner};
