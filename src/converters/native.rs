//! Pure-Rust WebP encoding through the `image` crate.
//!
//! The encoder is lossless-only, so this converter takes PNG sources and
//! declines JPEGs: re-encoding a lossy JPEG losslessly only inflates it.

use std::fs;
use std::path::Path;

use image::codecs::webp::WebPEncoder;
use image::DynamicImage;
use webpconv_common::{ConversionOptions, Converter, Error, Result, SourceFormat};

/// Identifier of the native converter.
pub const NATIVE_ID: &str = "native";

/// Converter that needs no external tools.
#[derive(Debug, Default)]
pub struct NativeConverter;

impl NativeConverter {
    pub fn new() -> Self {
        Self
    }
}

impl Converter for NativeConverter {
    fn id(&self) -> &str {
        NATIVE_ID
    }

    fn convert(
        &self,
        source: &Path,
        destination: &Path,
        options: &ConversionOptions,
    ) -> Result<()> {
        match SourceFormat::from_path(source) {
            Some(SourceFormat::Png) if options.skip_pngs => {
                return Err(Error::declined(NATIVE_ID, "configured to skip PNG sources"));
            }
            Some(SourceFormat::Png) => {}
            Some(SourceFormat::Jpeg) => {
                return Err(Error::declined(
                    NATIVE_ID,
                    "lossless-only encoder does not accept JPEG sources",
                ));
            }
            None => {
                return Err(Error::declined(NATIVE_ID, "unsupported source format"));
            }
        }

        let img = image::open(source).map_err(|e| {
            Error::failed(
                NATIVE_ID,
                format!("failed to decode {}: {e}", source.display()),
            )
        })?;

        // The WebP encoder only takes 8-bit L/LA/RGB/RGBA buffers.
        let img = match img {
            DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgba8(_) => img,
            other => DynamicImage::ImageRgba8(other.to_rgba8()),
        };

        let mut encoded = Vec::new();
        img.write_with_encoder(WebPEncoder::new_lossless(&mut encoded))
            .map_err(|e| Error::failed(NATIVE_ID, format!("failed to encode: {e}")))?;

        fs::write(destination, &encoded).map_err(|e| {
            Error::failed(
                NATIVE_ID,
                format!("failed to write {}: {e}", destination.display()),
            )
        })?;

        tracing::debug!(
            destination = %destination.display(),
            bytes = encoded.len(),
            "encoded lossless WebP"
        );
        Ok(())
    }
}
