//! Converters that shell out to an external encoder.

mod cwebp;
mod imagemagick;

pub use cwebp::{CwebpConverter, CWEBP_ID};
pub use imagemagick::{ImageMagickConverter, IMAGEMAGICK_ID};
