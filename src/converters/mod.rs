//! In-process converters.

mod native;

pub use native::{NativeConverter, NATIVE_ID};
