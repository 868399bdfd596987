//! Converter lookup by identifier.
//!
//! The registry maps identifiers to shared converter instances. It is
//! consulted once, when a [`crate::FallbackOrchestrator`] is built.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use webpconv_common::Converter;
use webpconv_exec::{CwebpConverter, ImageMagickConverter, ProcessRunner};

use crate::config::Config;
use crate::converters::NativeConverter;

/// Identifier → converter map.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: BTreeMap<String, Arc<dyn Converter>>,
}

impl ConverterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in converter, configured from `config`.
    ///
    /// The binary converters share one [`ProcessRunner`], so `nice` is
    /// probed at most once.
    pub fn from_config(config: &Config) -> Self {
        let runner = Arc::new(ProcessRunner::new());
        let mut registry = Self::new();

        registry.register(Arc::new(CwebpConverter::new(
            config.cwebp.locator(),
            Arc::clone(&runner),
        )));
        registry.register(Arc::new(ImageMagickConverter::new(
            config.imagemagick.path.clone(),
            Arc::clone(&runner),
        )));
        registry.register(Arc::new(NativeConverter::new()));

        registry
    }

    /// Add a converter, replacing any previous one with the same identifier.
    pub fn register(&mut self, converter: Arc<dyn Converter>) -> Option<Arc<dyn Converter>> {
        self.converters.insert(converter.id().to_string(), converter)
    }

    /// Look up a converter by identifier.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Converter>> {
        self.converters.get(id).cloned()
    }

    /// Whether a converter is registered under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.converters.contains_key(id)
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.converters.keys().map(String::as_str)
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("converters", &self.converters.keys().collect::<Vec<_>>())
            .finish()
    }
}
