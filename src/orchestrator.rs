//! The fallback chain.
//!
//! [`FallbackOrchestrator`] tries converters strictly one at a time, in list
//! order, until one succeeds:
//!
//! - `Success` stops the chain
//! - `NotOperational` falls through silently
//! - `Failed` and `Declined` fall through; the first one is remembered and
//!   re-raised if nothing succeeds
//!
//! When every converter was merely not operational the result is `false`
//! rather than an error, so callers can fall back to serving the original.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use webpconv_common::{
    ConversionOptions, Converter, ConverterOutcome, ConverterSpec, Error, OptionOverrides,
    Result,
};

use crate::preflight::prepare_destination;
use crate::registry::ConverterRegistry;

/// One resolved entry of the converter list.
#[derive(Clone)]
struct Entry {
    converter: Arc<dyn Converter>,
    overrides: Option<OptionOverrides>,
}

/// Runs an ordered list of converters until one produces the destination.
#[derive(Clone)]
pub struct FallbackOrchestrator {
    entries: Vec<Entry>,
}

impl FallbackOrchestrator {
    /// Resolve `specs` against `registry`.
    ///
    /// Unknown identifiers are skipped. Duplicate entries are kept, each with
    /// its own overrides.
    pub fn new(registry: &ConverterRegistry, specs: &[ConverterSpec]) -> Self {
        let entries = specs
            .iter()
            .filter_map(|spec| match registry.get(spec.id()) {
                Some(converter) => Some(Entry {
                    converter,
                    overrides: spec.overrides().cloned(),
                }),
                None => {
                    tracing::debug!(converter = spec.id(), "skipping unknown converter");
                    None
                }
            })
            .collect();

        Self { entries }
    }

    /// Number of resolved entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry resolved to a known converter.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifiers of the resolved entries, in order.
    pub fn converter_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.converter.id()).collect()
    }

    /// Convert `source` to `destination`.
    ///
    /// Returns `Ok(true)` on success and `Ok(false)` when no converter was
    /// operational. Returns the first `Failed`/`Declined` error when nothing
    /// succeeded and at least one converter failed or declined.
    pub fn convert(
        &self,
        source: &Path,
        destination: &Path,
        defaults: &ConversionOptions,
    ) -> Result<bool> {
        self.convert_detailed(source, destination, defaults)
            .map(|winner| winner.is_some())
    }

    /// Like [`Self::convert`], but reports which converter succeeded.
    pub fn convert_detailed(
        &self,
        source: &Path,
        destination: &Path,
        defaults: &ConversionOptions,
    ) -> Result<Option<String>> {
        prepare_destination(source, destination)?;

        let mut first_failure: Option<Error> = None;

        for entry in &self.entries {
            let id = entry.converter.id();
            let options = match &entry.overrides {
                Some(overrides) => defaults.merged(overrides),
                None => defaults.clone(),
            };

            let existed = destination.exists();
            let started = Instant::now();
            let result = entry
                .converter
                .convert(source, destination, &options)
                .and_then(|()| ensure_destination(id, destination));
            if result.is_err() && !existed {
                remove_leftover(id, destination);
            }
            let outcome = ConverterOutcome::classify(result)?;

            tracing::debug!(
                converter = id,
                outcome = outcome.label(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "converter finished"
            );

            match outcome {
                ConverterOutcome::Success => {
                    tracing::info!(
                        converter = id,
                        source = %source.display(),
                        destination = %destination.display(),
                        "converted"
                    );
                    return Ok(Some(id.to_string()));
                }
                ConverterOutcome::NotOperational(err) => {
                    tracing::debug!(converter = id, reason = %err, "converter not operational");
                }
                ConverterOutcome::Failed(err) | ConverterOutcome::Declined(err) => {
                    tracing::debug!(converter = id, error = %err, "converter did not convert");
                    if first_failure.is_none() {
                        first_failure = Some(err);
                    }
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }
}

/// A converter that reports success must have produced the file.
fn ensure_destination(id: &str, destination: &Path) -> Result<()> {
    if destination.is_file() {
        Ok(())
    } else {
        Err(Error::failed(
            id,
            format!(
                "reported success but {} was not created",
                destination.display()
            ),
        ))
    }
}

/// Remove a file an unsuccessful attempt created, so it can neither be
/// mistaken for a result nor satisfy a later converter's success check.
fn remove_leftover(id: &str, destination: &Path) {
    match std::fs::remove_file(destination) {
        Ok(()) => {
            tracing::debug!(
                converter = id,
                destination = %destination.display(),
                "removed leftover output"
            );
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(
                converter = id,
                destination = %destination.display(),
                error = %e,
                "failed to remove leftover output"
            );
        }
    }
}
