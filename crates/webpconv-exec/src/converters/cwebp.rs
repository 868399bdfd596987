//! The cwebp converter.

use std::path::Path;
use std::sync::Arc;

use webpconv_common::{paths::is_png, ConversionOptions, Converter, Error, Result};

use crate::command::build_cwebp;
use crate::runner::describe_exit_code;
use crate::{BinaryLocator, ProcessRunner};

/// Identifier of the cwebp converter.
pub const CWEBP_ID: &str = "cwebp";

/// Converts by running the `cwebp` encoder.
///
/// Candidates from the [`BinaryLocator`] are tried in order; the first one
/// that exits with code 0 wins.
#[derive(Debug)]
pub struct CwebpConverter {
    locator: BinaryLocator,
    runner: Arc<ProcessRunner>,
}

impl CwebpConverter {
    pub fn new(locator: BinaryLocator, runner: Arc<ProcessRunner>) -> Self {
        Self { locator, runner }
    }

    /// The locator used to find cwebp binaries.
    pub fn locator(&self) -> &BinaryLocator {
        &self.locator
    }
}

impl Converter for CwebpConverter {
    fn id(&self) -> &str {
        CWEBP_ID
    }

    fn convert(
        &self,
        source: &Path,
        destination: &Path,
        options: &ConversionOptions,
    ) -> Result<()> {
        if options.skip_pngs && is_png(source) {
            return Err(Error::declined(CWEBP_ID, "configured to skip PNG sources"));
        }

        let candidates = self.locator.locate(
            options.try_supplied_binary_for_os,
            options.try_common_system_paths,
        )?;

        if candidates.is_empty() {
            return Err(Error::not_operational(
                CWEBP_ID,
                "no cwebp binary found in the bundled directory or system paths",
            ));
        }

        let mut last_failure = String::new();
        for candidate in &candidates {
            let command = build_cwebp(&candidate.path, source, destination, options);

            match self.runner.run_to(&command, destination, options.use_nice) {
                Ok(out) if out.success() => {
                    tracing::debug!(binary = %candidate.path.display(), "cwebp succeeded");
                    return Ok(());
                }
                Ok(out) => {
                    last_failure = format!(
                        "{} {}: {}",
                        candidate.path.display(),
                        describe_exit_code(out.exit_code),
                        out.output.trim()
                    );
                }
                Err(e) => {
                    last_failure = format!("failed to execute {}: {e}", candidate.path.display());
                }
            }

            tracing::debug!(
                binary = %candidate.path.display(),
                failure = %last_failure,
                "cwebp candidate failed, trying next"
            );
        }

        Err(Error::failed(CWEBP_ID, last_failure))
    }
}
