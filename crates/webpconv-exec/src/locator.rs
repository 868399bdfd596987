//! Executable discovery for external encoders.
//!
//! A [`BinaryLocator`] resolves an ordered list of [`BinaryCandidate`]s: the
//! bundled binary for the configured [`Platform`] first (only after its
//! SHA-256 matches the pinned value), then whichever conventional system
//! paths exist.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use webpconv_common::{Error, Result};

use crate::Platform;

/// Conventional install locations for cwebp, in priority order.
pub const CWEBP_SYSTEM_PATHS: &[&str] = &[
    "/usr/bin/cwebp",
    "/usr/local/bin/cwebp",
    "/usr/gnu/bin/cwebp",
    "/usr/syno/bin/cwebp",
];

/// Directory (relative to the working directory) holding bundled binaries.
const DEFAULT_BUNDLED_DIR: &str = "binaries";

/// One row of the platform table: the binary shipped for a platform and the
/// checksum it must have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundledBinary {
    /// Platform the binary was built for.
    pub platform: Platform,
    /// File name inside the bundled directory.
    pub file_name: String,
    /// Pinned SHA-256 of the file, hex encoded.
    pub sha256: String,
}

/// How a candidate was vetted before being offered for execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verification {
    /// Bundled binary whose content hash matched the pinned value.
    Checksum,
    /// Pre-existing system binary; trusted because the operator controls it.
    Unverified,
}

/// An executable that may be tried, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinaryCandidate {
    pub path: PathBuf,
    pub verification: Verification,
}

/// Resolves usable executables for one encoder binary.
#[derive(Debug, Clone)]
pub struct BinaryLocator {
    binary: String,
    platform: Platform,
    bundled_dir: PathBuf,
    bundled: Vec<BundledBinary>,
    system_paths: Vec<PathBuf>,
    search_path: bool,
}

impl BinaryLocator {
    /// Create a locator for `binary` on `platform` with an empty platform
    /// table and no system paths.
    pub fn new(binary: impl Into<String>, platform: Platform) -> Self {
        Self {
            binary: binary.into(),
            platform,
            bundled_dir: PathBuf::from(DEFAULT_BUNDLED_DIR),
            bundled: Vec::new(),
            system_paths: Vec::new(),
            search_path: false,
        }
    }

    /// Locator for cwebp with the conventional system paths and `PATH` lookup.
    pub fn cwebp(platform: Platform) -> Self {
        Self::new("cwebp", platform)
            .with_system_paths(CWEBP_SYSTEM_PATHS.iter().map(PathBuf::from))
            .with_path_search(true)
    }

    /// Set the directory bundled binaries are read from.
    pub fn with_bundled_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bundled_dir = dir.into();
        self
    }

    /// Replace the platform table.
    pub fn with_bundled(mut self, table: Vec<BundledBinary>) -> Self {
        self.bundled = table;
        self
    }

    /// Replace the system search paths. Order is priority order.
    pub fn with_system_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.system_paths = paths.into_iter().collect();
        self
    }

    /// Also consult `PATH` after the fixed system paths.
    pub fn with_path_search(mut self, enabled: bool) -> Self {
        self.search_path = enabled;
        self
    }

    /// Name of the binary this locator resolves.
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Platform the bundled table is consulted for.
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Resolve the ordered candidate list.
    ///
    /// An empty list is a normal result. When `try_supplied` is set and a
    /// platform table is configured, a missing table entry, a missing bundled
    /// file or a checksum mismatch fails the whole call with
    /// [`Error::NotOperational`]; system paths are not consulted as a
    /// fallback in that case. An empty table ships no binaries, so the
    /// bundled lookup is skipped.
    pub fn locate(&self, try_supplied: bool, try_system: bool) -> Result<Vec<BinaryCandidate>> {
        let mut candidates = Vec::new();

        if try_supplied {
            if self.bundled.is_empty() {
                tracing::debug!(binary = %self.binary, "no bundled binaries configured");
            } else {
                candidates.push(self.bundled_candidate()?);
            }
        }

        if try_system {
            for candidate in self.system_candidates() {
                if !candidates.iter().any(|c| c.path == candidate.path) {
                    candidates.push(candidate);
                }
            }
        }

        tracing::debug!(
            binary = %self.binary,
            platform = %self.platform,
            count = candidates.len(),
            "located binary candidates"
        );

        Ok(candidates)
    }

    /// Resolve and verify the bundled binary for this platform.
    pub fn bundled_candidate(&self) -> Result<BinaryCandidate> {
        let entry = self
            .bundled
            .iter()
            .find(|b| b.platform == self.platform)
            .ok_or_else(|| {
                Error::not_operational(
                    &self.binary,
                    format!("no bundled binary for platform '{}'", self.platform),
                )
            })?;

        let path = self.bundled_dir.join(&entry.file_name);
        if !path.is_file() {
            return Err(Error::not_operational(
                &self.binary,
                format!("bundled binary is missing: {}", path.display()),
            ));
        }

        let expected = hex::decode(entry.sha256.trim()).map_err(|_| {
            Error::not_operational(
                &self.binary,
                format!("pinned checksum for {} is not valid hex", entry.file_name),
            )
        })?;

        let actual = sha256_file(&path).map_err(|e| {
            Error::not_operational(
                &self.binary,
                format!("failed to hash {}: {e}", path.display()),
            )
        })?;

        if actual.as_slice() != expected.as_slice() {
            return Err(Error::not_operational(
                &self.binary,
                format!("checksum mismatch for bundled binary {}", path.display()),
            ));
        }

        Ok(BinaryCandidate {
            path,
            verification: Verification::Checksum,
        })
    }

    /// System binaries that currently exist, in configured order.
    pub fn system_candidates(&self) -> Vec<BinaryCandidate> {
        let mut found: Vec<PathBuf> = self
            .system_paths
            .iter()
            .filter(|p| p.is_file())
            .cloned()
            .collect();

        if self.search_path {
            if let Ok(path) = which::which(&self.binary) {
                if !found.contains(&path) {
                    found.push(path);
                }
            }
        }

        found
            .into_iter()
            .map(|path| BinaryCandidate {
                path,
                verification: Verification::Unverified,
            })
            .collect()
    }
}

/// Compute the SHA-256 digest of a file's contents.
pub fn sha256_file(path: &Path) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize().to_vec())
}
