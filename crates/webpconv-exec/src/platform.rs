//! Platform identification for bundled binary lookup.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating system name used to key the bundled binary table.
///
/// Values follow [`std::env::consts::OS`] (`linux`, `macos`, `windows`,
/// `freebsd`, `solaris`, ...). Names are lowercased however they are
/// constructed, including when read from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Platform(String);

impl Platform {
    /// Create a platform from an OS name. The name is lowercased.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().to_ascii_lowercase())
    }

    /// The platform this process is running on.
    pub fn current() -> Self {
        Self::new(std::env::consts::OS)
    }

    /// The OS name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Platform {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.0
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
