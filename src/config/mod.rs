mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

use webpconv_exec::converters::{CWEBP_ID, IMAGEMAGICK_ID};

use crate::converters::NATIVE_ID;

/// Converter identifiers known to the built-in registry.
const KNOWN_CONVERTERS: &[&str] = &[CWEBP_ID, IMAGEMAGICK_ID, NATIVE_ID];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config = parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./webpconv.toml",
        "~/.config/webpconv/config.toml",
        "/etc/webpconv/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.converters.is_empty() {
        anyhow::bail!("At least one converter must be configured");
    }

    // Unknown converters are skipped at conversion time, so only warn
    for spec in &config.converters {
        if !KNOWN_CONVERTERS.contains(&spec.id()) {
            tracing::warn!("Unknown converter '{}' will be skipped", spec.id());
        }
    }

    for entry in &config.cwebp.bundled {
        let valid = entry.sha256.len() == 64 && entry.sha256.chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            anyhow::bail!(
                "Bundled binary '{}' for {} has a malformed sha256 (expected 64 hex characters)",
                entry.file_name,
                entry.platform
            );
        }
    }

    Ok(())
}
