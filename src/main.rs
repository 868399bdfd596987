mod cli;

use webpconv::config::{self, Config};
use webpconv::converters::NATIVE_ID;
use webpconv::{ConverterRegistry, ConverterSpec, FallbackOrchestrator};
use webpconv_exec::converters::{CWEBP_ID, IMAGEMAGICK_ID};
use webpconv_exec::{BinaryCandidate, ImageMagickConverter, ProcessRunner};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "webpconv=trace,webpconv_exec=trace,webpconv_common=debug".to_string()
        } else {
            "webpconv=info,webpconv_exec=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            source,
            destination,
            converters,
            quality,
            metadata,
            method,
            low_memory,
            skip_pngs,
            no_nice,
        } => {
            let mut config = config::load_config_or_default(cli.config.as_deref())?;

            if !converters.is_empty() {
                config.converters = converters.into_iter().map(ConverterSpec::from).collect();
            }
            if let Some(quality) = quality {
                config.options.quality = quality;
            }
            if let Some(metadata) = metadata {
                config.options.metadata = metadata;
            }
            if let Some(method) = method {
                config.options.method = method;
            }
            config.options.low_memory |= low_memory;
            config.options.skip_pngs |= skip_pngs;
            if no_nice {
                config.options.use_nice = false;
            }

            convert_file(&source, &destination, &config)
        }
        Commands::CheckTools { json } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            check_tools(&config, json)
        }
        Commands::Validate { file } => {
            let path = file.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("webpconv {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn convert_file(source: &Path, destination: &Path, config: &Config) -> Result<()> {
    let registry = ConverterRegistry::from_config(config);
    let orchestrator = FallbackOrchestrator::new(&registry, &config.converters);

    if orchestrator.is_empty() {
        anyhow::bail!("None of the configured converters is known");
    }

    tracing::debug!(converters = ?orchestrator.converter_ids(), "converter chain");

    match orchestrator.convert_detailed(source, destination, &config.options)? {
        Some(converter) => {
            println!(
                "Converted {} -> {} ({})",
                source.display(),
                destination.display(),
                converter
            );
            Ok(())
        }
        None => anyhow::bail!(
            "No operational converter available for {}",
            source.display()
        ),
    }
}

#[derive(Debug, Serialize)]
struct ToolStatus {
    converter: String,
    available: bool,
    detail: Option<String>,
    binaries: Vec<BinaryCandidate>,
}

fn check_tools(config: &Config, json: bool) -> Result<()> {
    let options = &config.options;
    let mut statuses = Vec::new();

    let cwebp = match config.cwebp.locator().locate(
        options.try_supplied_binary_for_os,
        options.try_common_system_paths,
    ) {
        Ok(binaries) => ToolStatus {
            converter: CWEBP_ID.to_string(),
            available: !binaries.is_empty(),
            detail: binaries.is_empty().then(|| "no cwebp binary found".to_string()),
            binaries,
        },
        Err(e) => ToolStatus {
            converter: CWEBP_ID.to_string(),
            available: false,
            detail: Some(e.to_string()),
            binaries: Vec::new(),
        },
    };
    statuses.push(cwebp);

    let magick = ImageMagickConverter::new(
        config.imagemagick.path.clone(),
        Arc::new(ProcessRunner::without_nice()),
    );
    statuses.push(match magick.binary() {
        Ok(path) => ToolStatus {
            converter: IMAGEMAGICK_ID.to_string(),
            available: true,
            detail: Some(path.display().to_string()),
            binaries: Vec::new(),
        },
        Err(e) => ToolStatus {
            converter: IMAGEMAGICK_ID.to_string(),
            available: false,
            detail: Some(e.to_string()),
            binaries: Vec::new(),
        },
    });

    statuses.push(ToolStatus {
        converter: NATIVE_ID.to_string(),
        available: true,
        detail: Some("built in (lossless PNG only)".to_string()),
        binaries: Vec::new(),
    });

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    println!("Checking converters...\n");
    for status in &statuses {
        let mark = if status.available { "✓" } else { "✗" };
        print!("{} {}", mark, status.converter);
        if let Some(ref detail) = status.detail {
            print!(" - {}", detail);
        }
        println!();
        for binary in &status.binaries {
            println!("    {} ({:?})", binary.path.display(), binary.verification);
        }
    }

    println!();
    if statuses.iter().any(|s| s.available && s.converter != NATIVE_ID) {
        println!("At least one external encoder is available.");
    } else {
        println!("Only the built-in converter is available; JPEG sources will not convert.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_summary(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            print_summary(&Config::default());
        }
    }

    Ok(())
}

fn print_summary(config: &Config) {
    let ids: Vec<&str> = config.converters.iter().map(|c| c.id()).collect();
    println!("  Converters: {}", ids.join(", "));
    println!("  Quality: {}", config.options.quality);
    println!("  Metadata: {}", config.options.metadata);
    println!("  Method: {}", config.options.method);
    println!("  Bundled cwebp entries: {}", config.cwebp.bundled.len());
    println!("  cwebp system paths: {}", config.cwebp.system_paths.len());
}
