use clap::{Parser, Subcommand};
use std::path::PathBuf;
use webpconv::Metadata;

#[derive(Parser)]
#[command(name = "webpconv")]
#[command(author, version, about = "Convert JPEG and PNG images to WebP")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert an image to WebP, trying each converter in turn
    Convert {
        /// JPEG or PNG file to convert
        #[arg(required = true)]
        source: PathBuf,

        /// Where to write the WebP file
        #[arg(required = true)]
        destination: PathBuf,

        /// Converter to try (repeatable, in priority order; replaces the configured list)
        #[arg(short = 'C', long = "converter")]
        converters: Vec<String>,

        /// Encoding quality (0-100)
        #[arg(short, long)]
        quality: Option<i64>,

        /// Metadata to keep: all, none, exif, icc or xmp
        #[arg(long)]
        metadata: Option<Metadata>,

        /// Encoder effort (0-6)
        #[arg(short, long)]
        method: Option<i64>,

        /// Reduce encoder memory usage
        #[arg(long)]
        low_memory: bool,

        /// Decline PNG sources
        #[arg(long)]
        skip_pngs: bool,

        /// Do not lower encoder scheduling priority
        #[arg(long)]
        no_nice: bool,
    },

    /// Show which converters are operational
    CheckTools {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        #[arg(value_name = "CONFIG")]
        file: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
