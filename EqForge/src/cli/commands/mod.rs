//! Command definitions

pub mod convert;
mod execute;
pub mod inspect;
pub mod object;
pub mod zone;

use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::config::ConversionConfig;
use crate::zone::ZoneCatalog;

#[derive(Subcommand)]
pub enum Commands {
    /// Convert every zone and object below an input folder
    Convert {
        /// Input folder holding `zones/` and `objects/`
        input: PathBuf,

        /// Output root
        output: PathBuf,

        /// Conversion settings (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Zone properties catalog (TOML); the built-in catalog when omitted
        #[arg(short, long)]
        zones: Option<PathBuf>,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Convert a single zone document
    Zone {
        /// Zone document (`zone.json`)
        source: PathBuf,

        /// Output root
        output: PathBuf,

        /// Conversion settings (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Zone properties catalog (TOML); the built-in catalog when omitted
        #[arg(short, long)]
        zones: Option<PathBuf>,
    },

    /// Convert a single static object document
    Object {
        /// Object document (`<name>.json`)
        source: PathBuf,

        /// Output root
        output: PathBuf,

        /// Conversion settings (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the chunks of a WMO/WDT/WDL file or summarize an M2 header
    Inspect {
        /// File to inspect
        file: PathBuf,
    },
}

/// Load settings from `path`, or the defaults.
fn load_config(path: Option<&Path>) -> anyhow::Result<ConversionConfig> {
    match path {
        Some(path) => Ok(ConversionConfig::from_toml_file(path)?),
        None => Ok(ConversionConfig::default()),
    }
}

/// Load the zone catalog from `path`, or the built-in one.
fn load_catalog(path: Option<&Path>) -> anyhow::Result<ZoneCatalog> {
    match path {
        Some(path) => Ok(ZoneCatalog::from_toml_file(path)?),
        None => Ok(ZoneCatalog::builtin()?),
    }
}
