//! Single object conversion command

use std::path::Path;

use crate::config::ConversionConfig;
use crate::converter::{ConvertOutcome, convert_object};

pub fn execute(source: &Path, output: &Path, config: &ConversionConfig) -> anyhow::Result<()> {
    println!("Converting object: {}", source.display());

    if let ConvertOutcome::Written(files) = convert_object(source, output, config)? {
        for file in &files {
            println!("  {}", file.display());
        }
    }
    Ok(())
}
