//! Single zone conversion command

use std::path::Path;

use crate::cli::progress::simple_spinner;
use crate::config::ConversionConfig;
use crate::converter::{ConvertOutcome, convert_zone};
use crate::ids::IdAllocator;
use crate::zone::ZoneCatalog;

pub fn execute(source: &Path, output: &Path, config: &ConversionConfig, catalog: &ZoneCatalog) -> anyhow::Result<()> {
    println!("Converting zone: {}", source.display());
    println!("  Output: {}", output.display());

    let spinner = simple_spinner("Building world object...");
    let outcome = convert_zone(source, output, catalog, config, &IdAllocator::new(&config.ids));
    spinner.finish_and_clear();

    match outcome? {
        ConvertOutcome::Written(files) => {
            println!();
            println!("Wrote {} files:", files.len());
            for file in &files {
                println!("  {}", file.display());
            }
        }
        ConvertOutcome::Skipped(reason) => println!("Skipped: {reason}"),
    }
    Ok(())
}
