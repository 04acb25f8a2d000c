//! Batch conversion command

use std::path::Path;
use std::time::Instant;

use crate::cli::progress::{GEAR, LOOKING_GLASS, print_done, print_step, simple_bar};
use crate::config::ConversionConfig;
use crate::converter::{ConvertPhase, batch_convert};
use crate::zone::ZoneCatalog;

pub fn execute(
    input: &Path,
    output: &Path,
    config: &ConversionConfig,
    catalog: &ZoneCatalog,
    quiet: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();
    if !quiet {
        print_step(1, 2, LOOKING_GLASS, &format!("Scanning {}...", input.display()));
        print_step(2, 2, GEAR, "Converting zones and objects...");
    }

    let bar = simple_bar(0, "Converting");
    if quiet {
        bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }
    let result = batch_convert(input, output, catalog, config, |progress| {
        match progress.phase {
            ConvertPhase::Discovering | ConvertPhase::Complete => {}
            ConvertPhase::ConvertingZones | ConvertPhase::ConvertingObjects => {
                bar.set_length(progress.total as u64);
                bar.set_position(progress.current as u64);
                if let Some(ref name) = progress.current_file {
                    bar.set_message(format!("{}: {name}", progress.phase.as_str()));
                }
            }
        }
    });
    bar.finish_and_clear();

    if result.total() == 0 {
        println!("No zone or object documents found in: {}", input.display());
        return Ok(());
    }

    println!();
    println!("Conversion complete:");
    println!("  Success: {}", result.success_count);
    println!("  Skipped: {}", result.skip_count);
    println!("  Failed: {}", result.fail_count);

    if result.fail_count > 0 {
        println!();
        println!("Failures:");
        for msg in &result.failures {
            println!("  {msg}");
        }
    }
    if !quiet {
        print_done(started.elapsed());
    }

    result.into_result()?;
    Ok(())
}
