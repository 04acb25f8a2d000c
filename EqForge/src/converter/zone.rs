//! Zone conversion pipeline

use std::path::{Path, PathBuf};

use super::paths::{ZoneOutputPaths, model_output_paths};
use super::{ConvertOutcome, write_file};
use crate::config::ConversionConfig;
use crate::error::Result;
use crate::ids::IdAllocator;
use crate::input::{ZoneSource, light_instances_path};
use crate::zone::{ZoneCatalog, ZoneWorld, build_zone, read_light_instances};

/// Convert the zone document at `source_path` and write it below `output`.
///
/// Zones on a continent disabled in `config` are skipped.
pub fn convert_zone(
    source_path: &Path,
    output: &Path,
    catalog: &ZoneCatalog,
    config: &ConversionConfig,
    ids: &IdAllocator,
) -> Result<ConvertOutcome> {
    let source = ZoneSource::from_json_file(source_path)?;
    let properties = catalog.get(&source.short_name)?;
    if !properties.continent.is_enabled(config) {
        tracing::warn!(
            "Skipping zone '{}': {:?} content is disabled",
            source.short_name,
            properties.continent
        );
        return Ok(ConvertOutcome::Skipped(format!(
            "{:?} content is disabled",
            properties.continent
        )));
    }

    let lights = read_light_instances(&light_instances_path(source_path))?;
    let world = build_zone(&source, properties, &lights, config, ids)?;
    let written = write_zone(&world, output)?;
    tracing::info!("Wrote zone '{}' ({} files)", source.short_name, written.len());
    Ok(ConvertOutcome::Written(written))
}

/// Write every file of `world` below `output`, returning the paths written.
pub fn write_zone(world: &ZoneWorld, output: &Path) -> Result<Vec<PathBuf>> {
    let paths = ZoneOutputPaths::new(output, &world.record.short_name);
    let mut written = Vec::new();

    let (root, groups) = world.wmo_bytes()?;
    written.push(write_file(&paths.root_wmo(), &root)?);
    for (index, group) in groups.iter().enumerate() {
        written.push(write_file(&paths.group_wmo(index), group)?);
    }

    for object in &world.zone_objects {
        let (m2, skin) = object.to_bytes()?;
        let (m2_path, skin_path) = model_output_paths(&paths.zone_object_folder, &object.name);
        written.push(write_file(&m2_path, &m2)?);
        written.push(write_file(&skin_path, &skin)?);
    }

    written.push(write_file(&paths.wdt(), &world.wdt_bytes()?)?);
    written.push(write_file(&paths.wdl(), &world.wdl_bytes()?)?);
    written.push(write_file(
        &paths.triggers(),
        serde_json::to_string_pretty(&world.triggers)?.as_bytes(),
    )?);
    written.push(write_file(
        &paths.record(),
        serde_json::to_string_pretty(&world.record)?.as_bytes(),
    )?);
    Ok(written)
}
