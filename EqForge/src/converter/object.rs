//! Static object conversion pipeline

use std::path::{Path, PathBuf};

use super::paths::{model_output_paths, static_object_folder, static_object_output_folder};
use super::{ConvertOutcome, write_file};
use crate::config::ConversionConfig;
use crate::error::Result;
use crate::input::ObjectSource;
use crate::object::{ModelObject, ModelObjectOptions, ModelSource, build_model_object};

/// Build the model of a static object.
pub fn build_static_object(source: &ObjectSource, config: &ConversionConfig) -> Result<ModelObject> {
    let options = ModelObjectOptions::from_config(config, static_object_folder());
    build_model_object(
        &ModelSource {
            name: &source.name,
            materials: &source.materials,
            mesh: &source.mesh,
            collision: source.collision.as_ref(),
        },
        &options,
    )
}

/// Convert the object document at `source_path` and write it below `output`.
pub fn convert_object(source_path: &Path, output: &Path, config: &ConversionConfig) -> Result<ConvertOutcome> {
    let source = ObjectSource::from_json_file(source_path)?;
    tracing::info!("Converting object '{}'", source.name);
    let object = build_static_object(&source, config)?;
    let written = write_model(&object, &static_object_output_folder(output))?;
    Ok(ConvertOutcome::Written(written))
}

/// Write `object` as `<name>.m2` and `<name>00.skin` inside `folder`.
pub fn write_model(object: &ModelObject, folder: &Path) -> Result<Vec<PathBuf>> {
    let (m2, skin) = object.to_bytes()?;
    let (m2_path, skin_path) = model_output_paths(folder, &object.name);
    Ok(vec![write_file(&m2_path, &m2)?, write_file(&skin_path, &skin)?])
}
