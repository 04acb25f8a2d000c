//! Source documents
//!
//! The upstream asset stage emits one JSON document per zone and per static
//! object. Zones live at `zones/<short_name>/zone.json` with an optional
//! `lights.txt` next to them; objects live at `objects/<name>.json`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::{ColorRgba, Vec3};
use crate::error::Result;
use crate::material::Material;
use crate::mesh::MeshData;

/// File name of a zone document inside its zone folder.
pub const ZONE_SOURCE_FILE: &str = "zone.json";

/// File name of the light list inside a zone folder.
pub const LIGHT_INSTANCES_FILE: &str = "lights.txt";

/// A placed static object inside a zone, in source coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectInstance {
    /// Name of the static object; resolves to `<name>.m2`.
    pub model_name: String,
    pub position: Vec3,
    /// Euler rotation in degrees.
    #[serde(default)]
    pub rotation: Vec3,
    /// Uniform scale.
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_scale() -> f32 {
    1.0
}

/// One zone as produced by the asset stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSource {
    pub short_name: String,
    #[serde(default)]
    pub ambient_light: ColorRgba,
    pub materials: Vec<Material>,
    pub mesh: MeshData,
    #[serde(default)]
    pub object_instances: Vec<ObjectInstance>,
}

impl ZoneSource {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }
}

/// One static object as produced by the asset stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSource {
    pub name: String,
    pub materials: Vec<Material>,
    pub mesh: MeshData,
    /// Simplified collision geometry, absent for walk-through objects.
    #[serde(default)]
    pub collision: Option<MeshData>,
}

impl ObjectSource {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }
}

/// Path of the light list that belongs to the zone document at `zone_source`.
#[must_use]
pub fn light_instances_path(zone_source: &Path) -> PathBuf {
    zone_source.with_file_name(LIGHT_INSTANCES_FILE)
}
