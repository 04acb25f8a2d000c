//! Resolved conversion configuration
//!
//! Loaded from a TOML file; every field has a default so a partial file (or
//! no file at all) is valid.
//!
//! ```toml
//! world_scale = 0.25
//! max_faces_per_group = 21000
//! include_velious = false
//!
//! [ids]
//! wmo_id_start = 7000
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// First values handed out by the identifier allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdStarts {
    pub wmo_id_start: u32,
    pub area_id_start: u32,
    pub map_id_start: u32,
    pub loading_screen_id_start: u32,
    pub wmo_group_id_start: u32,
}

impl Default for IdStarts {
    fn default() -> Self {
        Self {
            wmo_id_start: 7000,
            area_id_start: 5100,
            map_id_start: 750,
            loading_screen_id_start: 255,
            wmo_group_id_start: 30000,
        }
    }
}

/// Settings for one conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Source units to destination units.
    pub world_scale: f32,
    /// Triangle cap per world-object group.
    pub max_faces_per_group: usize,
    /// Padding applied to zone and group bounding boxes.
    pub added_boundary_amount: f32,
    /// Padding floor for model bounding boxes.
    pub static_object_min_bounding_box_size: f32,
    /// How far each half of a spatial split reaches across the cut.
    pub seam_overlap: f32,
    /// Apply the source-to-destination coordinate conversion.
    pub apply_coordinate_transform: bool,
    pub include_kunark: bool,
    pub include_velious: bool,
    pub ids: IdStarts,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            world_scale: 0.25,
            max_faces_per_group: 21000,
            added_boundary_amount: 1.0,
            static_object_min_bounding_box_size: 0.5,
            seam_overlap: 0.5,
            apply_coordinate_transform: true,
            include_kunark: true,
            include_velious: true,
            ids: IdStarts::default(),
        }
    }
}

impl ConversionConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!("Loading conversion config from {}", path.as_ref().display());
        Self::from_toml_str(&text)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.world_scale.is_finite() && self.world_scale > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "world_scale must be positive, got {}",
                self.world_scale
            )));
        }
        if self.max_faces_per_group == 0 {
            return Err(Error::InvalidConfig(
                "max_faces_per_group must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("added_boundary_amount", self.added_boundary_amount),
            ("static_object_min_bounding_box_size", self.static_object_min_bounding_box_size),
            ("seam_overlap", self.seam_overlap),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be zero or positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}
