//! Per-zone properties and the catalog that holds them
//!
//! The catalog is a TOML document with one `[[zone]]` table per zone:
//!
//! ```toml
//! [[zone]]
//! short_name = "arena"
//! descriptive_name = "The Arena"
//! continent = "Antonica"
//! safe_position = [460.9, -41.4, -7.38]
//! fog = { color = [100, 100, 100], min_clip = 10, max_clip = 1500 }
//!
//! [[zone.zone_lines]]
//! target_zone = "lakerathe"
//! target_position = [2345.1172, 2692.0679, 92.193184]
//! target_orientation = "East"
//! box_top_northwest = [-44.28722, -845.03625, 45.75025]
//! box_bottom_southeast = [-74.66106, -871.419, 7.0403852]
//! ```
//!
//! All positions are in source units; scaling happens when triggers are built.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::f32::consts::PI;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::common::{ColorRgba, Vec3};
use crate::config::ConversionConfig;
use crate::error::{Error, Result};

const BUILTIN_CATALOG: &str = include_str!("../../data/zones.toml");

/// Landmass a zone belongs to; selects the loading screen and expansion toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Continent {
    #[default]
    Antonica,
    Faydwer,
    Odus,
    Kunark,
    Velious,
    Development,
}

impl Continent {
    /// Offset from the first loading-screen id.
    #[must_use]
    pub const fn loading_screen_offset(self) -> u32 {
        match self {
            Self::Antonica | Self::Faydwer | Self::Odus | Self::Development => 0,
            Self::Kunark => 1,
            Self::Velious => 2,
        }
    }

    /// Whether zones of this continent are converted under `config`.
    #[must_use]
    pub fn is_enabled(self, config: &ConversionConfig) -> bool {
        match self {
            Self::Kunark => config.include_kunark,
            Self::Velious => config.include_velious,
            _ => true,
        }
    }
}

/// Facing of a player arriving through a zone line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineOrientation {
    #[default]
    North,
    South,
    West,
    East,
}

impl LineOrientation {
    /// Orientation in radians.
    #[must_use]
    pub const fn radians(self) -> f32 {
        match self {
            Self::North => 0.0,
            Self::South => PI,
            Self::West => PI * 0.5,
            Self::East => PI * 1.5,
        }
    }
}

/// Distance fog of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FogProperties {
    /// RGB, 0-255.
    pub color: [u8; 3],
    pub min_clip: f32,
    pub max_clip: f32,
}

impl FogProperties {
    #[must_use]
    pub fn color_rgba(&self) -> ColorRgba {
        let [r, g, b] = self.color;
        ColorRgba::new(r, g, b, 255)
    }
}

/// An axis-aligned box that moves the player into another zone.
///
/// The box is given by its top north-west and bottom south-east corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneLineBox {
    pub target_zone: String,
    pub target_position: Vec3,
    #[serde(default)]
    pub target_orientation: LineOrientation,
    pub box_top_northwest: Vec3,
    pub box_bottom_southeast: Vec3,
}

/// Static configuration of one zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneProperties {
    pub short_name: String,
    #[serde(default)]
    pub descriptive_name: String,
    #[serde(default)]
    pub continent: Continent,
    #[serde(default)]
    pub safe_position: Vec3,
    #[serde(default)]
    pub safe_orientation: f32,
    #[serde(default = "default_show_sky")]
    pub show_sky: bool,
    #[serde(default)]
    pub fog: Option<FogProperties>,
    /// Material names that must share render groups, bucketed before the
    /// remaining static materials.
    #[serde(default)]
    pub material_groups: Vec<Vec<String>>,
    #[serde(default)]
    pub zone_lines: Vec<ZoneLineBox>,
}

fn default_show_sky() -> bool {
    true
}

impl ZoneProperties {
    /// Properties with nothing but a name.
    pub fn new(short_name: impl Into<String>) -> Self {
        let short_name = short_name.into();
        Self {
            descriptive_name: short_name.clone(),
            short_name,
            continent: Continent::default(),
            safe_position: Vec3::ZERO,
            safe_orientation: 0.0,
            show_sky: true,
            fog: None,
            material_groups: Vec::new(),
            zone_lines: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    zone: Vec<ZoneProperties>,
}

/// Read-only zone lookup keyed by short name.
#[derive(Debug, Clone, Default)]
pub struct ZoneCatalog {
    zones: IndexMap<String, ZoneProperties>,
}

impl ZoneCatalog {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(text)?;
        let zones = file
            .zone
            .into_iter()
            .map(|zone| (zone.short_name.to_lowercase(), zone))
            .collect();
        Ok(Self { zones })
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Properties of `short_name` (case-insensitive).
    pub fn get(&self, short_name: &str) -> Result<&ZoneProperties> {
        self.zones
            .get(&short_name.to_lowercase())
            .ok_or_else(|| Error::ZonePropertiesNotFound(short_name.to_string()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ZoneProperties> {
        self.zones.values()
    }
}
