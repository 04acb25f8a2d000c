//! # EqForge
//!
//! A pure-Rust converter from exported EverQuest zone and object geometry to
//! the World of Warcraft 3.3.5 client formats.
//!
//! ## Supported Outputs
//!
//! - **WMO** - zone world objects (root + groups), split into spatial groups
//! - **M2/.skin** - static objects and animated zone materials as models
//! - **WDT/WDL** - WMO-only map definitions
//! - **JSON** - zone line area triggers and the allocated zone record
//!
//! ## Quick Start
//!
//! ### Converting a Folder
//!
//! ```no_run
//! use std::path::Path;
//! use eqforge::prelude::*;
//!
//! let config = ConversionConfig::default();
//! let catalog = ZoneCatalog::builtin()?;
//! let result = batch_convert(Path::new("export/"), Path::new("out/"), &catalog, &config, |_| {});
//! println!("{} converted, {} failed", result.success_count, result.fail_count);
//! # Ok::<(), eqforge::Error>(())
//! ```
//!
//! ### Converting One Zone
//!
//! ```no_run
//! use std::path::Path;
//! use eqforge::prelude::*;
//!
//! let config = ConversionConfig::default();
//! let catalog = ZoneCatalog::builtin()?;
//! let ids = IdAllocator::new(&config.ids);
//! convert_zone(Path::new("export/zones/qeynos/zone.json"), Path::new("out/"), &catalog, &config, &ids)?;
//! # Ok::<(), eqforge::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `eqforge` command-line binary
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

pub mod common;
pub mod config;
pub mod converter;
pub mod error;
pub mod formats;
pub mod geometry;
pub mod ids;
pub mod input;
pub mod material;
pub mod mesh;
pub mod object;
pub mod zone;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::common::{BoundingBox, ColorRgba, Quat, TextureCoordinates, TriangleFace, Vec2, Vec3};
    pub use crate::config::{ConversionConfig, IdStarts};
    pub use crate::error::{Error, Result};
    pub use crate::ids::{IdAllocator, ZoneIds};
    pub use crate::input::{ObjectInstance, ObjectSource, ZoneSource};
    pub use crate::material::{BlendMode, Material, MaterialAnimation, MaterialKind};
    pub use crate::mesh::MeshData;

    // Geometry processing
    pub use crate::geometry::{
        AnimationExpansion, PartitionOptions, PartitionedGroup, TransparencyTrack, expand_animated_materials,
        partition_mesh,
    };

    // Zone and object assembly
    pub use crate::object::{ModelObject, ModelObjectOptions, ModelSource, build_model_object};
    pub use crate::zone::{
        AreaTrigger, Continent, ZoneCatalog, ZoneProperties, ZoneRecord, ZoneWorld, area_triggers, build_zone,
    };

    // File writers
    pub use crate::formats::{
        Chunk, FourCC, M2Model, M2Skin, WdtFile, WmoGroup, WmoRoot, empty_wdl, read_chunk, read_chunks,
    };

    // Conversion drivers
    pub use crate::converter::{
        BatchConvertResult, ConvertOutcome, ConvertPhase, ConvertProgress, batch_convert, convert_object,
        convert_zone, write_model, write_zone,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
