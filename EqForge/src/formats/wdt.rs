//! Map definition (`.wdt`) writer for maps made of one global world object
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use crate::common::{BoundingBox, Vec3};
use crate::error::Result;
use crate::formats::chunk::{ChunkWriter, tokens};
use crate::formats::offset::Section;

/// `MVER` value of map files.
pub const MAP_VERSION: u32 = 18;

/// `MPHD` flag: the map is a single global world object, no terrain tiles.
pub const GLOBAL_MAP_OBJECT: u32 = 0x1;

/// Tiles per side of the map grid.
pub const MAP_TILES: usize = 64;

/// Encoded size of a `MODF` placement.
pub const MODF_ENTRY_SIZE: usize = 64;

/// A map that places one world object at the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct WdtFile {
    /// Client path of the root `.wmo`.
    pub wmo_path: String,
    /// Bounds of the placed world object.
    pub bounds: BoundingBox,
}

impl WdtFile {
    #[must_use]
    pub fn new(wmo_path: impl Into<String>, bounds: BoundingBox) -> Self {
        Self {
            wmo_path: wmo_path.into(),
            bounds,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut header = Section::with_capacity(32);
        header.write_u32(GLOBAL_MAP_OBJECT);
        header.write_zeros(28);

        let mut path = self.wmo_path.clone().into_bytes();
        path.push(0);

        let mut writer = ChunkWriter::new();
        writer
            .version(MAP_VERSION)?
            .chunk(tokens::MPHD, &header.into_bytes())?
            .chunk(tokens::MAIN, &vec![0u8; MAP_TILES * MAP_TILES * 8])?
            .chunk(tokens::MWMO, &path)?
            .chunk(tokens::MODF, &self.placement())?;
        Ok(writer.finish())
    }

    fn placement(&self) -> Vec<u8> {
        let mut entry = Section::with_capacity(MODF_ENTRY_SIZE);
        entry.write_u32(0); // name id
        entry.write_i32(-1); // unique id
        entry.write(&Vec3::ZERO); // position
        entry.write(&Vec3::ZERO); // rotation
        entry.write(&self.bounds);
        entry.write_u16(0); // flags
        entry.write_u16(0); // doodad set
        entry.write_u16(0); // name set
        entry.write_u16(0);
        entry.into_bytes()
    }
}
