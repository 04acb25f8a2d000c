//! Low-detail map (`.wdl`) writer
//!
//! Maps made of a single world object have no terrain tiles, so every
//! section is empty and every tile offset in `MAOF` is zero.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use super::wdt::{MAP_TILES, MAP_VERSION};
use crate::error::Result;
use crate::formats::chunk::{ChunkWriter, tokens};

/// Serialize the low-detail map of a tile-less map.
pub fn empty_wdl() -> Result<Vec<u8>> {
    let mut writer = ChunkWriter::new();
    writer
        .version(MAP_VERSION)?
        .chunk(tokens::MWMO, &[])?
        .chunk(tokens::MWID, &[])?
        .chunk(tokens::MODF, &[])?
        .chunk(tokens::MAOF, &vec![0u8; MAP_TILES * MAP_TILES * 4])?;
    Ok(writer.finish())
}
