//! World map object (`.wmo`) writers
//!
//! A world map object is one root file describing materials, groups, lights
//! and doodads, plus one file per render group holding the geometry.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

pub mod group;
pub mod root;

pub use group::{MOGP_HEADER_SIZE, WmoBatch, WmoGroup};
pub use root::{WmoDoodad, WmoDoodadSet, WmoFog, WmoGroupInfo, WmoLight, WmoMaterial, WmoRoot};

/// `MVER` value of root and group files.
pub const WMO_VERSION: u32 = 17;

/// Material flags (`MOMT`).
pub mod material_flags {
    pub const DISABLE_LIGHTING: u32 = 0x01;
    pub const DISABLE_FOG_SHADOW: u32 = 0x02;
    pub const UNCULLED: u32 = 0x04;
    pub const EXTERIOR_LIT: u32 = 0x08;
    pub const LIGHT_AT_NIGHT: u32 = 0x10;
    pub const IS_WINDOW: u32 = 0x20;
    pub const CLAMP_S: u32 = 0x40;
    pub const CLAMP_T: u32 = 0x80;
}

/// Group flags (`MOGI`, `MOGP`).
pub mod group_flags {
    pub const HAS_BSP_TREE: u32 = 0x1;
    pub const HAS_LIGHT_MAP: u32 = 0x2;
    pub const HAS_VERTEX_COLORS: u32 = 0x4;
    pub const EXTERIOR: u32 = 0x8;
    pub const EXTERIOR_LIT: u32 = 0x40;
    pub const HAS_LIGHTS: u32 = 0x200;
    pub const HAS_DOODADS: u32 = 0x800;
    pub const INDOORS: u32 = 0x2000;
}

/// Per-triangle flags (`MOPY`).
pub mod poly_flags {
    pub const NO_CAMERA_COLLIDE: u8 = 0x02;
    pub const DETAIL: u8 = 0x04;
    pub const COLLISION: u8 = 0x08;
    pub const RENDER: u8 = 0x20;
}

/// `MOPY` material id of collision-only triangles.
pub const NO_MATERIAL: u8 = 0xFF;

/// Block of NUL-terminated strings, each padded to a 4-byte boundary.
///
/// Used for `MOTX`, `MOGN` and `MODN`, whose entries are addressed by byte
/// offset from the start of the block.
#[derive(Debug, Default, Clone)]
pub struct StringBlock {
    data: Vec<u8>,
}

impl StringBlock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` and return its offset. Equal strings are stored once.
    pub fn push(&mut self, value: &str) -> u32 {
        if let Some(offset) = self.find(value) {
            return offset;
        }
        let offset = self.data.len() as u32;
        self.data.extend_from_slice(value.as_bytes());
        self.data.push(0);
        while self.data.len() % 4 != 0 {
            self.data.push(0);
        }
        offset
    }

    fn find(&self, value: &str) -> Option<u32> {
        let mut offset = 0;
        while offset < self.data.len() {
            let end = self.data[offset..].iter().position(|&b| b == 0)? + offset;
            if &self.data[offset..end] == value.as_bytes() && !value.is_empty() {
                return Some(offset as u32);
            }
            offset = (end + 1).next_multiple_of(4);
        }
        None
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
