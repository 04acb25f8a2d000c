//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use super::ToBytes;

/// A (u, v) texture coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TextureCoordinates {
    pub u: f32,
    pub v: f32,
}

impl TextureCoordinates {
    #[must_use]
    pub const fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }

    /// True when either component lies outside `[-1, 1]`, i.e. the surface tiles.
    #[must_use]
    pub fn has_oversized_coordinates(&self) -> bool {
        self.u - f32::EPSILON > 1.0
            || self.u + f32::EPSILON < -1.0
            || self.v - f32::EPSILON > 1.0
            || self.v + f32::EPSILON < -1.0
    }

    /// Same coordinate with V mirrored (the destination samples textures upside down).
    #[must_use]
    pub fn with_flipped_v(self) -> Self {
        Self::new(self.u, -self.v)
    }
}

impl ToBytes for TextureCoordinates {
    const SIZE: usize = 8;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.u.to_le_bytes());
        out.extend_from_slice(&self.v.to_le_bytes());
    }
}
