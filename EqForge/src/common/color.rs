//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use super::ToBytes;

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColorRgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ColorRgba {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build an opaque color from unit-range float channels, clamping out-of-range input.
    #[must_use]
    pub fn from_unit_rgb(r: f32, g: f32, b: f32) -> Self {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(channel(r), channel(g), channel(b), 255)
    }

    /// Client byte order for WMO colors (`CImVector`): B, G, R, A.
    pub fn write_bgra(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&[self.b, self.g, self.r, self.a]);
    }
}

impl ToBytes for ColorRgba {
    const SIZE: usize = 4;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&[self.r, self.g, self.b, self.a]);
    }
}
