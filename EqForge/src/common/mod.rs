//! Geometric primitives shared by the pipeline and the file writers
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

mod bounding_box;
mod color;
mod texture_coordinates;
mod triangle;

pub use bounding_box::BoundingBox;
pub use color::ColorRgba;
pub use glam::{Quat, Vec2, Vec3};
pub use texture_coordinates::TextureCoordinates;
pub use triangle::TriangleFace;

/// Fixed little-endian byte layout of a value type.
///
/// Every element written into an offset array goes through this trait, so
/// `SIZE` doubles as the per-element cost used when sizing headers.
pub trait ToBytes {
    /// Serialized size in bytes.
    const SIZE: usize;

    /// Append the little-endian encoding to `out`.
    fn write_bytes(&self, out: &mut Vec<u8>);

    /// Encode into a fresh buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::SIZE);
        self.write_bytes(&mut out);
        out
    }
}

impl ToBytes for Vec3 {
    const SIZE: usize = 12;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.x.to_le_bytes());
        out.extend_from_slice(&self.y.to_le_bytes());
        out.extend_from_slice(&self.z.to_le_bytes());
    }
}

impl ToBytes for Quat {
    const SIZE: usize = 16;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.x.to_le_bytes());
        out.extend_from_slice(&self.y.to_le_bytes());
        out.extend_from_slice(&self.z.to_le_bytes());
        out.extend_from_slice(&self.w.to_le_bytes());
    }
}

macro_rules! impl_to_bytes_le {
    ($($t:ty),*) => {
        $(
            impl ToBytes for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                fn write_bytes(&self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_to_bytes_le!(u8, i16, u16, i32, u32, f32);

impl ToBytes for [u16; 3] {
    const SIZE: usize = 6;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        for index in self {
            out.extend_from_slice(&index.to_le_bytes());
        }
    }
}

/// Encode a slice of elements back to back.
pub fn slice_to_bytes<T: ToBytes>(items: &[T]) -> Vec<u8> {
    let mut out = Vec::with_capacity(items.len() * T::SIZE);
    for item in items {
        item.write_bytes(&mut out);
    }
    out
}
