//! Fixed-layout model records
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use bytemuck::{Pod, Zeroable};

use super::track::{TRACK_HEADER_SIZE, write_track};
use crate::common::{BoundingBox, Quat, TextureCoordinates, ToBytes, Vec3};
use crate::error::Result;
use crate::formats::offset::{OffsetBuilder, Section};
use crate::geometry::KeyframeTrack;
use crate::material::BlendMode;

/// Render flags of a model material.
pub mod material_flags {
    pub const UNLIT: u16 = 0x01;
    pub const UNFOGGED: u16 = 0x02;
    pub const TWO_SIDED: u16 = 0x04;
    pub const DEPTH_TEST: u16 = 0x08;
    pub const DEPTH_WRITE: u16 = 0x10;
}

/// Wrap flags of a model texture.
pub mod texture_flags {
    pub const WRAP_X: u32 = 0x1;
    pub const WRAP_Y: u32 = 0x2;
}

/// Name hash carried by the generated root bone.
pub const ROOT_BONE_NAME_CRC: u32 = 3391571450;

/// One model vertex.
///
/// Total size: 48 bytes
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct M2Vertex {
    pub position: [f32; 3],
    pub bone_weights: [u8; 4],
    pub bone_indices: [u8; 4],
    pub normal: [f32; 3],
    pub texture_coordinates: [[f32; 2]; 2],
}

impl M2Vertex {
    /// A vertex fully weighted to bone 0.
    #[must_use]
    pub fn new(position: Vec3, normal: Vec3, uv: TextureCoordinates) -> Self {
        Self {
            position: position.to_array(),
            bone_weights: [255, 0, 0, 0],
            bone_indices: [0; 4],
            normal: normal.to_array(),
            texture_coordinates: [[uv.u, uv.v], [0.0, 0.0]],
        }
    }
}

impl ToBytes for M2Vertex {
    const SIZE: usize = 48;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        // Little-endian regardless of host.
        for v in self.position {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.extend_from_slice(&self.bone_weights);
        out.extend_from_slice(&self.bone_indices);
        for v in self.normal {
            out.extend_from_slice(&v.to_le_bytes());
        }
        for uv in self.texture_coordinates {
            out.extend_from_slice(&uv[0].to_le_bytes());
            out.extend_from_slice(&uv[1].to_le_bytes());
        }
    }
}

/// Material record: render flags and blend mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct M2Material {
    pub flags: u16,
    pub blend_mode: BlendMode,
}

impl ToBytes for M2Material {
    const SIZE: usize = 4;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&(self.blend_mode as u16).to_le_bytes());
    }
}

/// Texture reference by client path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct M2Texture {
    /// 0 for a texture loaded from `path`.
    pub kind: u32,
    pub flags: u32,
    pub path: String,
}

/// Encoded size of a texture record.
pub const TEXTURE_RECORD_SIZE: usize = 16;

impl M2Texture {
    /// Append the path and return the 16-byte record.
    pub fn write(&self, builder: &mut OffsetBuilder) -> Result<Vec<u8>> {
        let path = builder.push_string(&self.path)?;
        let mut record = Section::with_capacity(TEXTURE_RECORD_SIZE);
        record.write_u32(self.kind);
        record.write_u32(self.flags);
        record.write(&path);
        Ok(record.into_bytes())
    }
}

/// Animation sequence with its bounds.
///
/// Total size: 64 bytes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct M2Sequence {
    pub id: u16,
    pub variation: u16,
    pub duration_ms: u32,
    pub move_speed: f32,
    pub flags: u32,
    pub frequency: i16,
    pub replay_min: u32,
    pub replay_max: u32,
    pub blend_time: u32,
    pub bounds: BoundingBox,
    pub bounds_radius: f32,
    pub variation_next: i16,
    pub alias_next: u16,
}

impl M2Sequence {
    /// Looping idle ("Stand") sequence.
    #[must_use]
    pub fn stand(duration_ms: u32, bounds: BoundingBox, bounds_radius: f32) -> Self {
        Self {
            id: 0,
            variation: 0,
            duration_ms,
            move_speed: 0.0,
            flags: 0x20,
            frequency: i16::MAX,
            replay_min: 0,
            replay_max: 0,
            blend_time: 150,
            bounds,
            bounds_radius,
            variation_next: -1,
            alias_next: 0,
        }
    }
}

impl ToBytes for M2Sequence {
    const SIZE: usize = 64;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        self.id.write_bytes(out);
        self.variation.write_bytes(out);
        self.duration_ms.write_bytes(out);
        self.move_speed.write_bytes(out);
        self.flags.write_bytes(out);
        self.frequency.write_bytes(out);
        0u16.write_bytes(out);
        self.replay_min.write_bytes(out);
        self.replay_max.write_bytes(out);
        self.blend_time.write_bytes(out);
        self.bounds.write_bytes(out);
        self.bounds_radius.write_bytes(out);
        self.variation_next.write_bytes(out);
        self.alias_next.write_bytes(out);
    }
}

/// Skeleton bone.
#[derive(Debug, Clone, PartialEq)]
pub struct M2Bone {
    pub key_bone_id: i32,
    pub flags: u32,
    pub parent: i16,
    pub submesh: u16,
    pub name_crc: u32,
    pub translation: KeyframeTrack<Vec3>,
    pub rotation: KeyframeTrack<Quat>,
    pub scale: KeyframeTrack<Vec3>,
    pub pivot: Vec3,
}

/// Encoded size of a bone record.
pub const BONE_RECORD_SIZE: usize = 4 + 4 + 2 + 2 + 4 + 3 * TRACK_HEADER_SIZE + 12;

impl M2Bone {
    /// Unanimated root bone at the origin.
    #[must_use]
    pub fn root() -> Self {
        Self {
            key_bone_id: -1,
            flags: 0,
            parent: -1,
            submesh: 0,
            name_crc: ROOT_BONE_NAME_CRC,
            translation: KeyframeTrack::new(None),
            rotation: KeyframeTrack::new(None),
            scale: KeyframeTrack::new(None),
            pivot: Vec3::ZERO,
        }
    }

    /// Append the track data and return the bone record.
    pub fn write(&self, builder: &mut OffsetBuilder) -> Result<Vec<u8>> {
        let translation = write_track(builder, &self.translation)?;
        let rotation = write_track(builder, &self.rotation)?;
        let scale = write_track(builder, &self.scale)?;

        let mut record = Section::with_capacity(BONE_RECORD_SIZE);
        record.write_i32(self.key_bone_id);
        record.write_u32(self.flags);
        record.write_i16(self.parent);
        record.write_u16(self.submesh);
        record.write_u32(self.name_crc);
        record.write_bytes(&translation);
        record.write_bytes(&rotation);
        record.write_bytes(&scale);
        record.write(&self.pivot);
        Ok(record.into_bytes())
    }
}

/// Texture coordinate animation.
#[derive(Debug, Clone, PartialEq)]
pub struct M2TextureTransform {
    pub translation: KeyframeTrack<Vec3>,
    pub rotation: KeyframeTrack<Quat>,
    pub scaling: KeyframeTrack<Vec3>,
}

/// Encoded size of a texture transform record.
pub const TEXTURE_TRANSFORM_RECORD_SIZE: usize = 3 * TRACK_HEADER_SIZE;

impl M2TextureTransform {
    /// Translation-only transform.
    #[must_use]
    pub fn translation(track: KeyframeTrack<Vec3>) -> Self {
        Self {
            translation: track,
            rotation: KeyframeTrack::new(None),
            scaling: KeyframeTrack::new(None),
        }
    }

    pub fn write(&self, builder: &mut OffsetBuilder) -> Result<Vec<u8>> {
        let mut record = write_track(builder, &self.translation)?;
        record.extend(write_track(builder, &self.rotation)?);
        record.extend(write_track(builder, &self.scaling)?);
        Ok(record)
    }
}
