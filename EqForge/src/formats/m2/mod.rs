//! Model (`.m2`) writer
//!
//! An M2 file is a single fixed-size header of counts and `(count, offset)`
//! arrays followed by a data region. The header layout depends on the global
//! flags: [`flags::BLEND_MODE_OVERRIDES`] appends one more array, so the size
//! is computed from [`HEADER_FIELDS`] before any data is laid out.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

pub mod skin;
mod track;
mod types;

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

pub use skin::{M2Skin, SkinBatch, SkinSubmesh};
pub use track::{TRACK_HEADER_SIZE, write_track};
pub use types::{
    BONE_RECORD_SIZE, M2Bone, M2Material, M2Sequence, M2Texture, M2TextureTransform, M2Vertex,
    ROOT_BONE_NAME_CRC, TEXTURE_RECORD_SIZE, TEXTURE_TRANSFORM_RECORD_SIZE, material_flags, texture_flags,
};

use crate::common::{BoundingBox, Vec3};
use crate::error::{Error, Result};
use crate::formats::offset::{OffsetArray, OffsetBuilder, Section};
use crate::geometry::TransparencyTrack;

/// File magic.
pub const MAGIC: [u8; 4] = *b"MD20";

/// Format version read by the 3.3.5 client.
pub const VERSION: u32 = 264;

/// Alignment of arrays in the data region.
const DATA_ALIGNMENT: usize = 16;

/// Global model flags.
pub mod flags {
    pub const TILT_X: u32 = 0x1;
    pub const TILT_Y: u32 = 0x2;
    /// Adds the blend-mode override array to the header.
    pub const BLEND_MODE_OVERRIDES: u32 = 0x8;
}

/// Header fields in file order with their encoded size.
pub const HEADER_FIELDS: &[(&str, usize)] = &[
    ("magic", 4),
    ("version", 4),
    ("name", 8),
    ("global_flags", 4),
    ("global_loops", 8),
    ("sequences", 8),
    ("sequence_lookup", 8),
    ("bones", 8),
    ("key_bone_lookup", 8),
    ("vertices", 8),
    ("skin_profile_count", 4),
    ("colors", 8),
    ("textures", 8),
    ("texture_weights", 8),
    ("texture_transforms", 8),
    ("replaceable_texture_lookup", 8),
    ("materials", 8),
    ("bone_lookup", 8),
    ("texture_lookup", 8),
    ("texture_unit_lookup", 8),
    ("transparency_lookup", 8),
    ("texture_transform_lookup", 8),
    ("bounding_box", 24),
    ("bounding_radius", 4),
    ("collision_box", 24),
    ("collision_radius", 4),
    ("collision_indices", 8),
    ("collision_positions", 8),
    ("collision_normals", 8),
    ("attachments", 8),
    ("attachment_lookup", 8),
    ("events", 8),
    ("lights", 8),
    ("cameras", 8),
    ("camera_lookup", 8),
    ("ribbon_emitters", 8),
    ("particle_emitters", 8),
];

/// Size of the optional blend-mode override array field.
const BLEND_MODE_OVERRIDE_FIELD_SIZE: usize = 8;

/// Header size for the given global flags.
#[must_use]
pub fn header_size(global_flags: u32) -> usize {
    let base: usize = HEADER_FIELDS.iter().map(|(_, size)| size).sum();
    if global_flags & flags::BLEND_MODE_OVERRIDES != 0 {
        base + BLEND_MODE_OVERRIDE_FIELD_SIZE
    } else {
        base
    }
}

/// An in-memory model ready to serialize.
#[derive(Debug, Clone, Default)]
pub struct M2Model {
    pub name: String,
    pub flags: u32,
    pub global_loops: Vec<u32>,
    pub sequences: Vec<M2Sequence>,
    pub sequence_lookup: Vec<i16>,
    pub bones: Vec<M2Bone>,
    pub key_bone_lookup: Vec<i16>,
    pub vertices: Vec<M2Vertex>,
    pub skin_profile_count: u32,
    pub textures: Vec<M2Texture>,
    /// Opacity tracks ("texture weights"), one per material slot.
    pub transparency_tracks: Vec<TransparencyTrack>,
    pub texture_transforms: Vec<M2TextureTransform>,
    pub replaceable_texture_lookup: Vec<i16>,
    pub materials: Vec<M2Material>,
    pub bone_lookup: Vec<u16>,
    pub texture_lookup: Vec<u16>,
    pub texture_unit_lookup: Vec<u16>,
    pub transparency_lookup: Vec<u16>,
    pub texture_transform_lookup: Vec<i16>,
    pub bounds: BoundingBox,
    pub bounds_radius: f32,
    pub collision_bounds: BoundingBox,
    pub collision_radius: f32,
    pub collision_indices: Vec<u16>,
    pub collision_positions: Vec<Vec3>,
    pub collision_normals: Vec<Vec3>,
    /// Present only with [`flags::BLEND_MODE_OVERRIDES`].
    pub blend_mode_overrides: Option<Vec<u16>>,
}

/// Append pre-encoded fixed-size records as one array.
fn push_records(builder: &mut OffsetBuilder, records: &[Vec<u8>]) -> Result<OffsetArray> {
    builder.push_raw(records.len(), &records.concat())
}

impl M2Model {
    /// Global flags as written, including flags implied by optional data.
    #[must_use]
    pub fn effective_flags(&self) -> u32 {
        if self.blend_mode_overrides.is_some() {
            self.flags | flags::BLEND_MODE_OVERRIDES
        } else {
            self.flags & !flags::BLEND_MODE_OVERRIDES
        }
    }

    /// Serialize the model.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let global_flags = self.effective_flags();
        let size = header_size(global_flags);
        let mut builder = OffsetBuilder::new(size).with_alignment(DATA_ALIGNMENT);

        let name = builder.push_string(&self.name)?;
        let global_loops = builder.push_array(&self.global_loops)?;
        let sequences = builder.push_array(&self.sequences)?;
        let sequence_lookup = builder.push_array(&self.sequence_lookup)?;
        let bone_records = self
            .bones
            .iter()
            .map(|bone| bone.write(&mut builder))
            .collect::<Result<Vec<_>>>()?;
        let bones = push_records(&mut builder, &bone_records)?;
        let key_bone_lookup = builder.push_array(&self.key_bone_lookup)?;
        let vertices = builder.push_array(&self.vertices)?;
        let texture_records = self
            .textures
            .iter()
            .map(|texture| texture.write(&mut builder))
            .collect::<Result<Vec<_>>>()?;
        let textures = push_records(&mut builder, &texture_records)?;
        let weight_records = self
            .transparency_tracks
            .iter()
            .map(|track| write_track(&mut builder, track))
            .collect::<Result<Vec<_>>>()?;
        let texture_weights = push_records(&mut builder, &weight_records)?;
        let transform_records = self
            .texture_transforms
            .iter()
            .map(|transform| transform.write(&mut builder))
            .collect::<Result<Vec<_>>>()?;
        let texture_transforms = push_records(&mut builder, &transform_records)?;
        let replaceable_texture_lookup = builder.push_array(&self.replaceable_texture_lookup)?;
        let materials = builder.push_array(&self.materials)?;
        let bone_lookup = builder.push_array(&self.bone_lookup)?;
        let texture_lookup = builder.push_array(&self.texture_lookup)?;
        let texture_unit_lookup = builder.push_array(&self.texture_unit_lookup)?;
        let transparency_lookup = builder.push_array(&self.transparency_lookup)?;
        let texture_transform_lookup = builder.push_array(&self.texture_transform_lookup)?;
        let collision_indices = builder.push_array(&self.collision_indices)?;
        let collision_positions = builder.push_array(&self.collision_positions)?;
        let collision_normals = builder.push_array(&self.collision_normals)?;
        let blend_mode_overrides = match &self.blend_mode_overrides {
            Some(overrides) => Some(builder.push_array(overrides)?),
            None => None,
        };

        let mut header = Section::with_capacity(size);
        header.write_bytes(&MAGIC);
        header.write_u32(VERSION);
        header.write(&name);
        header.write_u32(global_flags);
        header.write(&global_loops);
        header.write(&sequences);
        header.write(&sequence_lookup);
        header.write(&bones);
        header.write(&key_bone_lookup);
        header.write(&vertices);
        header.write_u32(self.skin_profile_count);
        header.write(&OffsetArray::EMPTY); // colors
        header.write(&textures);
        header.write(&texture_weights);
        header.write(&texture_transforms);
        header.write(&replaceable_texture_lookup);
        header.write(&materials);
        header.write(&bone_lookup);
        header.write(&texture_lookup);
        header.write(&texture_unit_lookup);
        header.write(&transparency_lookup);
        header.write(&texture_transform_lookup);
        header.write(&self.bounds);
        header.write_f32(self.bounds_radius);
        header.write(&self.collision_bounds);
        header.write_f32(self.collision_radius);
        header.write(&collision_indices);
        header.write(&collision_positions);
        header.write(&collision_normals);
        // Attachments, events, lights, cameras, ribbons, particles.
        for _ in 0..8 {
            header.write(&OffsetArray::EMPTY);
        }
        if let Some(overrides) = blend_mode_overrides {
            header.write(&overrides);
        }
        builder.finish(&header.into_bytes())
    }
}

/// Header fields reported by `inspect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct M2Summary {
    pub version: u32,
    pub name: String,
    pub flags: u32,
    pub header_size: usize,
    pub global_loop_count: u32,
    pub sequence_count: u32,
    pub bone_count: u32,
    pub vertex_count: u32,
    pub skin_profile_count: u32,
    pub texture_count: u32,
    pub material_count: u32,
    pub collision_triangle_count: u32,
}

fn read_array(cursor: &mut Cursor<&[u8]>) -> Result<OffsetArray> {
    Ok(OffsetArray {
        count: cursor.read_u32::<LittleEndian>()?,
        offset: cursor.read_u32::<LittleEndian>()?,
    })
}

/// Read the header of an M2 buffer.
pub fn read_summary(data: &[u8]) -> Result<M2Summary> {
    let mut cursor = Cursor::new(data);
    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic).map_err(|_| Error::InvalidModelMagic)?;
    if magic != MAGIC {
        return Err(Error::InvalidModelMagic);
    }
    let version = cursor.read_u32::<LittleEndian>()?;
    let name_array = read_array(&mut cursor)?;
    let flags = cursor.read_u32::<LittleEndian>()?;
    let global_loops = read_array(&mut cursor)?;
    let sequences = read_array(&mut cursor)?;
    let _sequence_lookup = read_array(&mut cursor)?;
    let bones = read_array(&mut cursor)?;
    let _key_bone_lookup = read_array(&mut cursor)?;
    let vertices = read_array(&mut cursor)?;
    let skin_profile_count = cursor.read_u32::<LittleEndian>()?;
    let _colors = read_array(&mut cursor)?;
    let textures = read_array(&mut cursor)?;
    for _ in 0..3 {
        read_array(&mut cursor)?;
    }
    let materials = read_array(&mut cursor)?;
    // Lookups, bounds and collision bounds up to the collision index array.
    cursor.set_position(cursor.position() + 5 * 8 + 2 * 28);
    let collision_indices = read_array(&mut cursor)?;

    let start = name_array.offset as usize;
    let end = start + name_array.count as usize;
    let name_bytes = data.get(start..end).ok_or(Error::TruncatedChunk {
        offset: start,
        needed: name_array.count as usize,
        available: data.len().saturating_sub(start),
    })?;
    let name = String::from_utf8_lossy(name_bytes).trim_end_matches('\0').to_string();

    Ok(M2Summary {
        version,
        name,
        flags,
        header_size: header_size(flags),
        global_loop_count: global_loops.count,
        sequence_count: sequences.count,
        bone_count: bones.count,
        vertex_count: vertices.count,
        skin_profile_count,
        texture_count: textures.count,
        material_count: materials.count,
        collision_triangle_count: collision_indices.count / 3,
    })
}
