//! World map object group file
//!
//! A group file is `MVER` followed by a single `MOGP` chunk whose payload is
//! a 68-byte header and the geometry sub-chunks:
//!
//! ```text
//! MOPY  per-triangle flags + material id
//! MOVI  u16 triangle indices
//! MOVT  positions
//! MONR  normals
//! MOTV  texture coordinates
//! MOBA  render batches
//! MOCV  vertex colors (only with HAS_VERTEX_COLORS)
//! MOBN  BSP nodes (one leaf)
//! MOBR  BSP face references
//! ```
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::collections::HashMap;

use super::{NO_MATERIAL, WMO_VERSION, group_flags, poly_flags};
use crate::common::{BoundingBox, ToBytes, slice_to_bytes};
use crate::error::{Error, Result};
use crate::formats::chunk::{ChunkWriter, tokens, wrap_in_chunk};
use crate::formats::offset::Section;
use crate::geometry::MAX_GROUP_VERTICES;
use crate::mesh::MeshData;

/// Size of the `MOGP` header that precedes the sub-chunks.
pub const MOGP_HEADER_SIZE: usize = 68;

/// Liquid type that keeps the group dry.
const NO_LIQUID: u32 = 15;

/// Most indices one batch can address (`u16` count, whole triangles).
const MAX_BATCH_INDICES: usize = (u16::MAX as usize / 3) * 3;

/// BSP leaf node flag.
const BSP_LEAF: u16 = 0x4;

/// One `MOBA` entry.
///
/// Total size: 24 bytes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WmoBatch {
    pub bounds: BoundingBox,
    pub first_index: u32,
    pub index_count: u16,
    pub first_vertex: u16,
    pub last_vertex: u16,
    pub flags: u8,
    pub material: u8,
}

impl ToBytes for WmoBatch {
    const SIZE: usize = 24;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        self.bounds.write_low_res(out);
        self.first_index.write_bytes(out);
        self.index_count.write_bytes(out);
        self.first_vertex.write_bytes(out);
        self.last_vertex.write_bytes(out);
        self.flags.write_bytes(out);
        self.material.write_bytes(out);
    }
}

/// One render group ready to serialize.
#[derive(Debug, Clone)]
pub struct WmoGroup {
    pub name_offset: u32,
    pub descriptive_name_offset: u32,
    pub flags: u32,
    pub bounds: BoundingBox,
    /// Row id in `WMOAreaTable`.
    pub group_id: u32,
    /// `(flags, material)` per triangle.
    pub poly_materials: Vec<(u8, u8)>,
    pub indices: Vec<u16>,
    pub mesh: MeshData,
    pub batches: Vec<WmoBatch>,
}

impl WmoGroup {
    /// Build a group from material-sorted, compacted geometry.
    ///
    /// `material_slots` maps a source material index to its `MOMT` slot;
    /// materials without a slot are collision-only and get no batch.
    pub fn from_geometry(
        mesh: MeshData,
        material_slots: &HashMap<u32, u8>,
        bounds: BoundingBox,
        group_id: u32,
    ) -> Result<Self> {
        if mesh.vertex_count() > MAX_GROUP_VERTICES {
            return Err(Error::GroupVertexOverflow {
                vertex_count: mesh.vertex_count(),
                limit: MAX_GROUP_VERTICES,
            });
        }
        if mesh.triangle_count() > u16::MAX as usize {
            return Err(Error::GroupTriangleOverflow {
                triangle_count: mesh.triangle_count(),
                limit: u16::MAX as usize,
            });
        }

        let mut indices = Vec::with_capacity(mesh.triangle_count() * 3);
        let mut poly_materials = Vec::with_capacity(mesh.triangle_count());
        for face in &mesh.triangles {
            indices.extend(face.to_u16()?);
            poly_materials.push(match material_slots.get(&face.material) {
                Some(&slot) => (poly_flags::RENDER, slot),
                None => (poly_flags::COLLISION, NO_MATERIAL),
            });
        }

        let mut flags = group_flags::EXTERIOR | group_flags::HAS_BSP_TREE;
        if mesh.has_vertex_colors() {
            flags |= group_flags::HAS_VERTEX_COLORS;
        }

        let mut group = Self {
            name_offset: 0,
            descriptive_name_offset: 0,
            flags,
            bounds,
            group_id,
            poly_materials,
            indices,
            mesh,
            batches: Vec::new(),
        };
        group.batches = group.build_batches(material_slots);
        Ok(group)
    }

    /// Set the `MOGN` offsets this group's header refers to.
    #[must_use]
    pub fn with_name_offsets(mut self, name: u32, descriptive: u32) -> Self {
        self.name_offset = name;
        self.descriptive_name_offset = descriptive;
        self
    }

    /// One batch per run of a renderable material, split where a run
    /// exceeds the 16-bit index count.
    fn build_batches(&self, material_slots: &HashMap<u32, u8>) -> Vec<WmoBatch> {
        let triangles = &self.mesh.triangles;
        let mut batches = Vec::new();
        let mut start = 0;
        while start < triangles.len() {
            let material = triangles[start].material;
            let end = triangles[start..]
                .iter()
                .position(|face| face.material != material)
                .map_or(triangles.len(), |len| start + len);
            if let Some(&slot) = material_slots.get(&material) {
                let mut index = start * 3;
                while index < end * 3 {
                    let count = (end * 3 - index).min(MAX_BATCH_INDICES);
                    batches.push(self.batch(index, count, slot));
                    index += count;
                }
            }
            start = end;
        }
        batches
    }

    fn batch(&self, first_index: usize, index_count: usize, material: u8) -> WmoBatch {
        let range = &self.indices[first_index..first_index + index_count];
        let first_vertex = range.iter().copied().min().unwrap_or(0);
        let last_vertex = range.iter().copied().max().unwrap_or(0);
        let bounds = BoundingBox::from_points(range.iter().map(|&i| self.mesh.positions[i as usize]), 0.0);
        WmoBatch {
            bounds,
            first_index: first_index as u32,
            index_count: index_count as u16,
            first_vertex,
            last_vertex,
            flags: 0,
            material,
        }
    }

    /// Serialize the group file.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut body = Section::with_capacity(MOGP_HEADER_SIZE + self.indices.len() * 16);
        body.write_u32(self.name_offset);
        body.write_u32(self.descriptive_name_offset);
        body.write_u32(self.flags);
        body.write(&self.bounds);
        body.write_u16(0); // first portal
        body.write_u16(0); // portal count
        body.write_u16(0); // transparent batches
        body.write_u16(0); // interior batches
        body.write_u16(self.batches.len() as u16);
        body.write_u16(0);
        body.write_zeros(4); // fog ids
        body.write_u32(NO_LIQUID);
        body.write_u32(self.group_id);
        body.write_zeros(8);

        let mut mopy = Vec::with_capacity(self.poly_materials.len() * 2);
        for &(flags, material) in &self.poly_materials {
            mopy.extend_from_slice(&[flags, material]);
        }
        body.write_bytes(&wrap_in_chunk(tokens::MOPY, &mopy)?);
        body.write_bytes(&wrap_in_chunk(tokens::MOVI, &slice_to_bytes(&self.indices))?);
        body.write_bytes(&wrap_in_chunk(tokens::MOVT, &slice_to_bytes(&self.mesh.positions))?);
        body.write_bytes(&wrap_in_chunk(tokens::MONR, &slice_to_bytes(&self.mesh.normals))?);
        body.write_bytes(&wrap_in_chunk(
            tokens::MOTV,
            &slice_to_bytes(&self.mesh.texture_coordinates),
        )?);
        body.write_bytes(&wrap_in_chunk(tokens::MOBA, &slice_to_bytes(&self.batches))?);
        if self.flags & group_flags::HAS_VERTEX_COLORS != 0 {
            let mut colors = Vec::with_capacity(self.mesh.vertex_colors.len() * 4);
            for color in &self.mesh.vertex_colors {
                color.write_bgra(&mut colors);
            }
            body.write_bytes(&wrap_in_chunk(tokens::MOCV, &colors)?);
        }
        body.write_bytes(&wrap_in_chunk(tokens::MOBN, &self.bsp_leaf())?);
        let face_refs: Vec<u16> = (0..self.poly_materials.len() as u16).collect();
        body.write_bytes(&wrap_in_chunk(tokens::MOBR, &slice_to_bytes(&face_refs))?);

        let mut writer = ChunkWriter::new();
        writer.version(WMO_VERSION)?.chunk(tokens::MOGP, &body.into_bytes())?;
        Ok(writer.finish())
    }

    fn bsp_leaf(&self) -> Vec<u8> {
        let mut node = Section::with_capacity(16);
        node.write_u16(BSP_LEAF);
        node.write_i16(-1);
        node.write_i16(-1);
        node.write_u16(self.poly_materials.len() as u16);
        node.write_u32(0);
        node.write_f32(0.0);
        node.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ColorRgba, TriangleFace};
    use crate::formats::chunk::{read_chunk, read_chunks};
    use crate::mesh::test_support::grid_mesh;
    use pretty_assertions::assert_eq;

    fn slots() -> HashMap<u32, u8> {
        HashMap::from([(0, 0), (1, 1)])
    }

    fn sub_chunks(bytes: &[u8]) -> Vec<String> {
        let chunks = read_chunks(bytes).unwrap();
        let mogp = chunks[1].payload;
        read_chunks(&mogp[MOGP_HEADER_SIZE..])
            .unwrap()
            .iter()
            .map(|c| c.token.to_string())
            .collect()
    }

    #[test]
    fn test_group_layout() {
        let mut mesh = grid_mesh(2, 2, 0);
        for face in &mut mesh.triangles[4..] {
            face.material = 1;
        }
        let bounds = mesh.bounding_box(1.0);
        let group = WmoGroup::from_geometry(mesh, &slots(), bounds, 30000).unwrap();
        let bytes = group.to_bytes().unwrap();

        let chunks = read_chunks(&bytes).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].token, tokens::MVER);
        assert_eq!(chunks[1].token, tokens::MOGP);
        assert_eq!(
            sub_chunks(&bytes),
            ["MOPY", "MOVI", "MOVT", "MONR", "MOTV", "MOBA", "MOBN", "MOBR"]
        );

        let header = chunks[1].payload;
        assert_eq!(&header[8..12], &(group_flags::EXTERIOR | group_flags::HAS_BSP_TREE).to_le_bytes());
        assert_eq!(&header[44..46], &2u16.to_le_bytes());
        assert_eq!(&header[52..56], &15u32.to_le_bytes());
        assert_eq!(&header[56..60], &30000u32.to_le_bytes());

        assert_eq!(group.batches.len(), 2);
        assert_eq!(group.batches[1].first_index, 12);
        assert_eq!(group.batches[1].index_count, 12);
        assert_eq!(group.batches[1].material, 1);
    }

    #[test]
    fn test_collision_only_faces() {
        let mut mesh = grid_mesh(1, 1, 0);
        mesh.triangles[1].material = 7;
        let bounds = mesh.bounding_box(0.0);
        let group = WmoGroup::from_geometry(mesh, &slots(), bounds, 1).unwrap();
        assert_eq!(group.poly_materials[0], (poly_flags::RENDER, 0));
        assert_eq!(group.poly_materials[1], (poly_flags::COLLISION, NO_MATERIAL));
        assert_eq!(group.batches.len(), 1);
        assert_eq!(group.batches[0].index_count, 3);
    }

    #[test]
    fn test_vertex_colors_add_mocv() {
        let mut mesh = grid_mesh(1, 1, 0);
        mesh.vertex_colors = vec![ColorRgba::new(1, 2, 3, 4); mesh.vertex_count()];
        let bounds = mesh.bounding_box(0.0);
        let group = WmoGroup::from_geometry(mesh, &slots(), bounds, 1).unwrap();
        assert!(group.flags & group_flags::HAS_VERTEX_COLORS != 0);
        let bytes = group.to_bytes().unwrap();
        assert!(sub_chunks(&bytes).contains(&"MOCV".to_string()));
    }

    #[test]
    fn test_long_runs_split_into_several_batches() {
        let mut mesh = grid_mesh(150, 80, 0);
        assert_eq!(mesh.triangle_count(), 24_000);
        mesh.triangles.truncate(22_000);
        let bounds = mesh.bounding_box(0.0);
        let group = WmoGroup::from_geometry(mesh, &slots(), bounds, 1).unwrap();
        assert_eq!(group.batches.len(), 2);
        assert_eq!(group.batches[0].index_count as usize, MAX_BATCH_INDICES);
        assert_eq!(
            group.batches[1].first_index as usize + group.batches[1].index_count as usize,
            66_000
        );
    }

    #[test]
    fn test_out_of_range_vertices_rejected() {
        let mut mesh = grid_mesh(1, 1, 0);
        mesh.triangles.push(TriangleFace::new(0, 0, 1, 70_000));
        let bounds = mesh.bounding_box(0.0);
        assert!(matches!(
            WmoGroup::from_geometry(mesh, &slots(), bounds, 1),
            Err(Error::GroupVertexOverflow { .. })
        ));
    }

    #[test]
    fn test_bsp_leaf_covers_all_faces() {
        let mesh = grid_mesh(2, 1, 0);
        let bounds = mesh.bounding_box(0.0);
        let bytes = WmoGroup::from_geometry(mesh, &slots(), bounds, 1).unwrap().to_bytes().unwrap();
        let mogp = read_chunks(&bytes).unwrap()[1].payload;
        let mut offset = MOGP_HEADER_SIZE;
        loop {
            let chunk = read_chunk(mogp, offset).unwrap();
            if chunk.token == tokens::MOBN {
                assert_eq!(&chunk.payload[0..2], &BSP_LEAF.to_le_bytes());
                assert_eq!(&chunk.payload[6..8], &4u16.to_le_bytes());
                break;
            }
            offset += 8 + chunk.payload.len();
        }
    }
}
