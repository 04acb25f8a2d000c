//! Skin profile (`.skin`) writer
//!
//! The skin file tells the client how to draw the model's vertices: a
//! vertex lookup, the triangle list, and one submesh plus one texture unit
//! per material run.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use crate::common::{BoundingBox, ToBytes, Vec3};
use crate::error::{Error, Result};
use crate::formats::offset::{OffsetBuilder, Section};
use crate::geometry::MAX_GROUP_VERTICES;
use crate::material::Material;
use crate::mesh::MeshData;

/// Skin file magic.
pub const SKIN_MAGIC: [u8; 4] = *b"SKIN";

/// Fixed header: magic, five arrays, bone count.
pub const SKIN_HEADER_SIZE: usize = 4 + 5 * 8 + 4;

/// Bones a single draw call may reference.
const BONE_COUNT_MAX: u32 = 21;

/// A contiguous range of vertices and indices drawn together.
///
/// Total size: 48 bytes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinSubmesh {
    pub id: u16,
    /// High 16 bits of `index_start`.
    pub level: u16,
    pub vertex_start: u16,
    pub vertex_count: u16,
    pub index_start: u16,
    pub index_count: u16,
    pub bone_count: u16,
    pub bone_combo_index: u16,
    pub bone_influences: u16,
    pub center_bone_index: u16,
    pub center: Vec3,
    pub sort_center: Vec3,
    pub sort_radius: f32,
}

impl ToBytes for SkinSubmesh {
    const SIZE: usize = 48;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        for value in [
            self.id,
            self.level,
            self.vertex_start,
            self.vertex_count,
            self.index_start,
            self.index_count,
            self.bone_count,
            self.bone_combo_index,
            self.bone_influences,
            self.center_bone_index,
        ] {
            value.write_bytes(out);
        }
        self.center.write_bytes(out);
        self.sort_center.write_bytes(out);
        self.sort_radius.write_bytes(out);
    }
}

/// Texture unit: binds a submesh to a material and its lookups.
///
/// Total size: 24 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkinBatch {
    pub flags: u8,
    pub priority: i8,
    pub shader_id: u16,
    pub submesh_index: u16,
    pub geoset_index: u16,
    pub color_index: i16,
    pub material_index: u16,
    pub material_layer: u16,
    pub texture_count: u16,
    pub texture_combo_index: u16,
    pub texture_coord_combo_index: u16,
    pub texture_weight_combo_index: u16,
    pub texture_transform_combo_index: u16,
}

impl ToBytes for SkinBatch {
    const SIZE: usize = 24;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        self.flags.write_bytes(out);
        out.extend_from_slice(&self.priority.to_le_bytes());
        self.shader_id.write_bytes(out);
        self.submesh_index.write_bytes(out);
        self.geoset_index.write_bytes(out);
        self.color_index.write_bytes(out);
        for value in [
            self.material_index,
            self.material_layer,
            self.texture_count,
            self.texture_combo_index,
            self.texture_coord_combo_index,
            self.texture_weight_combo_index,
            self.texture_transform_combo_index,
        ] {
            value.write_bytes(out);
        }
    }
}

/// One skin profile.
#[derive(Debug, Clone, PartialEq)]
pub struct M2Skin {
    pub vertex_lookup: Vec<u16>,
    pub indices: Vec<u16>,
    pub bone_indices: Vec<[u8; 4]>,
    pub submeshes: Vec<SkinSubmesh>,
    pub batches: Vec<SkinBatch>,
    pub bone_count_max: u32,
}

impl M2Skin {
    /// Build the profile for a material-sorted mesh.
    ///
    /// `materials[slot]` is the model material drawn by triangles whose
    /// material index equals `materials[slot].index`; the slot doubles as the
    /// texture, transparency and transform combo index. Triangles of
    /// non-renderable materials get no submesh.
    pub fn build(mesh: &MeshData, materials: &[Material]) -> Result<Self> {
        let vertex_count = mesh.vertex_count();
        if vertex_count > MAX_GROUP_VERTICES {
            return Err(Error::GroupVertexOverflow {
                vertex_count,
                limit: MAX_GROUP_VERTICES,
            });
        }

        let mut skin = Self {
            vertex_lookup: (0..vertex_count as u16).collect(),
            indices: Vec::with_capacity(mesh.triangle_count() * 3),
            bone_indices: vec![[0; 4]; vertex_count],
            submeshes: Vec::new(),
            batches: Vec::new(),
            bone_count_max: BONE_COUNT_MAX,
        };

        let mut run_start = 0;
        while run_start < mesh.triangles.len() {
            let material_index = mesh.triangles[run_start].material;
            let run_end = mesh.triangles[run_start..]
                .iter()
                .position(|face| face.material != material_index)
                .map_or(mesh.triangles.len(), |len| run_start + len);
            let run = &mesh.triangles[run_start..run_end];
            run_start = run_end;

            let Some(slot) = materials.iter().position(|m| m.index == material_index) else {
                return Err(Error::UnknownMaterialIndex {
                    triangle: run_end - run.len(),
                    material: material_index,
                });
            };
            if !materials[slot].is_renderable() {
                continue;
            }

            let index_start = skin.indices.len();
            for face in run {
                skin.indices.extend(face.to_u16()?);
            }
            let first_vertex = run.iter().map(|f| f.min_index()).min().unwrap_or(0);
            let last_vertex = run.iter().map(|f| f.max_index()).max().unwrap_or(0);
            let bounds = BoundingBox::from_points(
                run.iter()
                    .flat_map(|f| f.indices())
                    .map(|i| mesh.positions[i as usize]),
                0.0,
            );
            let index_count = u16::try_from(run.len() * 3).map_err(|_| Error::GroupTriangleOverflow {
                triangle_count: run.len(),
                limit: u16::MAX as usize / 3,
            })?;
            let submesh_index = skin.submeshes.len() as u16;
            let slot = u16::try_from(slot).map_err(|_| Error::MaterialIndexOverflow { index: slot, bits: 16 })?;

            skin.submeshes.push(SkinSubmesh {
                id: 0,
                level: (index_start >> 16) as u16,
                vertex_start: first_vertex as u16,
                vertex_count: (last_vertex - first_vertex + 1) as u16,
                index_start: (index_start & 0xFFFF) as u16,
                index_count,
                bone_count: 1,
                bone_combo_index: 0,
                bone_influences: 1,
                center_bone_index: 0,
                center: bounds.center(),
                sort_center: bounds.center(),
                sort_radius: bounds.furthest_point_distance_from_center(),
            });
            skin.batches.push(SkinBatch {
                flags: 0x10,
                priority: 0,
                shader_id: 0,
                submesh_index,
                geoset_index: submesh_index,
                color_index: -1,
                material_index: slot,
                material_layer: 0,
                texture_count: 1,
                texture_combo_index: slot,
                texture_coord_combo_index: 0,
                texture_weight_combo_index: slot,
                texture_transform_combo_index: slot,
            });
        }
        Ok(skin)
    }

    /// Serialize with the offset-array layout.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut builder = OffsetBuilder::new(SKIN_HEADER_SIZE);
        let vertices = builder.push_array(&self.vertex_lookup)?;
        let indices = builder.push_array(&self.indices)?;
        let bones = builder.push_raw(self.bone_indices.len(), bytemuck::cast_slice(&self.bone_indices))?;
        let submeshes = builder.push_array(&self.submeshes)?;
        let batches = builder.push_array(&self.batches)?;

        let mut header = Section::with_capacity(SKIN_HEADER_SIZE);
        header.write_bytes(&SKIN_MAGIC);
        header.write(&vertices);
        header.write(&indices);
        header.write(&bones);
        header.write(&submeshes);
        header.write(&batches);
        header.write_u32(self.bone_count_max);
        builder.finish(&header.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialKind;
    use crate::mesh::test_support::grid_mesh;

    fn two_materials() -> Vec<Material> {
        vec![
            Material::new(0, "stone", MaterialKind::Diffuse, vec!["stone".to_string()]),
            Material::new(5, "glass", MaterialKind::Transparent50Percent, vec!["glass".to_string()]),
        ]
    }

    #[test]
    fn test_one_submesh_per_material_run() {
        let mut mesh = grid_mesh(2, 1, 0);
        mesh.triangles[2].material = 5;
        mesh.triangles[3].material = 5;
        let skin = M2Skin::build(&mesh, &two_materials()).unwrap();

        assert_eq!(skin.vertex_lookup.len(), mesh.vertex_count());
        assert_eq!(skin.indices.len(), 12);
        assert_eq!(skin.submeshes.len(), 2);
        assert_eq!(skin.submeshes[1].index_start, 6);
        assert_eq!(skin.submeshes[1].index_count, 6);
        assert_eq!(skin.batches[1].material_index, 1);
        assert_eq!(skin.batches[1].texture_combo_index, 1);
    }

    #[test]
    fn test_non_renderable_runs_are_skipped() {
        let mut mesh = grid_mesh(2, 1, 0);
        mesh.triangles[3].material = 9;
        let mut materials = two_materials();
        materials.push(Material::new(9, "wall", MaterialKind::Invisible, vec!["x".to_string()]));
        let skin = M2Skin::build(&mesh, &materials).unwrap();
        assert_eq!(skin.submeshes.len(), 1);
        assert_eq!(skin.indices.len(), 9);
    }

    #[test]
    fn test_serialized_header() {
        let mesh = grid_mesh(1, 1, 0);
        let bytes = M2Skin::build(&mesh, &two_materials()).unwrap().to_bytes().unwrap();
        assert_eq!(&bytes[0..4], b"SKIN");
        // Vertex lookup: 4 entries right after the header.
        assert_eq!(&bytes[4..8], &4u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &(SKIN_HEADER_SIZE as u32).to_le_bytes());
        assert_eq!(&bytes[44..48], &21u32.to_le_bytes());
    }
}
