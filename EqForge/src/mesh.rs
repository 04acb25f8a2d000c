//! Mesh container
//!
//! Parallel vertex attribute arrays plus a material-tagged triangle list.
//! All transforms here are pure: they return a new mesh and leave the input
//! untouched, so one source mesh can feed several pipeline stages.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::common::{BoundingBox, ColorRgba, TextureCoordinates, TriangleFace, Vec3};
use crate::error::{Error, Result};

/// Vertex arrays plus triangles.
///
/// Invariant (checked by [`MeshData::validate`]): `positions`, `normals` and
/// `texture_coordinates` share one length; `vertex_colors` is empty or the
/// same length; every triangle index is in range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub texture_coordinates: Vec<TextureCoordinates>,
    #[serde(default)]
    pub vertex_colors: Vec<ColorRgba>,
    pub triangles: Vec<TriangleFace>,
}

/// A compacted sub-mesh and the source vertex each of its vertices came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompactedMesh {
    pub mesh: MeshData,
    /// `source_vertices[new] == old`.
    pub source_vertices: Vec<u32>,
}

impl CompactedMesh {
    /// Triangle `index` with its indices mapped back into the source mesh.
    #[must_use]
    pub fn source_triangle(&self, index: usize) -> TriangleFace {
        let face = self.mesh.triangles[index];
        face.with_indices(face.indices().map(|i| self.source_vertices[i as usize]))
    }
}

impl MeshData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[must_use]
    pub fn has_vertex_colors(&self) -> bool {
        !self.vertex_colors.is_empty()
    }

    /// Check the attribute-length and index-range invariants.
    pub fn validate(&self, name: &str) -> Result<()> {
        let count = self.positions.len();
        if self.normals.len() != count
            || self.texture_coordinates.len() != count
            || (self.has_vertex_colors() && self.vertex_colors.len() != count)
        {
            return Err(Error::VertexAttributeMismatch {
                object: name.to_string(),
                positions: count,
                normals: self.normals.len(),
                texture_coordinates: self.texture_coordinates.len(),
                colors: self.vertex_colors.len(),
            });
        }
        self.validate_indices()
    }

    /// Check only that every triangle index addresses a position.
    pub fn validate_indices(&self) -> Result<()> {
        let count = self.positions.len();
        for (triangle, face) in self.triangles.iter().enumerate() {
            if let Some(&index) = face.indices().iter().find(|&&i| i as usize >= count) {
                return Err(Error::TriangleIndexOutOfRange {
                    triangle,
                    index,
                    vertex_count: count,
                });
            }
        }
        Ok(())
    }

    /// Append vertex `index` of `source` to this mesh's arrays.
    pub(crate) fn push_vertex_from(&mut self, source: &Self, index: usize) {
        self.positions.push(source.positions[index]);
        self.normals.push(source.normals[index]);
        self.texture_coordinates.push(source.texture_coordinates[index]);
        if source.has_vertex_colors() {
            self.vertex_colors.push(source.vertex_colors[index]);
        }
    }

    /// Build a self-contained mesh from `faces`, which index into `self`.
    ///
    /// Vertices are appended in first-use order while walking the faces
    /// V1, V2, V3; each face is rewritten to the new zero-based indices.
    #[must_use]
    pub fn compact(&self, faces: &[TriangleFace]) -> CompactedMesh {
        let mut remap: Vec<Option<u32>> = vec![None; self.vertex_count()];
        let mut out = CompactedMesh::default();
        out.mesh.triangles.reserve(faces.len());

        for face in faces {
            let indices = face.indices().map(|old| {
                *remap[old as usize].get_or_insert_with(|| {
                    let new = out.source_vertices.len() as u32;
                    out.source_vertices.push(old);
                    out.mesh.push_vertex_from(self, old as usize);
                    new
                })
            });
            out.mesh.triangles.push(face.with_indices(indices));
        }
        out
    }

    /// Compacted sub-mesh of every triangle drawn with `material`.
    #[must_use]
    pub fn extract_for_material(&self, material: u32) -> CompactedMesh {
        let faces: Vec<TriangleFace> = self
            .triangles
            .iter()
            .filter(|face| face.material == material)
            .copied()
            .collect();
        self.compact(&faces)
    }

    /// Compacted sub-mesh of an explicit face subset.
    #[must_use]
    pub fn extract_for_faces(&self, faces: &[TriangleFace]) -> CompactedMesh {
        self.compact(faces)
    }

    /// Triangles stably sorted by material, vertices re-laid in triangle order.
    ///
    /// Unreferenced vertices are dropped.
    #[must_use]
    pub fn sorted_by_material(&self) -> Self {
        let mut faces = self.triangles.clone();
        faces.sort_by_key(|face| face.material);
        self.compact(&faces).mesh
    }

    #[must_use]
    pub fn with_reversed_winding(&self) -> Self {
        Self {
            triangles: self
                .triangles
                .iter()
                .map(|face| face.with_reversed_winding())
                .collect(),
            ..self.clone()
        }
    }

    /// Convert from source to destination conventions.
    ///
    /// Positions are scaled and rotated 180 degrees about Z, normals rotate
    /// with them, V is mirrored and the winding is reversed once.
    #[must_use]
    pub fn to_wow_coordinates(&self, world_scale: f32) -> Self {
        Self {
            positions: self
                .positions
                .iter()
                .map(|&p| to_wow_position(p, world_scale))
                .collect(),
            normals: self.normals.iter().map(|n| Vec3::new(-n.x, -n.y, n.z)).collect(),
            texture_coordinates: self
                .texture_coordinates
                .iter()
                .map(|uv| uv.with_flipped_v())
                .collect(),
            vertex_colors: self.vertex_colors.clone(),
            triangles: self
                .triangles
                .iter()
                .map(|face| face.with_reversed_winding())
                .collect(),
        }
    }

    #[must_use]
    pub fn bounding_box(&self, padding: f32) -> BoundingBox {
        BoundingBox::from_points(self.positions.iter().copied(), padding)
    }
}

/// Scale a source position and rotate it 180 degrees about Z.
#[must_use]
pub fn to_wow_position(position: Vec3, world_scale: f32) -> Vec3 {
    Vec3::new(
        -position.x * world_scale,
        -position.y * world_scale,
        position.z * world_scale,
    )
}


#[cfg(test)]
mod tests {
    use super::test_support::grid_mesh;
    use super::*;

    #[test]
    fn test_validate_catches_length_mismatch() {
        let mut mesh = grid_mesh(2, 2, 0);
        assert!(mesh.validate("grid").is_ok());
        mesh.normals.pop();
        assert!(matches!(
            mesh.validate("grid"),
            Err(Error::VertexAttributeMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_catches_bad_index() {
        let mut mesh = grid_mesh(1, 1, 0);
        mesh.triangles.push(TriangleFace::new(0, 0, 1, 99));
        assert!(matches!(
            mesh.validate("grid"),
            Err(Error::TriangleIndexOutOfRange { index: 99, .. })
        ));
    }

    #[test]
    fn test_compact_is_zero_based_and_maps_back() {
        let mesh = grid_mesh(4, 4, 0);
        let faces: Vec<TriangleFace> = mesh.triangles[10..16].to_vec();
        let compacted = mesh.compact(&faces);

        assert!(compacted.mesh.validate("sub").is_ok());
        assert_eq!(compacted.mesh.vertex_count(), compacted.source_vertices.len());
        for (i, face) in faces.iter().enumerate() {
            assert_eq!(compacted.source_triangle(i), *face);
        }
        // First face's vertices come first, in V1, V2, V3 order.
        assert_eq!(compacted.mesh.triangles[0].indices(), [0, 1, 2]);
    }

    #[test]
    fn test_extract_for_material() {
        let mut mesh = grid_mesh(2, 1, 0);
        mesh.triangles[1].material = 7;
        let extracted = mesh.extract_for_material(7);
        assert_eq!(extracted.mesh.triangle_count(), 1);
        assert_eq!(extracted.mesh.vertex_count(), 3);
        assert_eq!(extracted.mesh.triangles[0].material, 7);
    }

    #[test]
    fn test_sorted_by_material_is_stable() {
        let mut mesh = grid_mesh(2, 1, 0);
        mesh.triangles[0].material = 3;
        mesh.triangles[2].material = 1;
        let sorted = mesh.sorted_by_material();
        let materials: Vec<u32> = sorted.triangles.iter().map(|f| f.material).collect();
        assert_eq!(materials, vec![0, 0, 1, 3]);
        assert!(sorted.validate("sorted").is_ok());
    }

    #[test]
    fn test_wow_coordinates_is_pure() {
        let mesh = grid_mesh(1, 1, 0);
        let converted = mesh.to_wow_coordinates(0.5);
        assert_eq!(mesh, grid_mesh(1, 1, 0));
        assert_eq!(converted.positions[1], Vec3::new(-0.5, -0.0, 0.0));
        assert_eq!(converted.triangles[0].indices(), [2, 1, 0]);
        assert_eq!(converted.texture_coordinates[3].v, -1.0);
    }
}
