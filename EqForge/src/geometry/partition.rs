//! Geometry partitioner
//!
//! Splits a mesh into render groups that each hold at most
//! `max_faces_per_group` triangles and address at most 65535 vertices.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::common::{BoundingBox, TriangleFace, Vec3};
use crate::config::ConversionConfig;
use crate::error::{Error, Result};
use crate::material::Material;
use crate::mesh::{CompactedMesh, MeshData};

/// Largest vertex count a group can address with 16-bit indices.
pub const MAX_GROUP_VERTICES: usize = u16::MAX as usize;

/// Recursion guard for meshes whose triangles pile up on one spot.
const MAX_SPLIT_DEPTH: u32 = 48;

/// Knobs for [`partition_mesh`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartitionOptions {
    pub max_faces_per_group: usize,
    /// Width by which each half reaches across the cut.
    pub seam_overlap: f32,
    /// Padding of the initial bounding box.
    pub boundary_padding: f32,
}

impl Default for PartitionOptions {
    fn default() -> Self {
        Self::from(&ConversionConfig::default())
    }
}

impl From<&ConversionConfig> for PartitionOptions {
    fn from(config: &ConversionConfig) -> Self {
        Self {
            max_faces_per_group: config.max_faces_per_group,
            seam_overlap: config.seam_overlap,
            boundary_padding: config.added_boundary_amount,
        }
    }
}

/// One output group.
#[derive(Debug, Clone)]
pub struct PartitionedGroup {
    /// Index of the material bucket the group came from.
    pub bucket: usize,
    /// Material-sorted, compacted geometry.
    pub geometry: CompactedMesh,
}

/// Partition `mesh` bucket by bucket.
///
/// Each bucket is a set of material names; its triangles are gathered first
/// and only then split spatially. Buckets are independent, so a triangle
/// whose material appears in two buckets is emitted twice.
pub fn partition_mesh(
    mesh: &MeshData,
    materials: &[Material],
    buckets: &[Vec<String>],
    options: &PartitionOptions,
) -> Result<Vec<PartitionedGroup>> {
    let max_faces = options.max_faces_per_group.max(1);
    let by_name: HashMap<&str, u32> = materials
        .iter()
        .map(|material| (material.name.as_str(), material.index))
        .collect();

    let mut groups = Vec::new();
    for (bucket, names) in buckets.iter().enumerate() {
        let mut wanted = Vec::with_capacity(names.len());
        for name in names {
            let index = by_name
                .get(name.as_str())
                .ok_or_else(|| Error::MaterialNotFound { name: name.clone() })?;
            wanted.push(*index);
        }

        let faces: Vec<TriangleFace> = mesh
            .triangles
            .iter()
            .filter(|face| wanted.contains(&face.material))
            .copied()
            .collect();
        if faces.is_empty() {
            return Err(Error::EmptyMaterialBucket {
                materials: names.join(", "),
            });
        }

        let bounds = BoundingBox::from_points(
            faces
                .iter()
                .flat_map(|face| face.indices())
                .map(|index| mesh.positions[index as usize]),
            options.boundary_padding,
        );

        let mut leaves = Vec::new();
        split_faces(&mesh.positions, faces, bounds, options, max_faces, 0, &mut leaves);
        tracing::debug!(
            "Material bucket {} [{}] split into {} group(s)",
            bucket,
            names.join(", "),
            leaves.len()
        );

        for mut leaf in leaves {
            leaf.sort_by_key(|face| face.material);
            let geometry = mesh.compact(&leaf);
            if geometry.mesh.vertex_count() > MAX_GROUP_VERTICES {
                return Err(Error::GroupVertexOverflow {
                    vertex_count: geometry.mesh.vertex_count(),
                    limit: MAX_GROUP_VERTICES,
                });
            }
            groups.push(PartitionedGroup { bucket, geometry });
        }
    }
    Ok(groups)
}

fn split_faces(
    positions: &[Vec3],
    faces: Vec<TriangleFace>,
    bounds: BoundingBox,
    options: &PartitionOptions,
    max_faces: usize,
    depth: u32,
    leaves: &mut Vec<Vec<TriangleFace>>,
) {
    if faces.len() <= max_faces {
        leaves.push(faces);
        return;
    }
    if depth >= MAX_SPLIT_DEPTH {
        push_chunked(faces, max_faces, leaves);
        return;
    }

    let (lower_box, upper_box) = bounds.split_xy(options.seam_overlap);
    let mut lower = Vec::new();
    let mut upper = Vec::new();
    for face in &faces {
        let centroid = face.centroid(positions);
        let in_lower = lower_box.contains_xy_half_open(centroid);
        let in_upper = upper_box.contains_xy_half_open(centroid);
        if in_lower {
            lower.push(*face);
        }
        // A centroid sitting on the outer max edge belongs to the upper half.
        if in_upper || !in_lower {
            upper.push(*face);
        }
    }

    // Seam copies must not outgrow the split itself.
    if lower.len() + upper.len() > faces.len() * 3 / 2 {
        tracing::debug!(
            "Spatial split of {} triangles duplicated too much ({} + {}), chunking sequentially",
            faces.len(),
            lower.len(),
            upper.len()
        );
        push_chunked(faces, max_faces, leaves);
        return;
    }

    split_faces(positions, lower, lower_box, options, max_faces, depth + 1, leaves);
    split_faces(positions, upper, upper_box, options, max_faces, depth + 1, leaves);
}

fn push_chunked(faces: Vec<TriangleFace>, max_faces: usize, leaves: &mut Vec<Vec<TriangleFace>>) {
    leaves.extend(faces.chunks(max_faces).map(<[TriangleFace]>::to_vec));
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::material::MaterialKind;
    use crate::mesh::test_support::grid_mesh;

    fn materials(names: &[&str]) -> Vec<Material> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Material::new(i as u32, *name, MaterialKind::Diffuse, vec![(*name).to_string()]))
            .collect()
    }

    fn options(max_faces: usize) -> PartitionOptions {
        PartitionOptions {
            max_faces_per_group: max_faces,
            seam_overlap: 0.5,
            boundary_padding: 1.0,
        }
    }

    #[test]
    fn test_small_mesh_is_one_bijective_group() {
        let mesh = grid_mesh(8, 8, 0);
        let groups = partition_mesh(&mesh, &materials(&["floor"]), &[vec!["floor".to_string()]], &options(1000))
            .unwrap();

        assert_eq!(groups.len(), 1);
        let group = &groups[0].geometry;
        assert_eq!(group.mesh.triangle_count(), mesh.triangle_count());
        assert_eq!(group.mesh.vertex_count(), mesh.vertex_count());
        for (i, face) in mesh.triangles.iter().enumerate() {
            let restored = group.source_triangle(i);
            assert_eq!(restored, *face);
            for (local, source) in group.mesh.triangles[i].indices().iter().zip(face.indices()) {
                assert_eq!(group.mesh.positions[*local as usize], mesh.positions[source as usize]);
                assert_eq!(
                    group.mesh.texture_coordinates[*local as usize],
                    mesh.texture_coordinates[source as usize]
                );
            }
        }
    }

    #[test]
    fn test_large_mesh_respects_limit_and_loses_nothing() {
        // 400 x 250 quads = 200,000 triangles.
        let mesh = grid_mesh(400, 250, 0);
        assert_eq!(mesh.triangle_count(), 200_000);
        let groups = partition_mesh(&mesh, &materials(&["ground"]), &[vec!["ground".to_string()]], &options(50_000))
            .unwrap();

        assert!(groups.len() >= 4);
        let mut covered = HashSet::new();
        for group in &groups {
            assert!(group.geometry.mesh.triangle_count() <= 50_000);
            assert!(group.geometry.mesh.validate("group").is_ok());
            for i in 0..group.geometry.mesh.triangle_count() {
                covered.insert(group.geometry.source_triangle(i));
            }
        }
        let input: HashSet<TriangleFace> = mesh.triangles.iter().copied().collect();
        assert_eq!(covered, input);
    }

    #[test]
    fn test_coincident_triangles_fall_back_to_chunks() {
        let mut mesh = grid_mesh(1, 1, 0);
        let face = mesh.triangles[0];
        mesh.triangles = vec![face; 25];
        let groups = partition_mesh(&mesh, &materials(&["a"]), &[vec!["a".to_string()]], &options(10)).unwrap();
        let counts: Vec<usize> = groups.iter().map(|g| g.geometry.mesh.triangle_count()).collect();
        assert_eq!(counts.iter().sum::<usize>(), 25);
        assert!(counts.iter().all(|&c| c <= 10));
    }

    #[test]
    fn test_dense_geometry_keeps_seam_copies_bounded() {
        // 5,000 triangles packed into a 1.5 unit square, far smaller than the seam overlap.
        let mut mesh = grid_mesh(50, 50, 0);
        for position in &mut mesh.positions {
            *position *= 0.03;
        }
        let groups = partition_mesh(&mesh, &materials(&["moss"]), &[vec!["moss".to_string()]], &options(1000))
            .unwrap();

        let total: usize = groups.iter().map(|g| g.geometry.mesh.triangle_count()).sum();
        assert!(total <= mesh.triangle_count() * 2, "{total} triangles emitted");
        assert!(groups.iter().all(|g| g.geometry.mesh.triangle_count() <= 1000));
        let covered: HashSet<TriangleFace> = groups
            .iter()
            .flat_map(|g| (0..g.geometry.mesh.triangle_count()).map(|i| g.geometry.source_triangle(i)))
            .collect();
        assert_eq!(covered.len(), mesh.triangle_count());
    }

    #[test]
    fn test_buckets_are_independent() {
        let mut mesh = grid_mesh(4, 1, 0);
        for face in mesh.triangles.iter_mut().skip(4) {
            face.material = 1;
        }
        let groups = partition_mesh(
            &mesh,
            &materials(&["stone", "water"]),
            &[vec!["water".to_string()], vec!["stone".to_string()]],
            &options(100),
        )
        .unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].bucket, 0);
        assert!(groups[0].geometry.mesh.triangles.iter().all(|f| f.material == 1));
        assert!(groups[1].geometry.mesh.triangles.iter().all(|f| f.material == 0));
    }

    #[test]
    fn test_missing_material_is_an_error() {
        let mesh = grid_mesh(1, 1, 0);
        let result = partition_mesh(&mesh, &materials(&["a"]), &[vec!["nope".to_string()]], &options(10));
        assert!(matches!(result, Err(Error::MaterialNotFound { name }) if name == "nope"));
    }

    #[test]
    fn test_empty_bucket_is_an_error() {
        let mesh = grid_mesh(1, 1, 0);
        let result = partition_mesh(&mesh, &materials(&["a", "b"]), &[vec!["b".to_string()]], &options(10));
        assert!(matches!(result, Err(Error::EmptyMaterialBucket { .. })));
    }

    #[test]
    fn test_vertex_overflow_is_flagged() {
        // Unshared triangles: 3 vertices each, 22,000 triangles = 66,000 vertices.
        let mut mesh = MeshData::new();
        for i in 0..22_000u32 {
            for corner in 0..3 {
                mesh.positions.push(Vec3::new(i as f32, corner as f32, 0.0));
                mesh.normals.push(Vec3::Z);
                mesh.texture_coordinates.push(Default::default());
            }
            mesh.triangles.push(TriangleFace::new(0, i * 3, i * 3 + 1, i * 3 + 2));
        }
        let result = partition_mesh(&mesh, &materials(&["a"]), &[vec!["a".to_string()]], &options(30_000));
        assert!(matches!(result, Err(Error::GroupVertexOverflow { vertex_count: 66_000, .. })));
    }
}
