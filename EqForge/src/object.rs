//! Model object assembly
//!
//! Turns a mesh and its materials into an [`M2Model`] plus its skin profile.
//! Used for standalone static objects and for the animated surfaces lifted
//! out of zones.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};

use crate::common::{BoundingBox, TriangleFace, Vec3};
use crate::config::ConversionConfig;
use crate::error::Result;
use crate::formats::m2::{
    M2Bone, M2Material, M2Model, M2Sequence, M2Skin, M2Texture, M2TextureTransform, M2Vertex, material_flags,
    texture_flags,
};
use crate::geometry::{TransparencyTrack, expand_animated_materials};
use crate::material::Material;
use crate::mesh::{MeshData, to_wow_position};

/// Loop length of the idle sequence when nothing animates.
const DEFAULT_SEQUENCE_MS: u32 = 1000;

/// Settings for one model build.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelObjectOptions {
    pub world_scale: f32,
    pub apply_coordinate_transform: bool,
    /// Padding floor of the render bounding box.
    pub min_bounding_box_size: f32,
    /// Padding of the collision bounding box.
    pub collision_padding: f32,
    /// Client folder holding the textures, without trailing separator.
    pub texture_folder: String,
}

impl ModelObjectOptions {
    #[must_use]
    pub fn from_config(config: &ConversionConfig, texture_folder: impl Into<String>) -> Self {
        Self {
            world_scale: config.world_scale,
            apply_coordinate_transform: config.apply_coordinate_transform,
            min_bounding_box_size: config.static_object_min_bounding_box_size,
            collision_padding: config.added_boundary_amount,
            texture_folder: texture_folder.into(),
        }
    }
}

/// Geometry and materials of one model.
#[derive(Debug, Clone, Copy)]
pub struct ModelSource<'a> {
    pub name: &'a str,
    pub materials: &'a [Material],
    pub mesh: &'a MeshData,
    /// Collision geometry in source space; `None` for walk-through models.
    pub collision: Option<&'a MeshData>,
}

/// A converted model and its single skin profile.
#[derive(Debug, Clone)]
pub struct ModelObject {
    pub name: String,
    pub model: M2Model,
    pub skin: M2Skin,
}

impl ModelObject {
    /// Serialize to `(m2, skin)` byte buffers.
    pub fn to_bytes(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        Ok((self.model.to_bytes()?, self.skin.to_bytes()?))
    }
}

/// Collision arrays of a model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionData {
    pub positions: Vec<Vec3>,
    pub triangles: Vec<TriangleFace>,
    pub face_normals: Vec<Vec3>,
    pub bounds: BoundingBox,
    pub radius: f32,
}

/// Build the model for `source`.
pub fn build_model_object(source: &ModelSource<'_>, options: &ModelObjectOptions) -> Result<ModelObject> {
    source.mesh.validate(source.name)?;

    let mut mesh = source.mesh.sorted_by_material();
    if options.apply_coordinate_transform {
        mesh = mesh.to_wow_coordinates(options.world_scale);
    }

    let expansion = expand_animated_materials(&mesh, source.materials)?;
    // Textureless materials have nothing to draw.
    let materials: Vec<Material> = expansion
        .materials
        .iter()
        .filter(|material| !material.texture_names.is_empty())
        .cloned()
        .collect();
    let drawn: HashSet<u32> = materials.iter().map(|m| m.index).collect();
    let mut mesh = expansion.mesh.clone();
    mesh.triangles.retain(|face| drawn.contains(&face.material));
    let mesh = correct_texture_coordinates(&mesh.sorted_by_material(), &materials)?;

    let bounds = mesh.bounding_box(options.min_bounding_box_size);
    let radius = bounds.furthest_point_distance_from_center();
    let collision = match source.collision {
        Some(collision_mesh) => collision_data(collision_mesh, options)?,
        None => CollisionData::default(),
    };

    let mut model = M2Model {
        name: source.name.to_string(),
        global_loops: expansion.global_loops.clone(),
        bones: vec![M2Bone::root()],
        key_bone_lookup: vec![-1],
        bone_lookup: vec![0],
        replaceable_texture_lookup: vec![-1],
        sequence_lookup: vec![0],
        skin_profile_count: 1,
        texture_unit_lookup: vec![0],
        bounds,
        bounds_radius: radius,
        collision_bounds: collision.bounds,
        collision_radius: collision.radius,
        collision_positions: collision.positions.clone(),
        collision_normals: collision.face_normals.clone(),
        ..M2Model::default()
    };
    for face in &collision.triangles {
        model.collision_indices.extend(face.to_u16()?);
    }

    let duration = expansion
        .global_loops
        .iter()
        .copied()
        .max()
        .unwrap_or(DEFAULT_SEQUENCE_MS);
    model.sequences.push(M2Sequence::stand(duration, bounds, radius));

    model.vertices = mesh
        .positions
        .iter()
        .zip(&mesh.normals)
        .zip(&mesh.texture_coordinates)
        .map(|((&position, &normal), &uv)| M2Vertex::new(position, normal, uv))
        .collect();

    for (slot, material) in materials.iter().enumerate() {
        let slot = slot as u16;
        let texture = material.render_textures().into_iter().next().unwrap_or_default();
        model.textures.push(M2Texture {
            kind: 0,
            flags: texture_flags::WRAP_X | texture_flags::WRAP_Y,
            path: format!("{}\\{texture}.blp", options.texture_folder),
        });
        model.materials.push(M2Material {
            flags: if material.kind.is_unlit() {
                material_flags::UNLIT
            } else {
                0
            },
            blend_mode: material.kind.blend_mode(),
        });
        model.texture_lookup.push(slot);
        model.transparency_lookup.push(slot);
        model.transparency_tracks.push(
            expansion
                .transparency_tracks
                .get(&material.index)
                .cloned()
                .unwrap_or_else(|| TransparencyTrack::constant(i16::MAX)),
        );
        match expansion.texture_transforms.get(&material.index) {
            Some(track) => {
                model
                    .texture_transform_lookup
                    .push(model.texture_transforms.len() as i16);
                model
                    .texture_transforms
                    .push(M2TextureTransform::translation(track.clone()));
            }
            None => model.texture_transform_lookup.push(-1),
        }
    }

    let skin = M2Skin::build(&mesh, &materials)?;
    tracing::debug!(
        "Built model '{}': {} vertices, {} materials, {} global loops",
        source.name,
        model.vertices.len(),
        model.materials.len(),
        model.global_loops.len()
    );
    Ok(ModelObject {
        name: source.name.to_string(),
        model,
        skin,
    })
}

/// Correct every vertex once, through the material of the first triangle
/// that references it.
fn correct_texture_coordinates(mesh: &MeshData, materials: &[Material]) -> Result<MeshData> {
    let by_index: HashMap<u32, &Material> = materials.iter().map(|m| (m.index, m)).collect();
    let mut corrected = mesh.clone();
    let mut done = vec![false; mesh.vertex_count()];
    for face in &mesh.triangles {
        let Some(material) = by_index.get(&face.material) else {
            continue;
        };
        for index in face.indices() {
            let index = index as usize;
            if !done[index] {
                corrected.texture_coordinates[index] =
                    material.corrected_base_coordinates(mesh.texture_coordinates[index])?;
                done[index] = true;
            }
        }
    }
    Ok(corrected)
}

/// Transform collision geometry and derive its face normals and bounds.
///
/// Triangles whose first two indices coincide are dropped. Collision meshes
/// may omit normals and texture coordinates, so only indices are checked.
pub fn collision_data(mesh: &MeshData, options: &ModelObjectOptions) -> Result<CollisionData> {
    mesh.validate_indices()?;
    let positions: Vec<Vec3> = if options.apply_coordinate_transform {
        mesh.positions
            .iter()
            .map(|&p| to_wow_position(p, options.world_scale))
            .collect()
    } else {
        mesh.positions.clone()
    };
    let triangles: Vec<TriangleFace> = mesh.triangles.iter().filter(|f| f.v1 != f.v2).copied().collect();
    let face_normals = triangles
        .iter()
        .map(|face| {
            let [a, b, c] = face.indices().map(|i| positions[i as usize]);
            -(b - a).cross(c - a).normalize_or_zero()
        })
        .collect();
    let bounds = BoundingBox::from_points(positions.iter().copied(), options.collision_padding);
    let radius = bounds.furthest_point_distance_from_center();
    for face in &triangles {
        face.to_u16()?;
    }
    Ok(CollisionData {
        positions,
        triangles,
        face_normals,
        bounds,
        radius,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::formats::m2::read_summary;
    use crate::geometry::OPACITY_OPAQUE;
    use crate::material::{MaterialAnimation, MaterialKind};
    use crate::mesh::test_support::grid_mesh;
    use pretty_assertions::assert_eq;

    fn options() -> ModelObjectOptions {
        ModelObjectOptions {
            world_scale: 0.25,
            apply_coordinate_transform: true,
            min_bounding_box_size: 0.5,
            collision_padding: 1.0,
            texture_folder: "World\\Everquest\\StaticObjects".to_string(),
        }
    }

    fn crate_mesh() -> (MeshData, Vec<Material>) {
        let mut mesh = grid_mesh(2, 1, 0);
        mesh.triangles[2].material = 1;
        mesh.triangles[3].material = 1;
        let materials = vec![
            Material::new(0, "wood", MaterialKind::Diffuse, vec!["wood".to_string()]),
            Material::new(1, "fire", MaterialKind::TransparentAdditive, vec![
                "fire1".to_string(),
                "fire2".to_string(),
                "fire3".to_string(),
            ])
            .with_animation(MaterialAnimation::FrameSwap { delay_ms: 100 }),
        ];
        (mesh, materials)
    }

    #[test]
    fn test_static_object() {
        let mesh = grid_mesh(1, 1, 0);
        let materials = vec![Material::new(0, "stone", MaterialKind::Diffuse, vec!["stone".to_string()])];
        let source = ModelSource {
            name: "rock",
            materials: &materials,
            mesh: &mesh,
            collision: Some(&mesh),
        };
        let object = build_model_object(&source, &options()).unwrap();

        assert_eq!(object.model.vertices.len(), 4);
        assert_eq!(object.model.textures[0].path, "World\\Everquest\\StaticObjects\\stone.blp");
        assert_eq!(object.model.sequences[0].duration_ms, DEFAULT_SEQUENCE_MS);
        assert_eq!(object.model.transparency_tracks[0].keyframes.len(), 1);
        assert_eq!(object.model.transparency_tracks[0].keyframes[0].value, OPACITY_OPAQUE);
        assert_eq!(object.model.collision_indices.len(), 6);
        assert_eq!(object.model.collision_normals.len(), 2);
        assert_eq!(object.skin.submeshes.len(), 1);

        let (m2, skin) = object.to_bytes().unwrap();
        let summary = read_summary(&m2).unwrap();
        assert_eq!(summary.name, "rock");
        assert_eq!(summary.collision_triangle_count, 2);
        assert_eq!(&skin[0..4], b"SKIN");
    }

    #[test]
    fn test_animated_object() {
        let (mesh, materials) = crate_mesh();
        let source = ModelSource {
            name: "brazier",
            materials: &materials,
            mesh: &mesh,
            collision: None,
        };
        let object = build_model_object(&source, &options()).unwrap();
        let model = &object.model;

        // wood + three fire frames
        assert_eq!(model.materials.len(), 4);
        assert_eq!(model.global_loops, vec![300]);
        assert_eq!(model.sequences[0].duration_ms, 300);
        assert_eq!(model.transparency_tracks[1].global_sequence, Some(0));
        assert_eq!(object.skin.submeshes.len(), 4);
        assert!(model.collision_indices.is_empty());
        assert!(object.model.textures[1].path.ends_with("fire1.blp"));
        assert!(object.model.textures[3].path.ends_with("fire3.blp"));
    }

    #[test]
    fn test_collision_normals_face_away_from_winding() {
        let mut mesh = MeshData::new();
        mesh.positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        mesh.normals = vec![Vec3::Z; 3];
        mesh.texture_coordinates = vec![Default::default(); 3];
        mesh.triangles = vec![TriangleFace::new(0, 0, 1, 2), TriangleFace::new(0, 1, 1, 2)];
        let mut options = options();
        options.apply_coordinate_transform = false;
        let collision = collision_data(&mesh, &options).unwrap();
        assert_eq!(collision.triangles.len(), 1);
        assert_eq!(collision.face_normals[0], -Vec3::Z);
    }

    #[test]
    fn test_half_texel_correction_applies_once() {
        let mut mesh = grid_mesh(1, 1, 0);
        mesh.texture_coordinates = vec![Default::default(); 4];
        let materials =
            vec![Material::new(0, "stone", MaterialKind::Diffuse, vec!["stone".to_string()]).with_source_size(64, 64)];
        let source = ModelSource {
            name: "slab",
            materials: &materials,
            mesh: &mesh,
            collision: None,
        };
        let object = build_model_object(&source, &options()).unwrap();
        for vertex in &object.model.vertices {
            assert_eq!(vertex.texture_coordinates[0], [0.5 / 64.0, 0.5 / 64.0]);
        }
    }

    #[test]
    fn test_bad_collision_index_is_an_error() {
        let (mesh, materials) = crate_mesh();
        let mut collision = grid_mesh(1, 1, 0);
        collision.triangles[0].v3 = 99;
        let result = build_model_object(
            &ModelSource {
                name: "crate",
                materials: &materials,
                mesh: &mesh,
                collision: Some(&collision),
            },
            &options(),
        );
        assert!(matches!(
            result,
            Err(Error::TriangleIndexOutOfRange {
                triangle: 0,
                index: 99,
                vertex_count: 4
            })
        ));
    }

    #[test]
    fn test_positions_only_collision_is_accepted() {
        let mut collision = grid_mesh(1, 1, 0);
        collision.normals.clear();
        collision.texture_coordinates.clear();
        let data = collision_data(&collision, &options()).unwrap();
        assert_eq!(data.triangles.len(), 2);
        assert_eq!(data.face_normals.len(), 2);
    }

    #[test]
    fn test_invalid_mesh_is_rejected() {
        let mut mesh = grid_mesh(1, 1, 0);
        mesh.normals.pop();
        let materials = vec![Material::new(0, "stone", MaterialKind::Diffuse, vec!["stone".to_string()])];
        let source = ModelSource {
            name: "broken",
            materials: &materials,
            mesh: &mesh,
            collision: None,
        };
        assert!(matches!(
            build_model_object(&source, &options()),
            Err(Error::VertexAttributeMismatch { .. })
        ));
    }
}
