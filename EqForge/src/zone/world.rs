//! Zone world assembly
//!
//! Builds everything a zone turns into: the root world object and its
//! groups, the models lifted out of animated surfaces, the map descriptor
//! and the area triggers.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};

use glam::EulerRot;
use serde::{Deserialize, Serialize};

use super::lights::LightInstance;
use super::properties::{Continent, ZoneProperties};
use super::triggers::{AreaTrigger, area_triggers};
use crate::common::{ColorRgba, Quat, Vec3};
use crate::config::ConversionConfig;
use crate::converter::paths;
use crate::error::{Error, Result};
use crate::formats::wmo::root::DEFAULT_DOODAD_SET;
use crate::formats::wmo::{
    NO_MATERIAL, WmoDoodad, WmoDoodadSet, WmoFog, WmoGroup, WmoGroupInfo, WmoMaterial, WmoRoot, material_flags,
};
use crate::formats::{WdtFile, empty_wdl};
use crate::geometry::{PartitionOptions, partition_mesh};
use crate::ids::{IdAllocator, ZoneIds};
use crate::input::{ObjectInstance, ZoneSource};
use crate::material::Material;
use crate::mesh::MeshData;
use crate::object::{ModelObject, ModelObjectOptions, ModelSource, build_model_object};

/// Identifiers and metadata of a converted zone, for the database tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub short_name: String,
    pub descriptive_name: String,
    pub continent: Continent,
    pub map_id: u32,
    pub area_id: u32,
    pub wmo_id: u32,
    pub loading_screen_id: u32,
    pub first_group_id: u32,
    pub group_count: u32,
    /// Safe spawn point in destination coordinates.
    pub safe_position: Vec3,
    pub safe_orientation: f32,
}

/// A fully assembled zone.
#[derive(Debug, Clone)]
pub struct ZoneWorld {
    pub record: ZoneRecord,
    pub root: WmoRoot,
    /// Groups in `MOGI` order.
    pub groups: Vec<WmoGroup>,
    /// Models generated from animated surfaces, placed as doodads.
    pub zone_objects: Vec<ModelObject>,
    pub triggers: Vec<AreaTrigger>,
    pub wdt: WdtFile,
}

impl ZoneWorld {
    /// Serialized root and group files.
    pub fn wmo_bytes(&self) -> Result<(Vec<u8>, Vec<Vec<u8>>)> {
        let groups = self.groups.iter().map(WmoGroup::to_bytes).collect::<Result<_>>()?;
        Ok((self.root.to_bytes()?, groups))
    }

    pub fn wdt_bytes(&self) -> Result<Vec<u8>> {
        self.wdt.to_bytes()
    }

    pub fn wdl_bytes(&self) -> Result<Vec<u8>> {
        empty_wdl()
    }
}

/// Assemble `source` into a zone.
pub fn build_zone(
    source: &ZoneSource,
    properties: &ZoneProperties,
    lights: &[LightInstance],
    config: &ConversionConfig,
    ids: &IdAllocator,
) -> Result<ZoneWorld> {
    let zone = source.short_name.as_str();
    tracing::info!("Building zone '{}'", zone);
    source.mesh.validate(zone)?;

    let mesh = if config.apply_coordinate_transform {
        source.mesh.to_wow_coordinates(config.world_scale)
    } else {
        source.mesh.clone()
    };

    let lifted: Vec<&Material> = source
        .materials
        .iter()
        .filter(|material| material.is_animated() && material.is_renderable())
        .collect();
    let lifted_names: HashSet<&str> = lifted.iter().map(|m| m.name.as_str()).collect();

    let mut doodads: Vec<WmoDoodad> = source
        .object_instances
        .iter()
        .map(|instance| instance_doodad(instance, config))
        .collect();
    let zone_objects = build_zone_objects(zone, &mesh, &lifted, config)?;
    for object in &zone_objects {
        doodads.push(WmoDoodad {
            model_path: paths::zone_object_client_path(zone, &object.name),
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            scale: 1.0,
            color: ColorRgba::new(255, 255, 255, 255),
        });
    }

    let static_materials: Vec<&Material> = source
        .materials
        .iter()
        .filter(|material| !lifted_names.contains(material.name.as_str()))
        .collect();
    let buckets = material_buckets(&mesh, &static_materials, &lifted_names, &properties.material_groups);
    let partitioned = partition_mesh(&mesh, &source.materials, &buckets, &PartitionOptions::from(config))?;

    let (materials, material_slots) = world_materials(zone, &static_materials)?;
    let zone_ids = ids.allocate_zone();
    let first_group_id = ids.allocate_wmo_groups(partitioned.len() as u32);

    let mut groups = Vec::with_capacity(partitioned.len());
    let mut group_infos = Vec::with_capacity(partitioned.len());
    for (index, part) in partitioned.into_iter().enumerate() {
        let bounds = part.geometry.mesh.bounding_box(config.added_boundary_amount);
        let group = WmoGroup::from_geometry(part.geometry.mesh, &material_slots, bounds, first_group_id + index as u32)?;
        group_infos.push(WmoGroupInfo {
            flags: group.flags,
            bounds,
            name: format!("{zone}_{index:03}"),
        });
        groups.push(group);
    }

    let root = WmoRoot {
        materials,
        groups: group_infos,
        lights: lights.iter().map(|light| light.to_wmo_light(config.world_scale)).collect(),
        doodad_sets: vec![WmoDoodadSet {
            name: DEFAULT_DOODAD_SET.to_string(),
            first_instance: 0,
            count: doodads.len() as u32,
        }],
        doodads,
        fogs: vec![zone_fog(properties, config.world_scale)],
        ambient: source.ambient_light,
        wmo_id: zone_ids.wmo_id,
        bounds: mesh.bounding_box(config.added_boundary_amount),
        flags: 0,
    };
    let name_offsets = root.group_name_offsets();
    let groups: Vec<WmoGroup> = groups
        .into_iter()
        .zip(&name_offsets)
        .map(|(group, &offset)| group.with_name_offsets(offset, offset))
        .collect();

    let record = zone_record(properties, zone_ids, ids, first_group_id, groups.len(), config);
    let wdt = WdtFile::new(paths::zone_wmo_client_path(zone), root.bounds);
    tracing::info!(
        "Built zone '{}': {} groups, {} doodads, {} zone objects",
        zone,
        groups.len(),
        root.doodads.len(),
        zone_objects.len()
    );
    Ok(ZoneWorld {
        record,
        root,
        groups,
        zone_objects,
        triggers: area_triggers(properties, config.world_scale),
        wdt,
    })
}

/// Configured groups first (minus lifted names), then one bucket with every
/// remaining static material that has triangles.
fn material_buckets(
    mesh: &MeshData,
    static_materials: &[&Material],
    lifted: &HashSet<&str>,
    configured: &[Vec<String>],
) -> Vec<Vec<String>> {
    let used: HashSet<u32> = mesh.triangles.iter().map(|face| face.material).collect();

    let mut claimed: HashSet<&str> = HashSet::new();
    let mut buckets = Vec::new();
    for group in configured {
        let names: Vec<String> = group
            .iter()
            .filter(|name| !lifted.contains(name.as_str()))
            .cloned()
            .collect();
        claimed.extend(group.iter().map(String::as_str));
        if !names.is_empty() {
            buckets.push(names);
        }
    }

    let remaining: Vec<String> = static_materials
        .iter()
        .filter(|material| !claimed.contains(material.name.as_str()) && used.contains(&material.index))
        .map(|material| material.name.clone())
        .collect();
    if !remaining.is_empty() {
        buckets.push(remaining);
    }
    buckets
}

/// `MOMT` entries for every renderable static material and the slot each
/// source material index maps to.
fn world_materials(zone: &str, static_materials: &[&Material]) -> Result<(Vec<WmoMaterial>, HashMap<u32, u8>)> {
    let folder = paths::zone_texture_folder(zone);
    let mut materials = Vec::new();
    let mut slots = HashMap::new();
    for material in static_materials.iter().filter(|m| m.is_renderable()) {
        let slot = u8::try_from(materials.len())
            .ok()
            .filter(|&slot| slot != NO_MATERIAL)
            .ok_or(Error::MaterialIndexOverflow {
                index: materials.len(),
                bits: 8,
            })?;
        let texture = material.render_textures().into_iter().next().unwrap_or_default();
        materials.push(WmoMaterial {
            flags: if material.kind.is_unlit() {
                material_flags::DISABLE_LIGHTING
            } else {
                0
            },
            shader: 0,
            blend_mode: material.kind.world_blend_mode(),
            texture: format!("{folder}\\{texture}.blp"),
            emissive: ColorRgba::default(),
            diffuse: ColorRgba::new(255, 255, 255, 255),
            ground_type: 0,
        });
        slots.insert(material.index, slot);
    }
    Ok((materials, slots))
}

/// One model per animated surface, built from the already transformed mesh.
fn build_zone_objects(
    zone: &str,
    mesh: &MeshData,
    lifted: &[&Material],
    config: &ConversionConfig,
) -> Result<Vec<ModelObject>> {
    let options = ModelObjectOptions {
        apply_coordinate_transform: false,
        ..ModelObjectOptions::from_config(config, paths::zone_object_folder(zone))
    };
    let mut objects = Vec::with_capacity(lifted.len());
    for material in lifted {
        let extracted = mesh.extract_for_material(material.index).mesh;
        if extracted.triangles.is_empty() {
            tracing::debug!("Animated material '{}' is unused in zone '{}'", material.name, zone);
            continue;
        }
        let name = format!("ZO_{zone}_{}", material.name);
        let materials = [(*material).clone()];
        let source = ModelSource {
            name: &name,
            materials: &materials,
            mesh: &extracted,
            collision: None,
        };
        objects.push(build_model_object(&source, &options)?);
    }
    Ok(objects)
}

/// Place a static object: Y and Z swap, X and Y rotate 180 degrees.
fn instance_doodad(instance: &ObjectInstance, config: &ConversionConfig) -> WmoDoodad {
    let source = instance.position;
    let (position, orientation) = if config.apply_coordinate_transform {
        let scale = config.world_scale;
        (
            Vec3::new(-source.x * scale, -source.z * scale, source.y * scale),
            instance_orientation(instance.rotation),
        )
    } else {
        (Vec3::new(source.x, source.z, source.y), instance_orientation(instance.rotation))
    };
    WmoDoodad {
        model_path: paths::static_object_client_path(&instance.model_name),
        position,
        orientation,
        scale: instance.scale,
        color: ColorRgba::new(255, 255, 255, 255),
    }
}

/// Yaw about Y from -Z, pitch about X, roll about Z from Y, in degrees.
/// W is negated for the destination handedness.
fn instance_orientation(rotation: Vec3) -> Quat {
    let yaw = (-rotation.z).to_radians();
    let pitch = rotation.x.to_radians();
    let roll = rotation.y.to_radians();
    let q = Quat::from_euler(EulerRot::YXZ, yaw, pitch, roll);
    Quat::from_xyzw(q.x, q.y, q.z, -q.w)
}

fn zone_fog(properties: &ZoneProperties, world_scale: f32) -> WmoFog {
    let Some(fog) = properties.fog else {
        return WmoFog::default();
    };
    let end = fog.max_clip * world_scale;
    let start_scalar = if fog.max_clip > 0.0 {
        (fog.min_clip / fog.max_clip).clamp(0.0, 1.0)
    } else {
        0.0
    };
    WmoFog {
        end,
        start_scalar,
        color: fog.color_rgba(),
        ..WmoFog::default()
    }
}

fn zone_record(
    properties: &ZoneProperties,
    zone_ids: ZoneIds,
    ids: &IdAllocator,
    first_group_id: u32,
    group_count: usize,
    config: &ConversionConfig,
) -> ZoneRecord {
    let safe_position = if config.apply_coordinate_transform {
        crate::mesh::to_wow_position(properties.safe_position, config.world_scale)
    } else {
        properties.safe_position
    };
    ZoneRecord {
        short_name: properties.short_name.clone(),
        descriptive_name: properties.descriptive_name.clone(),
        continent: properties.continent,
        map_id: zone_ids.map_id,
        area_id: zone_ids.area_id,
        wmo_id: zone_ids.wmo_id,
        loading_screen_id: ids.loading_screen_id_start() + properties.continent.loading_screen_offset(),
        first_group_id,
        group_count: group_count as u32,
        safe_position,
        safe_orientation: properties.safe_orientation,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::formats::chunk::read_chunks;
    use crate::formats::wmo::poly_flags;
    use crate::material::{MaterialAnimation, MaterialKind};
    use crate::mesh::test_support::grid_mesh;
    use crate::zone::properties::FogProperties;

    /// Grids for each material, laid side by side along X.
    fn zone_mesh(parts: &[(u32, u32, u32)]) -> MeshData {
        let mut mesh = MeshData::new();
        let mut x_offset = 0.0;
        for &(cols, rows, material) in parts {
            let grid = grid_mesh(cols, rows, material);
            let base = mesh.vertex_count() as u32;
            mesh.positions
                .extend(grid.positions.iter().map(|p| *p + Vec3::new(x_offset, 0.0, 0.0)));
            mesh.normals.extend(&grid.normals);
            mesh.texture_coordinates.extend(&grid.texture_coordinates);
            mesh.triangles.extend(grid.triangles.iter().map(|face| face.offset_by(base)));
            x_offset += cols as f32 + 1.0;
        }
        mesh
    }

    fn zone_source() -> ZoneSource {
        ZoneSource {
            short_name: "arena".to_string(),
            ambient_light: ColorRgba::new(10, 20, 30, 255),
            materials: vec![
                Material::new(0, "sand", MaterialKind::Diffuse, vec!["sand".to_string()]),
                Material::new(1, "wall", MaterialKind::Boundary, vec![]),
                Material::new(2, "water", MaterialKind::Transparent50Percent, vec![
                    "water1".to_string(),
                    "water2".to_string(),
                ])
                .with_animation(MaterialAnimation::FrameSwap { delay_ms: 250 }),
            ],
            mesh: zone_mesh(&[(4, 4, 0), (2, 1, 1), (2, 2, 2)]),
            object_instances: vec![ObjectInstance {
                model_name: "torch".to_string(),
                position: Vec3::new(4.0, 8.0, 12.0),
                rotation: Vec3::ZERO,
                scale: 2.0,
            }],
        }
    }

    fn build(source: &ZoneSource, properties: &ZoneProperties, config: &ConversionConfig) -> ZoneWorld {
        build_zone(source, properties, &[], config, &IdAllocator::new(&config.ids)).unwrap()
    }

    #[test]
    fn test_animated_material_is_lifted() {
        let source = zone_source();
        let world = build(&source, &ZoneProperties::new("arena"), &ConversionConfig::default());

        assert_eq!(world.zone_objects.len(), 1);
        assert_eq!(world.zone_objects[0].name, "ZO_arena_water");
        // 32 sand and 4 boundary triangles stay in the world object.
        let triangles: usize = world.groups.iter().map(|g| g.mesh.triangle_count()).sum();
        assert_eq!(triangles, 36);
        assert_eq!(world.root.materials.len(), 1);
        assert!(world.root.materials[0].texture.ends_with("ZoneTextures\\arena\\sand.blp"));
    }

    #[test]
    fn test_doodads_and_default_set() {
        let source = zone_source();
        let world = build(&source, &ZoneProperties::new("arena"), &ConversionConfig::default());

        let doodads = &world.root.doodads;
        assert_eq!(doodads.len(), 2);
        assert_eq!(doodads[0].model_path, "World\\Everquest\\StaticObjects\\torch.m2");
        assert_eq!(doodads[0].position, Vec3::new(-1.0, -3.0, 2.0));
        assert_eq!(doodads[0].scale, 2.0);
        assert_eq!(
            doodads[1].model_path,
            "World\\Everquest\\ZoneObjects\\arena\\ZO_arena_water.m2"
        );
        assert_eq!(doodads[1].position, Vec3::ZERO);
        assert_eq!(
            world.root.doodad_sets,
            vec![WmoDoodadSet {
                name: DEFAULT_DOODAD_SET.to_string(),
                first_instance: 0,
                count: 2,
            }]
        );
    }

    #[test]
    fn test_boundary_faces_are_collision_only() {
        let source = zone_source();
        let world = build(&source, &ZoneProperties::new("arena"), &ConversionConfig::default());

        let polys: Vec<(u8, u8)> = world.groups.iter().flat_map(|g| g.poly_materials.clone()).collect();
        let collision = polys.iter().filter(|&&(flags, _)| flags == poly_flags::COLLISION).count();
        assert_eq!(collision, 4);
        assert!(world.groups.iter().all(|g| g.batches.iter().all(|b| b.material == 0)));
    }

    #[test]
    fn test_configured_material_groups_come_first() {
        let mut source = zone_source();
        source.materials.push(Material::new(3, "lava", MaterialKind::Diffuse, vec!["lava".to_string()]));
        source.mesh = zone_mesh(&[(4, 4, 0), (2, 1, 1), (2, 2, 2), (1, 1, 3)]);
        let mut properties = ZoneProperties::new("arena");
        properties.material_groups = vec![vec!["lava".to_string(), "water".to_string()]];

        let world = build(&source, &properties, &ConversionConfig::default());
        assert_eq!(world.groups.len(), 2);
        assert_eq!(world.groups[0].mesh.triangle_count(), 2);
        assert_eq!(world.groups[1].mesh.triangle_count(), 36);
    }

    #[test]
    fn test_ids_and_group_names() {
        let source = zone_source();
        let config = ConversionConfig {
            max_faces_per_group: 10,
            ..ConversionConfig::default()
        };
        let mut properties = ZoneProperties::new("arena");
        properties.continent = Continent::Velious;
        let world = build(&source, &properties, &config);

        assert!(world.groups.len() > 1);
        assert_eq!(world.record.first_group_id, 30000);
        assert_eq!(world.record.group_count as usize, world.groups.len());
        assert_eq!(world.record.loading_screen_id, 257);
        assert_eq!(world.root.wmo_id, world.record.wmo_id);
        for (index, group) in world.groups.iter().enumerate() {
            assert_eq!(group.group_id, 30000 + index as u32);
            assert_eq!(world.root.groups[index].name, format!("arena_{index:03}"));
            assert!(group.mesh.triangle_count() <= 10);
        }
        assert_eq!(world.groups[1].name_offset, 12);
    }

    #[test]
    fn test_fog_from_properties() {
        let mut properties = ZoneProperties::new("arena");
        properties.fog = Some(FogProperties {
            color: [100, 110, 120],
            min_clip: 10.0,
            max_clip: 1000.0,
        });
        let fog = zone_fog(&properties, 0.25);
        assert_eq!(fog.end, 250.0);
        assert_eq!(fog.start_scalar, 0.01);
        assert_eq!(fog.color, ColorRgba::new(100, 110, 120, 255));
        assert_eq!(zone_fog(&ZoneProperties::new("x"), 0.25), WmoFog::default());
    }

    #[test]
    fn test_instance_orientation_identity() {
        let q = instance_orientation(Vec3::ZERO);
        assert_eq!(q, Quat::from_xyzw(0.0, 0.0, 0.0, -1.0));
        let yaw = instance_orientation(Vec3::new(0.0, 0.0, 90.0));
        let expected = Quat::from_rotation_y(-90f32.to_radians());
        assert!((yaw.y - expected.y).abs() < 1e-6);
        assert!((yaw.w + expected.w).abs() < 1e-6);
    }

    #[test]
    fn test_zone_files_serialize() {
        let source = zone_source();
        let world = build(&source, &ZoneProperties::new("arena"), &ConversionConfig::default());
        let (root, groups) = world.wmo_bytes().unwrap();
        assert_eq!(read_chunks(&root).unwrap().len(), 17);
        assert_eq!(groups.len(), world.groups.len());
        let wdt = read_chunks(&world.wdt_bytes().unwrap()).unwrap().len();
        assert_eq!(wdt, 5);
        assert!(!world.wdl_bytes().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_configured_material_fails() {
        let source = zone_source();
        let mut properties = ZoneProperties::new("arena");
        properties.material_groups = vec![vec!["nothing".to_string()]];
        let result = build_zone(
            &source,
            &properties,
            &[],
            &ConversionConfig::default(),
            &IdAllocator::default(),
        );
        assert!(matches!(result, Err(Error::MaterialNotFound { name }) if name == "nothing"));
    }
}
