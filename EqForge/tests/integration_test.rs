use eqforge::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// A `cols` x `rows` grid of unit quads on the XY plane.
fn grid(cols: u32, rows: u32, material: u32) -> MeshData {
    let mut mesh = MeshData::new();
    for y in 0..=rows {
        for x in 0..=cols {
            mesh.positions.push(Vec3::new(x as f32, y as f32, 0.0));
            mesh.normals.push(Vec3::Z);
            mesh.texture_coordinates
                .push(TextureCoordinates::new(x as f32 / cols as f32, y as f32 / rows as f32));
        }
    }
    let stride = cols + 1;
    for y in 0..rows {
        for x in 0..cols {
            let i = y * stride + x;
            mesh.triangles.push(TriangleFace::new(material, i, i + 1, i + stride));
            mesh.triangles
                .push(TriangleFace::new(material, i + 1, i + stride + 1, i + stride));
        }
    }
    mesh
}

fn arena_source() -> ZoneSource {
    let mut mesh = grid(8, 8, 0);
    let water = grid(2, 2, 1);
    let base = mesh.positions.len() as u32;
    mesh.positions
        .extend(water.positions.iter().map(|p| *p + Vec3::new(10.0, 0.0, 0.0)));
    mesh.normals.extend(&water.normals);
    mesh.texture_coordinates.extend(&water.texture_coordinates);
    mesh.triangles.extend(water.triangles.iter().map(|f| f.offset_by(base)));

    ZoneSource {
        short_name: "arena".to_string(),
        ambient_light: ColorRgba::new(32, 32, 32, 255),
        materials: vec![
            Material::new(0, "sand", MaterialKind::Diffuse, vec!["sand".to_string()]),
            Material::new(1, "water", MaterialKind::Transparent50Percent, vec![
                "water1".to_string(),
                "water2".to_string(),
            ])
            .with_animation(MaterialAnimation::FrameSwap { delay_ms: 250 }),
        ],
        mesh,
        object_instances: vec![ObjectInstance {
            model_name: "torch".to_string(),
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::new(0.0, 0.0, 90.0),
            scale: 1.0,
        }],
    }
}

fn torch_source() -> ObjectSource {
    ObjectSource {
        name: "torch".to_string(),
        materials: vec![Material::new(0, "wood", MaterialKind::Diffuse, vec!["wood".to_string()])],
        mesh: grid(2, 2, 0),
        collision: None,
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string(value).unwrap()).unwrap();
}

#[test]
fn test_large_zone_partition() {
    // 320 x 313 quads: a little over 200k triangles and 100k vertices.
    let mesh = grid(320, 313, 0);
    let materials = vec![Material::new(0, "grass", MaterialKind::Diffuse, vec!["grass".to_string()])];
    let options = PartitionOptions {
        max_faces_per_group: 50_000,
        ..PartitionOptions::default()
    };

    let groups = partition_mesh(&mesh, &materials, &[vec!["grass".to_string()]], &options).unwrap();
    assert!(groups.len() >= 4);

    let mut seen = HashSet::new();
    for group in &groups {
        let triangles = group.geometry.mesh.triangle_count();
        assert!(triangles <= 50_000);
        assert!(group.geometry.mesh.vertex_count() <= 65_535);
        for index in 0..triangles {
            seen.insert(group.geometry.source_triangle(index).indices());
        }
    }
    assert_eq!(seen.len(), mesh.triangle_count());
}

#[test]
fn test_flip_book_loop() {
    let mesh = grid(1, 1, 0);
    let materials = vec![
        Material::new(0, "lava", MaterialKind::Diffuse, (0..4).map(|i| format!("lava{i}")).collect())
            .with_animation(MaterialAnimation::FrameSwap { delay_ms: 250 }),
    ];

    let expansion = expand_animated_materials(&mesh, &materials).unwrap();
    assert_eq!(expansion.global_loops, vec![1000]);
    assert_eq!(expansion.materials.len(), 4);
    assert_eq!(expansion.mesh.triangle_count(), 8);
    for t in (0..1000).step_by(50) {
        let visible = expansion
            .transparency_tracks
            .values()
            .filter(|track| track.sample(t) == Some(eqforge::geometry::OPACITY_OPAQUE))
            .count();
        assert_eq!(visible, 1, "t = {t}");
    }
}

#[test]
fn test_zone_end_to_end() {
    let dir = tempdir().unwrap();
    let source_path = dir.path().join("zones/arena/zone.json");
    write_json(&source_path, &arena_source());
    fs::write(
        dir.path().join("zones/arena/lights.txt"),
        "# x, y, z, radius, r, g, b\n0, 0, 10, 30, 1, 0.5, 0.25\n",
    )
    .unwrap();

    let out = dir.path().join("out");
    let config = ConversionConfig::default();
    let catalog = ZoneCatalog::builtin().unwrap();
    let outcome = convert_zone(&source_path, &out, &catalog, &config, &IdAllocator::new(&config.ids)).unwrap();

    let ConvertOutcome::Written(files) = outcome else {
        panic!("zone was skipped");
    };
    assert!(files.iter().all(|f| f.exists()));

    let root = fs::read(out.join("World/wmo/EQ/arena/arena.wmo")).unwrap();
    let chunks = read_chunks(&root).unwrap();
    assert_eq!(chunks[0].token, FourCC::new(b"MVER"));
    assert_eq!(chunks[1].token, FourCC::new(b"MOHD"));
    assert!(chunks.iter().any(|c| c.token == FourCC::new(b"MOLT")));

    assert!(out.join("World/wmo/EQ/arena/arena_000.wmo").exists());
    assert!(out.join("World/Everquest/ZoneObjects/arena/ZO_arena_water.m2").exists());
    assert!(out.join("World/Everquest/ZoneObjects/arena/ZO_arena_water00.skin").exists());
    assert!(out.join("World/Maps/EQ_arena/EQ_arena.wdt").exists());
    assert!(out.join("World/Maps/EQ_arena/EQ_arena.wdl").exists());

    let record: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(files.iter().find(|f| f.ends_with("EQ_arena.json")).unwrap()).unwrap(),
    )
    .unwrap();
    assert_eq!(record["short_name"], "arena");
    assert_eq!(record["wmo_id"], config.ids.wmo_id_start);
}

#[test]
fn test_disabled_continent_is_skipped() {
    let dir = tempdir().unwrap();
    let mut source = arena_source();
    source.short_name = "velketor".to_string();
    let source_path = dir.path().join("zones/velketor/zone.json");
    write_json(&source_path, &source);

    let config = ConversionConfig {
        include_velious: false,
        ..ConversionConfig::default()
    };
    let catalog = ZoneCatalog::builtin().unwrap();
    let outcome = convert_zone(
        &source_path,
        &dir.path().join("out"),
        &catalog,
        &config,
        &IdAllocator::new(&config.ids),
    )
    .unwrap();
    assert!(matches!(outcome, ConvertOutcome::Skipped(_)));
}

#[test]
fn test_object_end_to_end() {
    let dir = tempdir().unwrap();
    let source_path = dir.path().join("objects/torch.json");
    write_json(&source_path, &torch_source());

    let out = dir.path().join("out");
    convert_object(&source_path, &out, &ConversionConfig::default()).unwrap();

    let m2 = fs::read(out.join("World/Everquest/StaticObjects/torch.m2")).unwrap();
    let summary = eqforge::formats::m2::read_summary(&m2).unwrap();
    assert_eq!(summary.name, "torch");
    assert_eq!(summary.vertex_count, 9);
    assert_eq!(summary.header_size, eqforge::formats::m2::header_size(summary.flags));
    assert!(out.join("World/Everquest/StaticObjects/torch00.skin").exists());
}

#[test]
fn test_batch_convert() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("export");
    write_json(&input.join("zones/arena/zone.json"), &arena_source());
    write_json(&input.join("objects/torch.json"), &torch_source());
    fs::write(input.join("objects/broken.json"), "{").unwrap();

    let result = batch_convert(
        &input,
        &dir.path().join("out"),
        &ZoneCatalog::builtin().unwrap(),
        &ConversionConfig::default(),
        |_| {},
    );

    assert_eq!(result.success_count, 2);
    assert_eq!(result.fail_count, 1);
    assert_eq!(result.failures.len(), 1);
    assert!(result.failures[0].contains("broken.json"));
    assert!(result.into_result().is_err());
}

#[test]
fn test_optional_header_section() {
    let object = eqforge::converter::build_static_object(&torch_source(), &ConversionConfig::default()).unwrap();
    let plain = object.model.to_bytes().unwrap();
    assert_eq!(eqforge::formats::m2::read_summary(&plain).unwrap().header_size, 304);

    let mut model = object.model.clone();
    model.blend_mode_overrides = Some(vec![0]);
    let summary = eqforge::formats::m2::read_summary(&model.to_bytes().unwrap()).unwrap();
    assert_eq!(summary.header_size, 312);
    assert_eq!(summary.name, "torch");
    assert_eq!(summary.vertex_count, 9);
}

#[test]
fn test_bad_collision_fails_only_its_object() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("export");
    let mut broken = torch_source();
    broken.name = "brazier".to_string();
    let mut collision = grid(1, 1, 0);
    collision.triangles[0].v3 = 99;
    broken.collision = Some(collision);
    write_json(&input.join("objects/brazier.json"), &broken);
    write_json(&input.join("objects/torch.json"), &torch_source());

    let result = batch_convert(
        &input,
        &dir.path().join("out"),
        &ZoneCatalog::default(),
        &ConversionConfig::default(),
        |_| {},
    );

    assert_eq!(result.success_count, 1);
    assert_eq!(result.fail_count, 1);
    assert!(result.failures[0].contains("brazier.json"));
}
