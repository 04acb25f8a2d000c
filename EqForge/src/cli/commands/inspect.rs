//! Inspect command: chunk listing or M2 header summary

use std::path::Path;

use crate::formats::m2::read_summary;
use crate::formats::read_chunks;

const M2_MAGIC: &[u8; 4] = b"MD20";

pub fn execute(file: &Path) -> anyhow::Result<()> {
    let data = std::fs::read(file)?;
    println!("File: {} ({} bytes)", file.display(), data.len());

    if data.starts_with(M2_MAGIC) {
        let summary = read_summary(&data)?;
        println!("  Format: M2 (version {})", summary.version);
        println!("  Name: {}", summary.name);
        println!("  Flags: {:#x}", summary.flags);
        println!("  Header size: {}", summary.header_size);
        println!("  Global loops: {}", summary.global_loop_count);
        println!("  Sequences: {}", summary.sequence_count);
        println!("  Bones: {}", summary.bone_count);
        println!("  Vertices: {}", summary.vertex_count);
        println!("  Skin profiles: {}", summary.skin_profile_count);
        println!("  Textures: {}", summary.texture_count);
        println!("  Materials: {}", summary.material_count);
        println!("  Collision triangles: {}", summary.collision_triangle_count);
        return Ok(());
    }

    let chunks = read_chunks(&data)?;
    println!("  Chunks: {}", chunks.len());
    for chunk in &chunks {
        println!("  {:>10}  {}  {} bytes", chunk.offset, chunk.token, chunk.payload.len());
    }
    Ok(())
}
