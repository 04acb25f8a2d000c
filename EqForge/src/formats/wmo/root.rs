//! World map object root file
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use super::{StringBlock, WMO_VERSION};
use crate::common::{BoundingBox, ColorRgba, Quat, Vec3};
use crate::error::{Error, Result};
use crate::formats::chunk::{ChunkWriter, tokens};
use crate::formats::offset::Section;

/// Name of the doodad set every zone carries.
pub const DEFAULT_DOODAD_SET: &str = "Set_$DefaultGlobal";

/// One `MOMT` entry.
///
/// Total size: 64 bytes
#[derive(Debug, Clone, PartialEq)]
pub struct WmoMaterial {
    pub flags: u32,
    pub shader: u32,
    pub blend_mode: u32,
    /// Client path of the diffuse texture; empty for collision-only materials.
    pub texture: String,
    pub emissive: ColorRgba,
    pub diffuse: ColorRgba,
    pub ground_type: u32,
}

/// One `MOGI` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct WmoGroupInfo {
    pub flags: u32,
    pub bounds: BoundingBox,
    pub name: String,
}

/// One `MOLT` entry (an omni light).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WmoLight {
    pub color: ColorRgba,
    pub position: Vec3,
    pub intensity: f32,
    pub attenuation_start: f32,
    pub attenuation_end: f32,
}

/// One `MODS` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmoDoodadSet {
    pub name: String,
    pub first_instance: u32,
    pub count: u32,
}

/// One `MODD` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct WmoDoodad {
    /// Client path of the model.
    pub model_path: String,
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: f32,
    pub color: ColorRgba,
}

/// One `MFOG` entry.
///
/// Total size: 48 bytes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WmoFog {
    pub flags: u32,
    pub position: Vec3,
    pub smaller_radius: f32,
    pub larger_radius: f32,
    pub end: f32,
    pub start_scalar: f32,
    pub color: ColorRgba,
    pub underwater_end: f32,
    pub underwater_start_scalar: f32,
    pub underwater_color: ColorRgba,
}

impl Default for WmoFog {
    fn default() -> Self {
        Self {
            flags: 0,
            position: Vec3::ZERO,
            smaller_radius: 0.0,
            larger_radius: 0.0,
            end: 444.4445,
            start_scalar: 0.25,
            color: ColorRgba::new(0, 0, 0, 255),
            underwater_end: 222.2222,
            underwater_start_scalar: -0.5,
            underwater_color: ColorRgba::new(0, 0, 0, 255),
        }
    }
}

/// Everything the root file describes.
#[derive(Debug, Clone, Default)]
pub struct WmoRoot {
    pub materials: Vec<WmoMaterial>,
    pub groups: Vec<WmoGroupInfo>,
    pub lights: Vec<WmoLight>,
    pub doodad_sets: Vec<WmoDoodadSet>,
    pub doodads: Vec<WmoDoodad>,
    pub fogs: Vec<WmoFog>,
    pub ambient: ColorRgba,
    /// Row id in `WMOAreaTable`.
    pub wmo_id: u32,
    pub bounds: BoundingBox,
    pub flags: u16,
}

impl WmoRoot {
    /// Offset of each group name within `MOGN`, in group order.
    #[must_use]
    pub fn group_name_offsets(&self) -> Vec<u32> {
        let mut names = StringBlock::new();
        self.groups.iter().map(|group| names.push(&group.name)).collect()
    }

    /// Serialize the root file.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut textures = StringBlock::new();
        let texture_offsets: Vec<u32> = self
            .materials
            .iter()
            .map(|material| textures.push(&material.texture))
            .collect();

        let mut group_names = StringBlock::new();
        let group_name_offsets: Vec<u32> = self.groups.iter().map(|g| group_names.push(&g.name)).collect();

        let mut doodad_names = StringBlock::new();
        let doodad_name_offsets: Vec<u32> = self
            .doodads
            .iter()
            .map(|doodad| doodad_names.push(&doodad.model_path))
            .collect();
        let model_count = {
            let mut paths: Vec<&str> = self.doodads.iter().map(|d| d.model_path.as_str()).collect();
            paths.sort_unstable();
            paths.dedup();
            paths.len()
        };

        let mut writer = ChunkWriter::new();
        writer
            .version(WMO_VERSION)?
            .chunk(tokens::MOHD, &self.header_bytes(model_count))?
            .chunk(tokens::MOTX, textures.as_bytes())?
            .chunk(tokens::MOMT, &self.material_bytes(&texture_offsets))?
            .chunk(tokens::MOGN, group_names.as_bytes())?
            .chunk(tokens::MOGI, &self.group_info_bytes(&group_name_offsets))?
            // Empty skybox name.
            .chunk(tokens::MOSB, &[0; 4])?
            .chunk(tokens::MOPV, &[])?
            .chunk(tokens::MOPT, &[])?
            .chunk(tokens::MOPR, &[])?
            .chunk(tokens::MOVV, &[])?
            .chunk(tokens::MOVB, &[])?
            .chunk(tokens::MOLT, &self.light_bytes())?
            .chunk(tokens::MODS, &self.doodad_set_bytes())?
            .chunk(tokens::MODN, doodad_names.as_bytes())?
            .chunk(tokens::MODD, &self.doodad_bytes(&doodad_name_offsets)?)?
            .chunk(tokens::MFOG, &self.fog_bytes())?;
        Ok(writer.finish())
    }

    fn header_bytes(&self, model_count: usize) -> Vec<u8> {
        let mut out = Section::with_capacity(64);
        out.write_u32(self.materials.len() as u32);
        out.write_u32(self.groups.len() as u32);
        out.write_u32(0); // portals
        out.write_u32(self.lights.len() as u32);
        out.write_u32(model_count as u32);
        out.write_u32(self.doodads.len() as u32);
        out.write_u32(self.doodad_sets.len() as u32);
        self.ambient.write_bgra(&mut out.data);
        out.write_u32(self.wmo_id);
        out.write(&self.bounds);
        out.write_u16(self.flags);
        out.write_u16(0); // lod count
        out.into_bytes()
    }

    fn material_bytes(&self, texture_offsets: &[u32]) -> Vec<u8> {
        let mut out = Section::with_capacity(self.materials.len() * 64);
        for (material, &texture) in self.materials.iter().zip(texture_offsets) {
            out.write_u32(material.flags);
            out.write_u32(material.shader);
            out.write_u32(material.blend_mode);
            out.write_u32(texture);
            material.emissive.write_bgra(&mut out.data);
            material.emissive.write_bgra(&mut out.data); // runtime frame color
            out.write_u32(0); // second texture
            material.diffuse.write_bgra(&mut out.data);
            out.write_u32(material.ground_type);
            out.write_u32(0); // third texture
            out.write_u32(0); // second color
            out.write_u32(0); // second flags
            out.write_zeros(16); // runtime data
        }
        out.into_bytes()
    }

    fn group_info_bytes(&self, name_offsets: &[u32]) -> Vec<u8> {
        let mut out = Section::with_capacity(self.groups.len() * 32);
        for (group, &name) in self.groups.iter().zip(name_offsets) {
            out.write_u32(group.flags);
            out.write(&group.bounds);
            out.write_i32(name as i32);
        }
        out.into_bytes()
    }

    fn light_bytes(&self) -> Vec<u8> {
        let mut out = Section::with_capacity(self.lights.len() * 48);
        for light in &self.lights {
            out.write_u8(0); // omni
            out.write_u8(1); // uses attenuation
            out.write_zeros(2);
            light.color.write_bgra(&mut out.data);
            out.write(&light.position);
            out.write_f32(light.intensity);
            out.write_zeros(16);
            out.write_f32(light.attenuation_start);
            out.write_f32(light.attenuation_end);
        }
        out.into_bytes()
    }

    fn doodad_set_bytes(&self) -> Vec<u8> {
        let mut out = Section::with_capacity(self.doodad_sets.len() * 32);
        for set in &self.doodad_sets {
            out.write_fixed_str(&set.name, 20);
            out.write_u32(set.first_instance);
            out.write_u32(set.count);
            out.write_u32(0);
        }
        out.into_bytes()
    }

    fn doodad_bytes(&self, name_offsets: &[u32]) -> Result<Vec<u8>> {
        let mut out = Section::with_capacity(self.doodads.len() * 40);
        for (doodad, &name) in self.doodads.iter().zip(name_offsets) {
            // 24-bit name offset, flags in the high byte.
            if name > 0x00FF_FFFF {
                return Err(Error::OffsetOverflow(name as usize));
            }
            out.write_u32(name);
            out.write(&doodad.position);
            out.write(&doodad.orientation);
            out.write_f32(doodad.scale);
            doodad.color.write_bgra(&mut out.data);
        }
        Ok(out.into_bytes())
    }

    fn fog_bytes(&self) -> Vec<u8> {
        let mut out = Section::with_capacity(self.fogs.len() * 48);
        for fog in &self.fogs {
            out.write_u32(fog.flags);
            out.write(&fog.position);
            out.write_f32(fog.smaller_radius);
            out.write_f32(fog.larger_radius);
            out.write_f32(fog.end);
            out.write_f32(fog.start_scalar);
            fog.color.write_bgra(&mut out.data);
            out.write_f32(fog.underwater_end);
            out.write_f32(fog.underwater_start_scalar);
            fog.underwater_color.write_bgra(&mut out.data);
        }
        out.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::chunk::read_chunks;
    use pretty_assertions::assert_eq;

    fn sample_root() -> WmoRoot {
        WmoRoot {
            materials: vec![WmoMaterial {
                flags: 0,
                shader: 0,
                blend_mode: 0,
                texture: "World\\Everquest\\ZoneTextures\\grass.blp".to_string(),
                emissive: ColorRgba::default(),
                diffuse: ColorRgba::new(255, 255, 255, 255),
                ground_type: 0,
            }],
            groups: vec![
                WmoGroupInfo {
                    flags: 0x9,
                    bounds: BoundingBox::default(),
                    name: "qeynos_000".to_string(),
                },
                WmoGroupInfo {
                    flags: 0x9,
                    bounds: BoundingBox::default(),
                    name: "qeynos_001".to_string(),
                },
            ],
            lights: vec![WmoLight {
                color: ColorRgba::new(255, 128, 0, 255),
                position: Vec3::new(1.0, 2.0, 3.0),
                intensity: 1.0,
                attenuation_start: 0.0,
                attenuation_end: 10.0,
            }],
            doodad_sets: vec![WmoDoodadSet {
                name: DEFAULT_DOODAD_SET.to_string(),
                first_instance: 0,
                count: 2,
            }],
            doodads: vec![
                WmoDoodad {
                    model_path: "World\\Everquest\\StaticObjects\\tree.mdx".to_string(),
                    position: Vec3::ZERO,
                    orientation: Quat::IDENTITY,
                    scale: 1.0,
                    color: ColorRgba::default(),
                };
                2
            ],
            fogs: vec![WmoFog::default()],
            ..WmoRoot::default()
        }
    }

    #[test]
    fn test_chunk_order_and_sizes() {
        let bytes = sample_root().to_bytes().unwrap();
        let chunks = read_chunks(&bytes).unwrap();
        let order: Vec<String> = chunks.iter().map(|c| c.token.to_string()).collect();
        assert_eq!(
            order,
            [
                "MVER", "MOHD", "MOTX", "MOMT", "MOGN", "MOGI", "MOSB", "MOPV", "MOPT", "MOPR", "MOVV", "MOVB", "MOLT",
                "MODS", "MODN", "MODD", "MFOG"
            ]
        );
        assert_eq!(chunks[0].payload, &17u32.to_le_bytes());
        assert_eq!(chunks[1].payload.len(), 64);
        assert_eq!(chunks[3].payload.len(), 64);
        assert_eq!(chunks[5].payload.len(), 2 * 32);
        assert_eq!(chunks[12].payload.len(), 48);
        assert_eq!(chunks[13].payload.len(), 32);
        assert_eq!(chunks[15].payload.len(), 2 * 40);
        assert_eq!(chunks[16].payload.len(), 48);
    }

    #[test]
    fn test_header_counts_unique_models() {
        let bytes = sample_root().to_bytes().unwrap();
        let chunks = read_chunks(&bytes).unwrap();
        let header = chunks[1].payload;
        assert_eq!(&header[0..4], &1u32.to_le_bytes());
        assert_eq!(&header[4..8], &2u32.to_le_bytes());
        assert_eq!(&header[16..20], &1u32.to_le_bytes());
        assert_eq!(&header[20..24], &2u32.to_le_bytes());
    }

    #[test]
    fn test_group_name_offsets() {
        let root = sample_root();
        assert_eq!(root.group_name_offsets(), vec![0, 12]);
    }
}
