//! Animated-material expansion
//!
//! Flip-book materials become one material per frame. Every extra frame gets
//! its own copy of the geometry, and a transparency track per frame material
//! makes exactly one copy visible at any point of the loop. Atlas materials
//! keep their geometry and get a texture translation track instead.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use crate::common::{TriangleFace, Vec3};
use crate::error::{Error, Result};
use crate::material::{Material, MaterialAnimation};
use crate::mesh::MeshData;

/// Opacity of a visible frame (fixed-point 1.0).
pub const OPACITY_OPAQUE: i16 = i16::MAX;
/// Opacity of a hidden frame.
pub const OPACITY_TRANSPARENT: i16 = 0;

/// Keyframe interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u16)]
pub enum Interpolation {
    /// Hold each value until the next keyframe.
    #[default]
    None = 0,
    Linear = 1,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe<T> {
    pub timestamp_ms: u32,
    pub value: T,
}

/// Timestamped values, optionally driven by a global loop.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTrack<T> {
    pub interpolation: Interpolation,
    /// Index into the model's global loop list.
    pub global_sequence: Option<u16>,
    pub keyframes: Vec<Keyframe<T>>,
}

impl<T: Copy> KeyframeTrack<T> {
    #[must_use]
    pub fn new(global_sequence: Option<u16>) -> Self {
        Self {
            interpolation: Interpolation::None,
            global_sequence,
            keyframes: Vec::new(),
        }
    }

    /// Single key at t=0.
    #[must_use]
    pub fn constant(value: T) -> Self {
        let mut track = Self::new(None);
        track.push(0, value);
        track
    }

    pub fn push(&mut self, timestamp_ms: u32, value: T) {
        self.keyframes.push(Keyframe { timestamp_ms, value });
    }

    /// Value in effect at `timestamp_ms` under step interpolation.
    #[must_use]
    pub fn sample(&self, timestamp_ms: u32) -> Option<T> {
        self.keyframes
            .iter()
            .take_while(|key| key.timestamp_ms <= timestamp_ms)
            .last()
            .map(|key| key.value)
    }
}

pub type TransparencyTrack = KeyframeTrack<i16>;

/// Result of expanding every animated material of one object.
#[derive(Debug, Clone)]
pub struct AnimationExpansion {
    /// Input geometry plus one copy per extra flip-book frame.
    pub mesh: MeshData,
    /// Input materials (frame 0 renamed in place) followed by synthesized frames.
    pub materials: Vec<Material>,
    /// One track per material, keyed by material index.
    pub transparency_tracks: BTreeMap<u32, TransparencyTrack>,
    /// Texture translation tracks of atlas animated materials.
    pub texture_transforms: BTreeMap<u32, KeyframeTrack<Vec3>>,
    /// Loop lengths in milliseconds; tracks refer to these by position.
    pub global_loops: Vec<u32>,
}

/// Expand all animated materials of `mesh`.
pub fn expand_animated_materials(mesh: &MeshData, materials: &[Material]) -> Result<AnimationExpansion> {
    let mut expansion = AnimationExpansion {
        mesh: mesh.clone(),
        materials: materials.to_vec(),
        transparency_tracks: BTreeMap::new(),
        texture_transforms: BTreeMap::new(),
        global_loops: Vec::new(),
    };
    let mut next_index = materials.iter().map(|m| m.index + 1).max().unwrap_or(0);

    for (slot, material) in materials.iter().enumerate() {
        if !material.is_animated() {
            expansion
                .transparency_tracks
                .insert(material.index, TransparencyTrack::constant(OPACITY_OPAQUE));
            continue;
        }
        match &material.animation {
            MaterialAnimation::FrameSwap { delay_ms } => {
                expand_frame_swap(&mut expansion, slot, material, *delay_ms, &mut next_index)?;
            }
            MaterialAnimation::Atlas { delay_ms, .. } => {
                add_atlas_transform(&mut expansion, material, *delay_ms)?;
            }
            MaterialAnimation::Static => {}
        }
    }
    Ok(expansion)
}

/// Length of one loop; every frame timestamp is below it.
fn loop_duration(material: &Material, frames: usize, delay_ms: u32) -> Result<u32> {
    u32::try_from(frames)
        .ok()
        .and_then(|frames| frames.checked_mul(delay_ms))
        .ok_or_else(|| Error::AnimationLoopOverflow {
            material: material.name.clone(),
            frames,
            delay_ms,
        })
}

fn expand_frame_swap(
    expansion: &mut AnimationExpansion,
    slot: usize,
    material: &Material,
    delay_ms: u32,
    next_index: &mut u32,
) -> Result<()> {
    let frames = material.frame_count();
    if frames <= 1 {
        return Err(Error::AnimatedMaterialTooFewFrames {
            material: material.name.clone(),
            frames,
        });
    }
    let base_faces: Vec<TriangleFace> = expansion
        .mesh
        .triangles
        .iter()
        .filter(|face| face.material == material.index)
        .copied()
        .collect();
    let loop_ms = loop_duration(material, frames, delay_ms)?;
    let (Some(min_vertex), Some(max_vertex)) = (
        base_faces.iter().map(TriangleFace::min_index).min(),
        base_faces.iter().map(TriangleFace::max_index).max(),
    ) else {
        return Err(Error::NoTrianglesForMaterial {
            material: material.name.clone(),
        });
    };

    let global_sequence = u16::try_from(expansion.global_loops.len()).map_err(|_| {
        Error::MaterialIndexOverflow {
            index: expansion.global_loops.len(),
            bits: 16,
        }
    })?;
    expansion.global_loops.push(loop_ms);
    tracing::debug!(
        "Expanding '{}' into {} frames ({} ms each, {} triangles)",
        material.name,
        frames,
        delay_ms,
        base_faces.len()
    );

    let frame_material = |frame: usize, index: u32| Material {
        index,
        name: format!("{}Anim_{frame}", material.name),
        texture_names: vec![material.texture_names[frame].clone()],
        animation: MaterialAnimation::Static,
        ..material.clone()
    };

    // Frame 0 keeps the original identity.
    expansion.materials[slot] = frame_material(0, material.index);
    let mut frame_indices = vec![material.index];
    for frame in 1..frames {
        let index = *next_index;
        *next_index += 1;
        expansion.materials.push(frame_material(frame, index));
        frame_indices.push(index);
    }

    let mut tracks: Vec<TransparencyTrack> = (0..frames)
        .map(|_| TransparencyTrack::new(Some(global_sequence)))
        .collect();
    for frame in 0..frames {
        let timestamp = frame as u32 * delay_ms;
        for earlier in 0..frame {
            tracks[frame].push(earlier as u32 * delay_ms, OPACITY_TRANSPARENT);
            tracks[earlier].push(timestamp, OPACITY_TRANSPARENT);
        }
        tracks[frame].push(timestamp, OPACITY_OPAQUE);
    }
    for (index, track) in frame_indices.iter().zip(tracks) {
        expansion.transparency_tracks.insert(*index, track);
    }

    let source = expansion.mesh.clone();
    for &index in &frame_indices[1..] {
        let offset = expansion.mesh.vertex_count() as u32 - min_vertex;
        expansion.mesh.triangles.extend(
            base_faces
                .iter()
                .map(|face| face.offset_by(offset).with_material(index)),
        );
        for vertex in min_vertex..=max_vertex {
            expansion.mesh.push_vertex_from(&source, vertex as usize);
        }
    }
    Ok(())
}

fn add_atlas_transform(expansion: &mut AnimationExpansion, material: &Material, delay_ms: u32) -> Result<()> {
    let frames = material.frame_count();
    let loop_ms = loop_duration(material, frames, delay_ms)?;
    let global_sequence = u16::try_from(expansion.global_loops.len()).map_err(|_| {
        Error::MaterialIndexOverflow {
            index: expansion.global_loops.len(),
            bits: 16,
        }
    })?;
    let mut track = KeyframeTrack::new(Some(global_sequence));
    for frame in 0..frames {
        let offset = material.frame_translation(frame)?;
        track.push(frame as u32 * delay_ms, Vec3::new(offset.x, offset.y, 0.0));
    }
    expansion.global_loops.push(loop_ms);
    expansion.texture_transforms.insert(material.index, track);
    expansion
        .transparency_tracks
        .insert(material.index, TransparencyTrack::constant(OPACITY_OPAQUE));
    Ok(())
}
