//! Material model
//!
//! A material is one renderable surface: how it blends, which texture(s) it
//! samples, and whether it animates. Every renderer-facing decision keyed on
//! the material type lives on [`MaterialKind`] so callers never switch on raw
//! type codes.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::common::{TextureCoordinates, Vec2};
use crate::error::{Error, Result};

/// Largest atlas animation supported (a 4x4 grid).
pub const MAX_ATLAS_FRAMES: usize = 16;

/// Surface type of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MaterialKind {
    #[default]
    Diffuse,
    Invisible,
    Boundary,
    TransparentAdditive,
    TransparentAdditiveUnlit,
    TransparentAdditiveUnlitSkydome,
    Transparent25Percent,
    Transparent50Percent,
    Transparent75Percent,
    TransparentMasked,
    DiffuseSkydome,
    TransparentSkydome,
}

/// Model (M2) blending modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum BlendMode {
    Opaque = 0,
    AlphaKey = 1,
    Alpha = 2,
    NoAlphaAdd = 3,
    Add = 4,
    Mod = 5,
    Mod2x = 6,
}

impl MaterialKind {
    /// Whether surfaces of this kind are drawn at all.
    #[must_use]
    pub const fn is_renderable_kind(self) -> bool {
        !matches!(
            self,
            Self::Invisible | Self::Boundary | Self::DiffuseSkydome | Self::TransparentSkydome
        )
    }

    #[must_use]
    pub const fn is_skydome(self) -> bool {
        matches!(
            self,
            Self::DiffuseSkydome | Self::TransparentSkydome | Self::TransparentAdditiveUnlitSkydome
        )
    }

    #[must_use]
    pub const fn is_unlit(self) -> bool {
        matches!(
            self,
            Self::TransparentAdditiveUnlit | Self::TransparentAdditiveUnlitSkydome
        )
    }

    /// Model blend mode.
    #[must_use]
    pub const fn blend_mode(self) -> BlendMode {
        match self {
            Self::TransparentAdditive
            | Self::TransparentAdditiveUnlit
            | Self::TransparentAdditiveUnlitSkydome => BlendMode::Add,
            Self::Transparent25Percent
            | Self::Transparent50Percent
            | Self::Transparent75Percent
            | Self::TransparentMasked => BlendMode::Alpha,
            _ => BlendMode::Opaque,
        }
    }

    /// World-object (MOMT) blend mode: 0 opaque, 1 alpha key, 2 alpha, 3 additive.
    #[must_use]
    pub const fn world_blend_mode(self) -> u32 {
        match self {
            Self::TransparentAdditive
            | Self::TransparentAdditiveUnlit
            | Self::TransparentAdditiveUnlitSkydome => 3,
            Self::Transparent25Percent | Self::Transparent50Percent | Self::Transparent75Percent => 2,
            Self::TransparentMasked => 1,
            _ => 0,
        }
    }

    /// Suffix appended to texture names whose alpha was pre-baked to a fixed level.
    #[must_use]
    pub const fn texture_suffix(self) -> &'static str {
        match self {
            Self::Transparent25Percent => "a25",
            Self::Transparent50Percent => "a50",
            Self::Transparent75Percent => "a75",
            _ => "",
        }
    }
}

/// How (and whether) a material animates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MaterialAnimation {
    #[default]
    Static,
    /// Flip-book: each texture is one frame, shown for `delay_ms`.
    FrameSwap { delay_ms: u32 },
    /// Frames packed into a 2x2 or 4x4 `atlas_texture`, cycled by a texture transform.
    Atlas { delay_ms: u32, atlas_texture: String },
}

/// One surface description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Stable identity; triangles refer to materials by this value.
    pub index: u32,
    pub name: String,
    #[serde(default)]
    pub kind: MaterialKind,
    /// Texture names in frame order (file stems, no extension).
    #[serde(default)]
    pub texture_names: Vec<String>,
    #[serde(default)]
    pub animation: MaterialAnimation,
    /// Width of the source texture before any atlas packing.
    #[serde(default)]
    pub source_width: u32,
    /// Height of the source texture before any atlas packing.
    #[serde(default)]
    pub source_height: u32,
}

impl Material {
    pub fn new(index: u32, name: impl Into<String>, kind: MaterialKind, texture_names: Vec<String>) -> Self {
        Self {
            index,
            name: name.into(),
            kind,
            texture_names,
            animation: MaterialAnimation::Static,
            source_width: 0,
            source_height: 0,
        }
    }

    #[must_use]
    pub fn with_animation(mut self, animation: MaterialAnimation) -> Self {
        self.animation = animation;
        self
    }

    #[must_use]
    pub fn with_source_size(mut self, width: u32, height: u32) -> Self {
        self.source_width = width;
        self.source_height = height;
        self
    }

    /// Per-frame delay, 0 when static.
    #[must_use]
    pub fn delay_ms(&self) -> u32 {
        match self.animation {
            MaterialAnimation::Static => 0,
            MaterialAnimation::FrameSwap { delay_ms } | MaterialAnimation::Atlas { delay_ms, .. } => {
                delay_ms
            }
        }
    }

    #[must_use]
    pub fn is_animated(&self) -> bool {
        self.delay_ms() > 0
    }

    #[must_use]
    pub fn is_atlas_animated(&self) -> bool {
        self.is_animated() && matches!(self.animation, MaterialAnimation::Atlas { .. })
    }

    #[must_use]
    pub fn is_renderable(&self) -> bool {
        self.kind.is_renderable_kind() && !self.texture_names.is_empty()
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.texture_names.len()
    }

    /// Texture file stems the renderer samples, with the alpha suffix applied.
    #[must_use]
    pub fn render_textures(&self) -> Vec<String> {
        let suffix = self.kind.texture_suffix();
        match &self.animation {
            MaterialAnimation::Atlas { atlas_texture, .. } if self.is_animated() => {
                vec![format!("{atlas_texture}{suffix}")]
            }
            _ => self
                .texture_names
                .iter()
                .map(|name| format!("{name}{suffix}"))
                .collect(),
        }
    }

    /// Share of the texture one atlas frame covers on each axis.
    ///
    /// 1 for anything that is not atlas animated.
    pub fn atlas_scale(&self) -> Result<f32> {
        if !self.is_atlas_animated() {
            return Ok(1.0);
        }
        match self.frame_count() {
            0..=4 => Ok(0.5),
            5..=MAX_ATLAS_FRAMES => Ok(0.25),
            frames => Err(Error::TooManyAnimationFrames {
                material: self.name.clone(),
                frames,
            }),
        }
    }

    /// Texture-space translation that brings atlas frame `frame` under the base coordinates.
    pub fn frame_translation(&self, frame: usize) -> Result<Vec2> {
        let frames = self.frame_count();
        if frames > MAX_ATLAS_FRAMES || frame >= MAX_ATLAS_FRAMES {
            return Err(Error::TooManyAnimationFrames {
                material: self.name.clone(),
                frames: frames.max(frame + 1),
            });
        }
        if frames <= 4 {
            let column = (frame % 2) as f32;
            let row = (frame / 2) as f32;
            Ok(Vec2::new(column * 0.5, row * 0.5))
        } else {
            let column = (frame % 4) as f32;
            let row = (frame / 4) as f32;
            Ok(Vec2::new(column * -0.25, row * 0.25))
        }
    }

    /// Half-texel corrected copy of a base coordinate.
    ///
    /// Extremes (0, 1, -1) move half a source texel inward; atlas animated
    /// materials additionally scale onto the first frame's cell.
    pub fn corrected_base_coordinates(&self, coordinates: TextureCoordinates) -> Result<TextureCoordinates> {
        let scale = self.atlas_scale()?;
        Ok(TextureCoordinates::new(
            correct_axis(coordinates.u, self.source_width, scale),
            correct_axis(coordinates.v, self.source_height, scale),
        ))
    }
}

fn correct_axis(value: f32, source_size: u32, scale: f32) -> f32 {
    let half_texel = if source_size == 0 {
        0.0
    } else {
        0.5 / source_size as f32
    };
    if value.abs() <= f32::EPSILON {
        half_texel
    } else if (value - 1.0).abs() <= f32::EPSILON {
        (1.0 - half_texel) * scale
    } else if (value + 1.0).abs() <= f32::EPSILON {
        (-1.0 + half_texel) * scale
    } else {
        value * scale
    }
}
