//! Mesh partitioning and animated-material expansion
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

pub mod animation;
pub mod partition;

pub use animation::{
    AnimationExpansion, Interpolation, Keyframe, KeyframeTrack, OPACITY_OPAQUE, OPACITY_TRANSPARENT,
    TransparencyTrack, expand_animated_materials,
};
pub use partition::{MAX_GROUP_VERTICES, PartitionOptions, PartitionedGroup, partition_mesh};
