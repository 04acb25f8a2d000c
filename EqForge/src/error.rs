//! Error types for `EqForge`
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `EqForge` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON source document could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    // ==================== Structural Errors ====================
    /// Parallel vertex attribute arrays disagree in length.
    #[error(
        "vertex attribute mismatch in '{object}': {positions} positions, {normals} normals, \
         {texture_coordinates} texture coordinates, {colors} colors"
    )]
    VertexAttributeMismatch {
        /// Name of the object or zone being converted.
        object: String,
        /// Number of positions.
        positions: usize,
        /// Number of normals.
        normals: usize,
        /// Number of texture coordinates.
        texture_coordinates: usize,
        /// Number of vertex colors (zero means absent).
        colors: usize,
    },

    /// A triangle references a vertex past the end of the vertex arrays.
    #[error("triangle {triangle} references vertex {index} but only {vertex_count} vertices exist")]
    TriangleIndexOutOfRange {
        /// Position of the triangle in the index array.
        triangle: usize,
        /// The offending vertex index.
        index: u32,
        /// Number of vertices available.
        vertex_count: usize,
    },

    /// A triangle references a material that is not in the material list.
    #[error("triangle {triangle} references unknown material index {material}")]
    UnknownMaterialIndex {
        /// Position of the triangle in the index array.
        triangle: usize,
        /// The offending material index.
        material: u32,
    },

    // ==================== Missing Reference Errors ====================
    /// A requested material name does not exist in the material list.
    #[error("material '{name}' not found")]
    MaterialNotFound {
        /// The requested material name.
        name: String,
    },

    /// A requested material bucket matched no triangles.
    #[error("no triangles found for material bucket [{materials}]")]
    EmptyMaterialBucket {
        /// Comma separated material names of the bucket.
        materials: String,
    },

    /// An animated material has no triangles to replicate.
    #[error("no triangles use animated material '{material}'")]
    NoTrianglesForMaterial {
        /// Material name.
        material: String,
    },

    /// An animated material does not have enough frames to animate.
    #[error("animated material '{material}' has {frames} texture(s), at least 2 are required")]
    AnimatedMaterialTooFewFrames {
        /// Material name.
        material: String,
        /// Number of textures found.
        frames: usize,
    },

    /// No zone properties are registered for a short name.
    #[error("no zone properties for zone '{0}'")]
    ZonePropertiesNotFound(String),

    // ==================== Capacity Errors ====================
    /// A render group has more vertices than 16-bit indices can address.
    #[error("group has {vertex_count} vertices, the limit is {limit}")]
    GroupVertexOverflow {
        /// Number of compacted vertices.
        vertex_count: usize,
        /// Maximum addressable vertex count.
        limit: usize,
    },

    /// A render group has more triangles than the container can hold.
    #[error("group has {triangle_count} triangles, the limit is {limit}")]
    GroupTriangleOverflow {
        /// Number of triangles in the group.
        triangle_count: usize,
        /// Maximum triangle count.
        limit: usize,
    },

    /// An atlas animation uses more frames than a 4x4 atlas holds.
    #[error("material '{material}' has {frames} animation frames, at most 16 are supported")]
    TooManyAnimationFrames {
        /// Material name.
        material: String,
        /// Number of frames requested.
        frames: usize,
    },

    /// The loop of an animated material does not fit a 32-bit millisecond timestamp.
    #[error("material '{material}' loops over {frames} frames of {delay_ms} ms, longer than a u32 timestamp")]
    AnimationLoopOverflow {
        /// Material name.
        material: String,
        /// Number of frames.
        frames: usize,
        /// Delay per frame.
        delay_ms: u32,
    },

    /// A material index does not fit the on-disk field.
    #[error("material index {index} does not fit in {bits} bits")]
    MaterialIndexOverflow {
        /// The material index.
        index: usize,
        /// Width of the destination field.
        bits: u32,
    },

    /// An array is too large for its 32-bit count or offset field.
    #[error("array of {0} bytes exceeds the 32-bit offset range")]
    OffsetOverflow(usize),

    // ==================== Encoding Errors ====================
    /// A chunk token is not exactly four ASCII bytes.
    #[error("invalid chunk token '{0}': tokens are exactly 4 ASCII bytes")]
    InvalidChunkToken(String),

    /// A chunk header or payload runs past the end of the buffer.
    #[error("truncated chunk at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedChunk {
        /// Offset of the chunk header.
        offset: usize,
        /// Bytes required.
        needed: usize,
        /// Bytes remaining.
        available: usize,
    },

    /// A chunk appeared where another was expected.
    #[error("expected chunk {expected}, found {found}")]
    UnexpectedChunk {
        /// Token that was expected.
        expected: String,
        /// Token that was read.
        found: String,
    },

    /// A serialized header does not match its reserved size.
    #[error("header is {actual} bytes but {reserved} bytes were reserved")]
    HeaderSizeMismatch {
        /// Bytes reserved in the first pass.
        reserved: usize,
        /// Bytes produced in the second pass.
        actual: usize,
    },

    /// The file is not a recognized M2 model.
    #[error("invalid M2 magic: expected MD20")]
    InvalidModelMagic,

    // ==================== Configuration Errors ====================
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A line in a light instance file could not be parsed.
    #[error("{path}:{line}: {message}")]
    InvalidLightInstance {
        /// Source file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    // ==================== Batch Errors ====================
    /// Batch conversion completed but some zones or objects failed.
    #[error("conversion failed for {failed} of {total} items: {first_error}")]
    ConversionPartialFailure {
        /// Number of items attempted.
        total: usize,
        /// Number of items that failed.
        failed: usize,
        /// The first error message encountered.
        first_error: String,
    },
}

/// Convenience result type
pub type Result<T> = std::result::Result<T, Error>;
