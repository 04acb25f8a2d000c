//! Binary file writers for the destination client
//!
//! Two container styles share the same primitives:
//! - chunked files (`.wmo`, `.wdt`, `.wdl`) built from [`chunk`]
//! - offset-array files (`.m2`, `.skin`) built from [`offset`]
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

pub mod chunk;
pub mod m2;
pub mod offset;
pub mod wdl;
pub mod wdt;
pub mod wmo;

// Re-export the encoder primitives
pub use chunk::{Chunk, ChunkWriter, FourCC, read_chunk, read_chunks, wrap_in_chunk};
pub use offset::{OffsetArray, OffsetBuilder, Section};

// Re-export main file types
pub use m2::{M2Model, M2Skin};
pub use wdl::empty_wdl;
pub use wdt::WdtFile;
pub use wmo::{WmoGroup, WmoRoot};
