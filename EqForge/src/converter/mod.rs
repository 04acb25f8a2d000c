//! Conversion pipelines
//!
//! This module ties the builders to the file system:
//! - zone documents → world object root and groups, zone models, map files, triggers
//! - object documents → static models
//! - whole input trees → parallel batch runs

pub mod batch;
mod object;
pub mod paths;
pub mod progress;
mod zone;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub use batch::{BatchConvertResult, batch_convert, find_object_sources, find_zone_sources};
pub use object::{build_static_object, convert_object, write_model};
pub use progress::{ConvertPhase, ConvertProgress, ConvertProgressCallback};
pub use zone::{convert_zone, write_zone};

/// What happened to one zone or object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertOutcome {
    /// Files written, in write order.
    Written(Vec<PathBuf>),
    /// Not converted, with the reason.
    Skipped(String),
}

/// Write `bytes` to `path`, creating parent folders.
fn write_file(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(path.to_path_buf())
}
