//! Batch conversion
//!
//! Discovers every zone and object document below an input folder and
//! converts them in parallel, one zone or object per task. A failure only
//! aborts its own item; the run reports failures in aggregate at the end.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use walkdir::WalkDir;

use super::progress::{ConvertPhase, ConvertProgress};
use super::{ConvertOutcome, convert_object, convert_zone};
use crate::config::ConversionConfig;
use crate::error::{Error, Result};
use crate::ids::IdAllocator;
use crate::input::ZONE_SOURCE_FILE;
use crate::zone::ZoneCatalog;

/// Folder name that holds object documents.
const OBJECTS_FOLDER: &str = "objects";

/// Result of a batch conversion
#[derive(Debug, Clone, Default)]
pub struct BatchConvertResult {
    /// Number of zones and objects written
    pub success_count: usize,
    /// Number of zones skipped by configuration
    pub skip_count: usize,
    /// Number of zones and objects that failed
    pub fail_count: usize,
    /// Message for each item processed
    pub results: Vec<String>,
    /// Messages of the failed items only
    pub failures: Vec<String>,
}

impl BatchConvertResult {
    #[must_use]
    pub fn total(&self) -> usize {
        self.success_count + self.skip_count + self.fail_count
    }

    /// `Err` when any item failed.
    pub fn into_result(self) -> Result<Self> {
        match self.failures.first() {
            Some(first) => Err(Error::ConversionPartialFailure {
                total: self.total(),
                failed: self.fail_count,
                first_error: first.clone(),
            }),
            None => Ok(self),
        }
    }
}

/// Find every `zone.json` below `dir`.
pub fn find_zone_sources<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let mut sources: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.path().is_file() && e.file_name() == ZONE_SOURCE_FILE)
        .map(|e| e.path().to_path_buf())
        .collect();

    sources.sort();
    sources
}

/// Find every `.json` document directly inside an `objects` folder below `dir`.
pub fn find_object_sources<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let mut sources: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            let path = e.path();
            path.is_file()
                && path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
                && path
                    .parent()
                    .and_then(Path::file_name)
                    .is_some_and(|name| name == OBJECTS_FOLDER)
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    sources.sort();
    sources
}

#[derive(Default)]
struct Counters {
    success: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    processed: AtomicUsize,
}

impl Counters {
    fn record(&self, label: &str, outcome: Result<ConvertOutcome>) -> (String, bool) {
        match outcome {
            Ok(ConvertOutcome::Written(files)) => {
                self.success.fetch_add(1, Ordering::SeqCst);
                (format!("Converted: {label} ({} files)", files.len()), false)
            }
            Ok(ConvertOutcome::Skipped(reason)) => {
                self.skipped.fetch_add(1, Ordering::SeqCst);
                (format!("Skipped {label}: {reason}"), false)
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::SeqCst);
                tracing::error!("Failed to convert {}: {}", label, e);
                (format!("Failed {label}: {e}"), true)
            }
        }
    }
}

/// Convert every zone and object below `input` into `output`.
///
/// Zones are converted first, then objects; within each phase items run in
/// parallel and share one identifier allocator.
pub fn batch_convert<F>(
    input: &Path,
    output: &Path,
    catalog: &ZoneCatalog,
    config: &ConversionConfig,
    progress: F,
) -> BatchConvertResult
where
    F: Fn(&ConvertProgress) + Send + Sync,
{
    progress(&ConvertProgress::new(ConvertPhase::Discovering, 0, 0));
    let zones = find_zone_sources(input);
    let objects = find_object_sources(input);
    tracing::info!(
        "Found {} zone(s) and {} object(s) below {}",
        zones.len(),
        objects.len(),
        input.display()
    );

    let ids = IdAllocator::new(&config.ids);
    let counters = Counters::default();
    let total = zones.len() + objects.len();
    let display = |path: &Path| {
        path.strip_prefix(input)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    };

    let mut messages: Vec<(String, bool)> = zones
        .par_iter()
        .map(|path| {
            let name = display(path);
            let current = counters.processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(&ConvertProgress::with_file(
                ConvertPhase::ConvertingZones,
                current,
                total,
                name.clone(),
            ));
            counters.record(&name, convert_zone(path, output, catalog, config, &ids))
        })
        .collect();

    messages.par_extend(objects.par_iter().map(|path| {
        let name = display(path);
        let current = counters.processed.fetch_add(1, Ordering::SeqCst) + 1;
        progress(&ConvertProgress::with_file(
            ConvertPhase::ConvertingObjects,
            current,
            total,
            name.clone(),
        ));
        counters.record(&name, convert_object(path, output, config))
    }));

    progress(&ConvertProgress::new(ConvertPhase::Complete, total, total));

    let failures = messages
        .iter()
        .filter(|(_, failed)| *failed)
        .map(|(message, _)| message.clone())
        .collect();
    BatchConvertResult {
        success_count: counters.success.load(Ordering::SeqCst),
        skip_count: counters.skipped.load(Ordering::SeqCst),
        fail_count: counters.failed.load(Ordering::SeqCst),
        results: messages.into_iter().map(|(message, _)| message).collect(),
        failures,
    }
}
