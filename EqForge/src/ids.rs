//! Identifier allocation
//!
//! Database identifiers (world-object ids, area ids, map ids, group ids) are
//! handed out once per zone and never reused. The allocator is passed into
//! every conversion call and is safe to share between worker threads.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::IdStarts;

/// Monotonic identifier counters.
#[derive(Debug)]
pub struct IdAllocator {
    next_wmo_id: AtomicU32,
    next_area_id: AtomicU32,
    next_map_id: AtomicU32,
    next_wmo_group_id: AtomicU32,
    loading_screen_id_start: u32,
}

/// Identifiers reserved for one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneIds {
    pub wmo_id: u32,
    pub area_id: u32,
    pub map_id: u32,
}

impl IdAllocator {
    #[must_use]
    pub fn new(starts: &IdStarts) -> Self {
        Self {
            next_wmo_id: AtomicU32::new(starts.wmo_id_start),
            next_area_id: AtomicU32::new(starts.area_id_start),
            next_map_id: AtomicU32::new(starts.map_id_start),
            next_wmo_group_id: AtomicU32::new(starts.wmo_group_id_start),
            loading_screen_id_start: starts.loading_screen_id_start,
        }
    }

    /// Reserve the per-zone identifiers.
    pub fn allocate_zone(&self) -> ZoneIds {
        ZoneIds {
            wmo_id: self.next_wmo_id.fetch_add(1, Ordering::Relaxed),
            area_id: self.next_area_id.fetch_add(1, Ordering::Relaxed),
            map_id: self.next_map_id.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Reserve `count` consecutive world-object group ids, returning the first.
    pub fn allocate_wmo_groups(&self, count: u32) -> u32 {
        self.next_wmo_group_id.fetch_add(count, Ordering::Relaxed)
    }

    /// Base of the loading-screen id range; continents add a fixed offset.
    #[must_use]
    pub fn loading_screen_id_start(&self) -> u32 {
        self.loading_screen_id_start
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(&IdStarts::default())
    }
}
