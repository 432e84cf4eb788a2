//! Always-on cache counters.
//!
//! Counters are relaxed atomics bumped on the mutation paths only; `get_chunk`
//! records nothing so the render path stays write-free.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::light::DrainReport;

/// Point-in-time view of cache activity and occupancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    /// Successful installs (fresh loads and overwrites).
    pub installs: u64,
    /// Installs that displaced a previous occupant.
    pub displacements: u64,
    /// Install/drop requests outside the viewport.
    pub out_of_range: u64,
    /// Drops that unloaded a tile.
    pub drops: u64,
    /// Drops discarded because the slot held something else.
    pub stale_drops: u64,
    pub resizes: u64,
    /// Tiles carried into a new slot array by a resize.
    pub migrated: u64,
    /// Tiles left behind by a resize.
    pub resize_discarded: u64,
    /// Tiles unloaded by `clear`.
    pub cleared: u64,
    pub light_tasks_executed: u64,
    pub light_tasks_skipped: u64,

    // gauges captured at snapshot time
    pub loaded: usize,
    pub capacity: usize,
    pub radius: u32,
    pub pending_light_tasks: usize,
}

#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    installs: AtomicU64,
    displacements: AtomicU64,
    out_of_range: AtomicU64,
    drops: AtomicU64,
    stale_drops: AtomicU64,
    resizes: AtomicU64,
    migrated: AtomicU64,
    resize_discarded: AtomicU64,
    cleared: AtomicU64,
    light_tasks_executed: AtomicU64,
    light_tasks_skipped: AtomicU64,
}

impl CacheCounters {
    pub(crate) fn record_install(&self, displaced: bool) {
        self.installs.fetch_add(1, Ordering::Relaxed);
        if displaced {
            self.displacements.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_out_of_range(&self) {
        self.out_of_range.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_drop(&self) {
        self.drops.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_stale_drop(&self) {
        self.stale_drops.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_resize(&self, migrated: usize, discarded: usize) {
        self.resizes.fetch_add(1, Ordering::Relaxed);
        self.migrated.fetch_add(migrated as u64, Ordering::Relaxed);
        self.resize_discarded
            .fetch_add(discarded as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_clear(&self, cleared: usize) {
        self.cleared.fetch_add(cleared as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_light_drain(&self, report: DrainReport) {
        self.light_tasks_executed
            .fetch_add(report.executed as u64, Ordering::Relaxed);
        self.light_tasks_skipped
            .fetch_add(report.skipped as u64, Ordering::Relaxed);
    }

    /// Counter fields only; the caller fills in gauges.
    pub(crate) fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            installs: self.installs.load(Ordering::Relaxed),
            displacements: self.displacements.load(Ordering::Relaxed),
            out_of_range: self.out_of_range.load(Ordering::Relaxed),
            drops: self.drops.load(Ordering::Relaxed),
            stale_drops: self.stale_drops.load(Ordering::Relaxed),
            resizes: self.resizes.load(Ordering::Relaxed),
            migrated: self.migrated.load(Ordering::Relaxed),
            resize_discarded: self.resize_discarded.load(Ordering::Relaxed),
            cleared: self.cleared.load(Ordering::Relaxed),
            light_tasks_executed: self.light_tasks_executed.load(Ordering::Relaxed),
            light_tasks_skipped: self.light_tasks_skipped.load(Ordering::Relaxed),
            ..CacheStatsSnapshot::default()
        }
    }

    pub(crate) fn reset(&self) {
        for counter in [
            &self.installs,
            &self.displacements,
            &self.out_of_range,
            &self.drops,
            &self.stale_drops,
            &self.resizes,
            &self.migrated,
            &self.resize_discarded,
            &self.cleared,
            &self.light_tasks_executed,
            &self.light_tasks_skipped,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
