//! # Metrics Traits
//!
//! Snapshotting and export are kept apart so a monitoring backend never needs
//! to know about the cache type it reads from.
//!
//! ```text
//!   ChunkCache ──► MetricsSnapshotProvider<CacheStatsSnapshot>
//!                              │ snapshot()
//!                              ▼
//!                  MetricsExporter<CacheStatsSnapshot>
//!                  (PrometheusTextExporter, ...)
//! ```
//!
//! - Production: poll `snapshot()` on a timer and hand it to an exporter.
//! - Bench/Test: call `reset_metrics()` between iterations.

use crate::cache::{CacheStatsSnapshot, ChunkCache};
use crate::traits::{TileSource, UnloadSink};

/// Produce a point-in-time metrics snapshot.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&self);
}

/// Export/publish metrics to production monitoring backends.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}

impl<S, U> MetricsSnapshotProvider<CacheStatsSnapshot> for ChunkCache<S, U>
where
    S: TileSource,
    U: UnloadSink<S::Tile>,
{
    fn snapshot(&self) -> CacheStatsSnapshot {
        self.stats()
    }
}

impl<S, U> MetricsReset for ChunkCache<S, U>
where
    S: TileSource,
    U: UnloadSink<S::Tile>,
{
    fn reset_metrics(&self) {
        self.reset_stats();
    }
}
