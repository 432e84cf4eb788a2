//! Metrics export for [`ChunkCache`](crate::cache::ChunkCache).
//!
//! The cache keeps its counters unconditionally (see
//! [`CacheStatsSnapshot`](crate::cache::CacheStatsSnapshot)); this module adds
//! the snapshot/export seams and a Prometheus text exporter on top.

pub mod exporter;
pub mod traits;

pub use exporter::PrometheusTextExporter;
pub use traits::{MetricsExporter, MetricsReset, MetricsSnapshotProvider};
