pub use crate::builder::{ChunkCacheBuilder, ResizeDiscard};
pub use crate::cache::{CacheStatsSnapshot, ChunkCache};
pub use crate::ds::{DeferredQueue, MIN_RADIUS, SlotArray, Viewport};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::light::{DrainReport, LightLayer, LightTask, SectionPos};
#[cfg(feature = "metrics")]
pub use crate::metrics::{
    MetricsExporter, MetricsReset, MetricsSnapshotProvider, PrometheusTextExporter,
};
pub use crate::traits::{LightEngine, NoopSink, Tile, TileSource, UnloadSink};
