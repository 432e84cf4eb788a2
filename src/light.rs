//! Deferred light work as plain data.
//!
//! Lighting updates are expensive and must not run on the install path, so
//! installers push [`LightTask`] commands and the tick loop applies them in
//! batches through [`ChunkCache::drain_light_tasks`]. Tasks carry coordinates,
//! never tile references: at execution time the owning chunk is looked up
//! again and the task is skipped if that chunk is no longer loaded.
//!
//! [`ChunkCache::drain_light_tasks`]: crate::cache::ChunkCache::drain_light_tasks
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use chunkring::light::{LightLayer, LightTask, SectionPos};
//!
//! let section = SectionPos::new(4, -2, 9);
//! let task = LightTask::SectionUpdate {
//!     layer: LightLayer::Sky,
//!     section,
//!     data: Arc::from(vec![0u8; 2048]),
//! };
//! assert_eq!(task.chunk(), (4, 9));
//! assert!(task.requires_loaded_chunk());
//! ```

use std::sync::Arc;

use crate::traits::LightEngine;

/// Which light channel a section update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightLayer {
    Sky,
    Block,
}

/// A 16-high vertical slice of a chunk column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl SectionPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chunk column containing this section.
    pub fn chunk(&self) -> (i32, i32) {
        (self.x, self.z)
    }
}

/// One unit of deferred light work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightTask {
    /// Turn lighting on or off for a chunk column.
    SetEnabled { chunk: (i32, i32), enabled: bool },
    /// Feed server-provided light data for one section.
    SectionUpdate {
        layer: LightLayer,
        section: SectionPos,
        data: Arc<[u8]>,
    },
    /// Tell the engine whether a section holds any blocks.
    SectionStatus { section: SectionPos, is_empty: bool },
}

impl LightTask {
    /// Chunk column the task belongs to.
    pub fn chunk(&self) -> (i32, i32) {
        match self {
            LightTask::SetEnabled { chunk, .. } => *chunk,
            LightTask::SectionUpdate { section, .. } | LightTask::SectionStatus { section, .. } => {
                section.chunk()
            },
        }
    }

    /// Whether the task only makes sense while its chunk is loaded.
    ///
    /// Disabling light is teardown and runs even after the chunk is gone.
    pub fn requires_loaded_chunk(&self) -> bool {
        !matches!(self, LightTask::SetEnabled { enabled: false, .. })
    }

    /// Hands the task to `engine`. Does no validation.
    pub fn apply<E: LightEngine + ?Sized>(&self, engine: &mut E) {
        match self {
            LightTask::SetEnabled { chunk, enabled } => engine.set_enabled(*chunk, *enabled),
            LightTask::SectionUpdate {
                layer,
                section,
                data,
            } => engine.queue_section_update(*layer, *section, data),
            LightTask::SectionStatus { section, is_empty } => {
                engine.update_section_status(*section, *is_empty)
            },
        }
    }
}

/// Outcome of one [`drain_light_tasks`](crate::cache::ChunkCache::drain_light_tasks) call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Tasks handed to the engine.
    pub executed: usize,
    /// Tasks whose chunk was gone at execution time.
    pub skipped: usize,
}

impl DrainReport {
    /// Tasks removed from the queue.
    pub fn total(&self) -> usize {
        self.executed + self.skipped
    }
}
