//! Builder for [`ChunkCache`].
//!
//! Collects viewport and policy settings, validates them once, and hands back
//! a ready cache.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use chunkring::builder::{ChunkCacheBuilder, ResizeDiscard};
//! use chunkring::traits::{Tile, TileSource};
//!
//! struct Column { pos: (i32, i32), heights: Vec<u8> }
//! impl Tile for Column {
//!     fn position(&self) -> (i32, i32) { self.pos }
//! }
//!
//! struct Decoder;
//! impl TileSource for Decoder {
//!     type Tile = Column;
//!     type Payload = Vec<u8>;
//!     fn build(&self, x: i32, z: i32, heights: Vec<u8>) -> Column {
//!         Column { pos: (x, z), heights }
//!     }
//!     fn empty_tile(&self) -> Column {
//!         Column { pos: (0, 0), heights: Vec::new() }
//!     }
//! }
//!
//! let cache = ChunkCacheBuilder::new(4)
//!     .center(10, -3)
//!     .resize_discard(ResizeDiscard::Notify)
//!     .build(Decoder, |tile: Arc<Column>| drop(tile));
//!
//! assert_eq!(cache.center(), (10, -3));
//! assert_eq!(cache.radius(), 4);
//! assert!(cache.install(12, -1, vec![64; 256]).is_some());
//! assert_eq!(cache.loaded_count(), 1);
//! ```

use crate::cache::ChunkCache;
use crate::ds::Viewport;
use crate::error::ConfigError;
use crate::traits::{TileSource, UnloadSink};

/// What happens to tiles that fall outside the viewport during a resize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResizeDiscard {
    /// Release them without notifying the unload sink.
    #[default]
    Silent,
    /// Route each of them through the unload sink after the new storage is
    /// published.
    Notify,
}

/// Configures and constructs a [`ChunkCache`].
#[derive(Debug, Clone)]
pub struct ChunkCacheBuilder {
    radius: u32,
    center: (i32, i32),
    resize_discard: ResizeDiscard,
    light_queue_capacity: usize,
}

impl ChunkCacheBuilder {
    /// Starts a builder for a viewport of `radius` centered on the origin.
    pub fn new(radius: u32) -> Self {
        Self {
            radius,
            center: (0, 0),
            resize_discard: ResizeDiscard::default(),
            light_queue_capacity: 0,
        }
    }

    /// Initial viewport center.
    pub fn center(mut self, x: i32, z: i32) -> Self {
        self.center = (x, z);
        self
    }

    /// Policy for tiles discarded by [`ChunkCache::resize`].
    pub fn resize_discard(mut self, policy: ResizeDiscard) -> Self {
        self.resize_discard = policy;
        self
    }

    /// Pre-allocates room for `capacity` queued light tasks.
    pub fn light_queue_capacity(mut self, capacity: usize) -> Self {
        self.light_queue_capacity = capacity;
        self
    }

    /// Builds the cache.
    ///
    /// # Panics
    ///
    /// Panics on invalid configuration; use [`try_build`](Self::try_build) for
    /// user-supplied settings.
    pub fn build<S, U>(self, source: S, sink: U) -> ChunkCache<S, U>
    where
        S: TileSource,
        U: UnloadSink<S::Tile>,
    {
        match self.try_build(source, sink) {
            Ok(cache) => cache,
            Err(err) => panic!("invalid chunk cache configuration: {err}"),
        }
    }

    /// Builds the cache, rejecting invalid configuration.
    pub fn try_build<S, U>(self, source: S, sink: U) -> Result<ChunkCache<S, U>, ConfigError>
    where
        S: TileSource,
        U: UnloadSink<S::Tile>,
    {
        let viewport = Viewport::try_new(self.center.0, self.center.1, self.radius)?;
        Ok(ChunkCache::from_parts(
            viewport,
            self.resize_discard,
            self.light_queue_capacity,
            source,
            sink,
        ))
    }
}
