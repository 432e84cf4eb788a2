//! chunkring: a viewport-aware chunk cache for streaming voxel worlds.
//!
//! Chunks live in a `(2r + 1)²` slot array addressed by toroidal wrapping, so
//! moving the viewport never copies storage. Installs and drops arrive from a
//! network thread while the render thread reads, and light work is deferred
//! into a batched queue drained on the tick thread.
//!
//! ```
//! use chunkring::prelude::*;
//! # struct Column((i32, i32));
//! # impl Tile for Column { fn position(&self) -> (i32, i32) { self.0 } }
//! # struct Decoder;
//! # impl TileSource for Decoder {
//! #     type Tile = Column;
//! #     type Payload = ();
//! #     fn build(&self, x: i32, z: i32, _: ()) -> Column { Column((x, z)) }
//! #     fn empty_tile(&self) -> Column { Column((0, 0)) }
//! # }
//!
//! let cache = ChunkCache::new(2, Decoder, NoopSink);
//! cache.install(1, 1, ());
//! assert!(cache.get_chunk(1, 1, false).is_some());
//!
//! cache.recenter(4, 0);
//! cache.install(6, 1, ()); // same slot as (1, 1)
//! assert!(cache.get_chunk(1, 1, false).is_none());
//! ```
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod builder;
pub mod cache;
pub mod ds;
pub mod error;
pub mod light;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;
