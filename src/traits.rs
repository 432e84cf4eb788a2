//! # Collaborator Traits
//!
//! The cache never looks inside a tile, never decodes payloads, and never runs
//! lighting itself. Those concerns are reached through the narrow traits below.
//!
//! ## Architecture
//!
//! ```text
//!   network decode thread                         tick thread
//!   ─────────────────────                         ───────────
//!        │ payload                                     │
//!        ▼                                             ▼
//!   ┌──────────────┐  build()   ┌──────────────────────────────┐
//!   │  TileSource  │ ─────────► │         ChunkCache           │
//!   └──────────────┘            │                              │
//!                               │  displaced Arc<Tile>         │
//!   ┌──────────────┐ on_unload()│                              │ drain_light_tasks()
//!   │  UnloadSink  │ ◄───────── │                              │ ──────────────┐
//!   └──────────────┘            └──────────────────────────────┘               ▼
//!                                                                     ┌──────────────┐
//!                                                                     │ LightEngine  │
//!                                                                     └──────────────┘
//! ```
//!
//! ## Trait Summary
//!
//! | Trait          | Called from        | Purpose                                  |
//! |----------------|--------------------|------------------------------------------|
//! | `Tile`         | any thread         | Position accessor for re-validation      |
//! | `TileSource`   | `install` caller   | Build immutable tiles from payloads      |
//! | `UnloadSink`   | mutating caller    | Teardown hook, once per displacement     |
//! | `LightEngine`  | tick thread        | Receives validated light tasks           |
//!
//! Closures work as unload sinks:
//!
//! ```
//! use std::sync::Arc;
//! use chunkring::traits::{Tile, UnloadSink};
//!
//! struct Flat(i32, i32);
//! impl Tile for Flat {
//!     fn position(&self) -> (i32, i32) {
//!         (self.0, self.1)
//!     }
//! }
//!
//! let sink = |tile: Arc<Flat>| println!("unloaded {:?}", tile.position());
//! sink.on_unload(Arc::new(Flat(1, 2)));
//! ```

use std::sync::Arc;

use crate::light::{LightLayer, SectionPos};

/// A loaded chunk as far as the cache is concerned.
pub trait Tile: Send + Sync {
    /// Chunk coordinate this tile was built for.
    fn position(&self) -> (i32, i32);
}

/// Builds tiles from decoded payloads.
pub trait TileSource: Send + Sync {
    type Tile: Tile;
    type Payload;

    /// Constructs the tile for `(x, z)`.
    fn build(&self, x: i32, z: i32, payload: Self::Payload) -> Self::Tile;

    /// Constructs the shared placeholder returned for required misses.
    /// Called once per cache.
    fn empty_tile(&self) -> Self::Tile;
}

/// Receives tiles that were displaced from the cache.
///
/// Invoked exactly once per genuine displacement, outside any cache lock. Not
/// invoked for migrations during a resize or for failed conditional drops.
pub trait UnloadSink<T>: Send + Sync {
    fn on_unload(&self, tile: Arc<T>);
}

impl<T, F> UnloadSink<T> for F
where
    F: Fn(Arc<T>) + Send + Sync,
{
    fn on_unload(&self, tile: Arc<T>) {
        self(tile)
    }
}

/// Sink that ignores every unload.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl<T> UnloadSink<T> for NoopSink {
    fn on_unload(&self, _tile: Arc<T>) {}
}

/// Illumination propagation, driven by queued light tasks.
pub trait LightEngine {
    /// Enables or disables lighting for a whole chunk column.
    fn set_enabled(&mut self, chunk: (i32, i32), enabled: bool);

    /// Queues raw light data for one section of one layer.
    fn queue_section_update(&mut self, layer: LightLayer, section: SectionPos, data: &[u8]);

    /// Marks a section as empty or non-empty for propagation.
    fn update_section_status(&mut self, section: SectionPos, is_empty: bool);
}

impl<E: LightEngine + ?Sized> LightEngine for &mut E {
    fn set_enabled(&mut self, chunk: (i32, i32), enabled: bool) {
        (**self).set_enabled(chunk, enabled)
    }

    fn queue_section_update(&mut self, layer: LightLayer, section: SectionPos, data: &[u8]) {
        (**self).queue_section_update(layer, section, data)
    }

    fn update_section_status(&mut self, section: SectionPos, is_empty: bool) {
        (**self).update_section_status(section, is_empty)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct At(i32, i32);

    impl Tile for At {
        fn position(&self) -> (i32, i32) {
            (self.0, self.1)
        }
    }

    #[test]
    fn closure_sink_receives_tiles() {
        let seen = Mutex::new(Vec::new());
        let sink = |tile: Arc<At>| seen.lock().unwrap().push(tile.position());
        sink.on_unload(Arc::new(At(3, -4)));
        sink.on_unload(Arc::new(At(0, 0)));
        assert_eq!(*seen.lock().unwrap(), vec![(3, -4), (0, 0)]);
    }

    #[test]
    fn noop_sink_drops_tile() {
        let tile = Arc::new(At(1, 1));
        UnloadSink::on_unload(&NoopSink, tile.clone());
        assert_eq!(Arc::strong_count(&tile), 1);
    }

    #[test]
    fn tile_trait_is_object_safe() {
        let tiles: Vec<Box<dyn Tile>> = vec![Box::new(At(1, 2))];
        assert_eq!(tiles[0].position(), (1, 2));
    }
}
