//! Viewport-aware chunk cache over a ring-indexed slot array.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────────────────────────────────────────────────────────────────┐
//!   │                         ChunkCache<S, U>                               │
//!   │                                                                        │
//!   │   center: AtomicU64 (packed x, z)       writer_gate: RwLock<()>        │
//!   │                                                                        │
//!   │   storage: RwLock<Arc<SlotArray<T>>> ──► ┌──────────────────────────┐  │
//!   │            (write-locked only for swap)  │ SlotArray (radius r)     │  │
//!   │                                          │ slots[dim*dim], occupied │  │
//!   │                                          └──────────────────────────┘  │
//!   │                                                                        │
//!   │   empty: Arc<T> (sentinel)    light_tasks: DeferredQueue<LightTask>    │
//!   └────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operation Flow
//!
//! ```text
//!   get_chunk(x, z)            install(x, z, payload)      resize(r')
//!   ───────────────            ──────────────────────      ──────────
//!   snapshot storage           gate.read()                 gate.write()
//!   in range?                  in range? else warn         build SlotArray(r')
//!   slot = index_of(x, z)      tile = source.build(..)     migrate survivors
//!   occupant.pos == (x, z)?    old = replace(slot, tile)   swap storage handle
//!                              gate released               gate released
//!                              sink.on_unload(old)         (optional notify)
//! ```
//!
//! Readers never touch the writer gate. `install`/`drop_chunk` share it, so
//! they run concurrently with each other and only wait while a resize is
//! migrating. Per-slot locks linearize an install and a drop racing on the
//! same coordinate.
//!
//! ## Slot validity
//!
//! Recentering moves the viewport without touching storage, so a slot can hold
//! a tile for a coordinate that has since left the viewport. Every lookup and
//! drop compares the occupant's own position to the requested coordinate.
//!
//! ## Performance Characteristics
//!
//! | Operation      | Time            | Notes                               |
//! |----------------|-----------------|-------------------------------------|
//! | `get_chunk`    | O(1)            | two read locks, one `Arc` clone (1) |
//! | `install`      | O(1)            | plus `TileSource::build`            |
//! | `drop_chunk`   | O(1)            | identity CAS                        |
//! | `recenter`     | O(1)            | single atomic store                 |
//! | `resize`       | O(old slots)    | builds before publishing            |
//!
//! (1) `parking_lot` locks are eventually fair: a resize queued on the storage
//! handle for its pointer swap can hold off new readers for the length of that
//! swap. Migration itself runs under the writer gate and never blocks readers.

mod stats;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, trace, warn};
use parking_lot::RwLock;
use rustc_hash::FxHashSet;

pub use self::stats::CacheStatsSnapshot;
use self::stats::CacheCounters;
use crate::builder::{ChunkCacheBuilder, ResizeDiscard};
use crate::ds::viewport::{pack_center, unpack_center};
use crate::ds::{DeferredQueue, SlotArray, Viewport};
use crate::error::{ConfigError, InvariantError};
use crate::light::{DrainReport, LightTask};
use crate::traits::{LightEngine, Tile, TileSource, UnloadSink};

/// Concurrent chunk cache for a moving square viewport.
///
/// Writers (`install`, `drop_chunk`) and the reader (`get_chunk`) may run on
/// different threads. `recenter`, `resize` and `drain_light_tasks` belong to
/// the tick thread.
pub struct ChunkCache<S: TileSource, U> {
    storage: RwLock<Arc<SlotArray<S::Tile>>>,
    center: AtomicU64,
    writer_gate: RwLock<()>,
    source: S,
    sink: U,
    empty: Arc<S::Tile>,
    light_tasks: DeferredQueue<LightTask>,
    resize_discard: ResizeDiscard,
    counters: CacheCounters,
}

impl<S, U> ChunkCache<S, U>
where
    S: TileSource,
    U: UnloadSink<S::Tile>,
{
    /// Creates a cache of `radius` centered on the origin.
    ///
    /// # Panics
    ///
    /// Panics if `radius < 2`.
    pub fn new(radius: u32, source: S, sink: U) -> Self {
        ChunkCacheBuilder::new(radius).build(source, sink)
    }

    /// Fallible variant of [`ChunkCache::new`].
    pub fn try_new(radius: u32, source: S, sink: U) -> Result<Self, ConfigError> {
        ChunkCacheBuilder::new(radius).try_build(source, sink)
    }

    pub(crate) fn from_parts(
        viewport: Viewport,
        resize_discard: ResizeDiscard,
        light_queue_capacity: usize,
        source: S,
        sink: U,
    ) -> Self {
        let (x, z) = viewport.center();
        let empty = Arc::new(source.empty_tile());
        Self {
            storage: RwLock::new(Arc::new(SlotArray::new(viewport.radius()))),
            center: AtomicU64::new(pack_center(x, z)),
            writer_gate: RwLock::new(()),
            source,
            sink,
            empty,
            light_tasks: DeferredQueue::with_capacity(light_queue_capacity),
            resize_discard,
            counters: CacheCounters::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Viewport
    // -----------------------------------------------------------------------

    #[inline]
    fn current(&self) -> Arc<SlotArray<S::Tile>> {
        Arc::clone(&self.storage.read())
    }

    #[inline]
    fn viewport_of(&self, storage: &SlotArray<S::Tile>) -> Viewport {
        let (x, z) = self.center();
        Viewport::new(x, z, storage.radius())
    }

    /// Current viewport center.
    pub fn center(&self) -> (i32, i32) {
        unpack_center(self.center.load(Ordering::Acquire))
    }

    /// Current viewport radius.
    pub fn radius(&self) -> u32 {
        self.storage.read().radius()
    }

    /// Current center and radius.
    pub fn viewport(&self) -> Viewport {
        self.viewport_of(&self.current())
    }

    /// Returns `true` if `(x, z)` lies inside the current viewport.
    pub fn in_range(&self, x: i32, z: i32) -> bool {
        self.viewport().in_range(x, z)
    }

    /// Moves the viewport center. Storage is left untouched.
    pub fn recenter(&self, x: i32, z: i32) {
        self.center.store(pack_center(x, z), Ordering::Release);
    }

    /// Policy applied to tiles left behind by [`resize`](Self::resize).
    pub fn resize_discard(&self) -> ResizeDiscard {
        self.resize_discard
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    fn lookup(&self, x: i32, z: i32) -> Option<Arc<S::Tile>> {
        let storage = self.current();
        let viewport = self.viewport_of(&storage);
        if !viewport.in_range(x, z) {
            return None;
        }
        storage
            .get(viewport.index_of(x, z))
            .filter(|tile| tile.position() == (x, z))
    }

    /// Returns the tile loaded at `(x, z)`.
    ///
    /// On a miss (out of range, empty slot, or a stale occupant) this returns
    /// the shared empty tile when `required` is set and `None` otherwise.
    pub fn get_chunk(&self, x: i32, z: i32, required: bool) -> Option<Arc<S::Tile>> {
        match self.lookup(x, z) {
            Some(tile) => Some(tile),
            None if required => Some(Arc::clone(&self.empty)),
            None => None,
        }
    }

    /// Returns `true` if a tile is loaded at `(x, z)`.
    pub fn contains(&self, x: i32, z: i32) -> bool {
        self.lookup(x, z).is_some()
    }

    /// The shared placeholder returned for required misses.
    pub fn empty_tile(&self) -> &Arc<S::Tile> {
        &self.empty
    }

    /// Returns `true` if `tile` is the shared placeholder.
    pub fn is_empty_tile(&self, tile: &Arc<S::Tile>) -> bool {
        Arc::ptr_eq(tile, &self.empty)
    }

    /// Number of occupied slots in the current storage.
    ///
    /// Stale occupants that have left the viewport still count until they are
    /// displaced or a resize drops them.
    pub fn loaded_count(&self) -> usize {
        self.storage.read().len()
    }

    /// Slot count of the current storage.
    pub fn capacity(&self) -> usize {
        self.storage.read().capacity()
    }

    // -----------------------------------------------------------------------
    // Range queries
    // -----------------------------------------------------------------------

    /// Calls `f` for every loaded tile whose position is inside the viewport.
    pub fn for_each_loaded(&self, mut f: impl FnMut(&Arc<S::Tile>)) {
        let storage = self.current();
        let viewport = self.viewport_of(&storage);
        for (_, tile) in storage.iter() {
            let (x, z) = tile.position();
            if viewport.in_range(x, z) {
                f(&tile);
            }
        }
    }

    /// Every loaded tile inside the viewport, in slot order.
    pub fn loaded_chunks(&self) -> Vec<Arc<S::Tile>> {
        let mut tiles = Vec::new();
        self.for_each_loaded(|tile| tiles.push(Arc::clone(tile)));
        tiles
    }

    /// Loaded tiles within the inclusive rectangle `min..=max`, row by row.
    ///
    /// The rectangle is clipped to the viewport first.
    pub fn chunks_in_rect(&self, min: (i32, i32), max: (i32, i32)) -> Vec<Arc<S::Tile>> {
        let storage = self.current();
        let viewport = self.viewport_of(&storage);
        let (lo_x, lo_z) = viewport.min_corner();
        let (hi_x, hi_z) = viewport.max_corner();
        let (min_x, min_z) = (min.0.max(lo_x), min.1.max(lo_z));
        let (max_x, max_z) = (max.0.min(hi_x), max.1.min(hi_z));

        let mut tiles = Vec::new();
        if min_x > max_x || min_z > max_z {
            return tiles;
        }
        for z in min_z..=max_z {
            for x in min_x..=max_x {
                if let Some(tile) = storage
                    .get(viewport.index_of(x, z))
                    .filter(|tile| tile.position() == (x, z))
                {
                    tiles.push(tile);
                }
            }
        }
        tiles
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Builds a tile from `payload` and stores it at `(x, z)`.
    ///
    /// Out-of-range requests are logged and ignored. Any previous occupant of
    /// the slot, stale or not, is handed to the unload sink once. Returns the
    /// new tile.
    pub fn install(&self, x: i32, z: i32, payload: S::Payload) -> Option<Arc<S::Tile>> {
        let gate = self.writer_gate.read();
        let storage = self.current();
        let viewport = self.viewport_of(&storage);
        if !viewport.in_range(x, z) {
            self.counters.record_out_of_range();
            warn!(
                "ignoring chunk install at ({x}, {z}): outside viewport centered on {:?} with radius {}",
                viewport.center(),
                viewport.radius()
            );
            return None;
        }

        let tile = Arc::new(self.source.build(x, z, payload));
        let previous =
            storage.unconditional_replace(viewport.index_of(x, z), Some(Arc::clone(&tile)));
        drop(gate);

        self.counters.record_install(previous.is_some());
        if let Some(previous) = previous {
            trace!(
                "install at ({x}, {z}) displaced chunk at {:?}",
                previous.position()
            );
            self.sink.on_unload(previous);
        }
        Some(tile)
    }

    /// Unloads the tile at `(x, z)` if it is still the slot's occupant.
    ///
    /// Returns `true` if a tile was unloaded. A drop that finds a different
    /// occupant, or loses a race with a fresh install, is discarded silently.
    pub fn drop_chunk(&self, x: i32, z: i32) -> bool {
        let gate = self.writer_gate.read();
        let storage = self.current();
        let viewport = self.viewport_of(&storage);
        if !viewport.in_range(x, z) {
            self.counters.record_out_of_range();
            warn!(
                "ignoring chunk drop at ({x}, {z}): outside viewport centered on {:?} with radius {}",
                viewport.center(),
                viewport.radius()
            );
            return false;
        }

        let index = viewport.index_of(x, z);
        let occupant = match storage.get(index) {
            Some(tile) if tile.position() == (x, z) => tile,
            _ => {
                self.counters.record_stale_drop();
                trace!("stale drop at ({x}, {z}): slot holds a different chunk");
                return false;
            },
        };
        if !storage.conditional_replace(index, &occupant, None) {
            self.counters.record_stale_drop();
            trace!("stale drop at ({x}, {z}): slot was replaced concurrently");
            return false;
        }
        drop(gate);

        self.counters.record_drop();
        self.sink.on_unload(occupant);
        true
    }

    /// Rebuilds storage for `new_radius`, carrying over every tile that is in
    /// range under the current center and the new radius.
    ///
    /// Migrated tiles are not reported to the unload sink. Tiles left behind
    /// are handled per [`ResizeDiscard`]. A resize to the current radius is a
    /// no-op.
    ///
    /// # Panics
    ///
    /// Panics if `new_radius < 2`.
    pub fn resize(&self, new_radius: u32) {
        let gate = self.writer_gate.write();
        let old = self.current();
        if old.radius() == new_radius {
            return;
        }

        let (cx, cz) = self.center();
        let target = Viewport::new(cx, cz, new_radius);
        let replacement = SlotArray::new(new_radius);
        let notify = self.resize_discard == ResizeDiscard::Notify;
        let mut discarded = Vec::new();
        let mut discarded_count = 0;
        let mut migrated = 0;

        for (_, tile) in old.iter() {
            let (x, z) = tile.position();
            if target.in_range(x, z) {
                replacement.unconditional_replace(target.index_of(x, z), Some(tile));
                migrated += 1;
            } else {
                discarded_count += 1;
                if notify {
                    discarded.push(tile);
                }
            }
        }

        *self.storage.write() = Arc::new(replacement);
        drop(gate);

        self.counters.record_resize(migrated, discarded_count);
        debug!(
            "resized chunk cache from radius {} to {new_radius} around ({cx}, {cz}): {migrated} migrated, {discarded_count} discarded",
            old.radius()
        );
        for tile in discarded {
            self.sink.on_unload(tile);
        }
    }

    /// Unloads every stored tile, notifying the sink for each. Returns how
    /// many were unloaded.
    pub fn clear(&self) -> usize {
        let gate = self.writer_gate.read();
        let removed = self.current().take_all();
        drop(gate);

        self.counters.record_clear(removed.len());
        debug!("cleared {} chunks from cache", removed.len());
        let count = removed.len();
        for tile in removed {
            self.sink.on_unload(tile);
        }
        count
    }

    // -----------------------------------------------------------------------
    // Light tasks
    // -----------------------------------------------------------------------

    /// Queues light work for a later tick. Callable from any thread.
    pub fn push_light_task(&self, task: LightTask) {
        self.light_tasks.push(task);
    }

    /// Runs this tick's batch of light tasks against `engine`.
    ///
    /// Each task re-checks that its chunk is still loaded and is skipped if
    /// not. Call from the tick thread only.
    pub fn drain_light_tasks<E: LightEngine + ?Sized>(&self, engine: &mut E) -> DrainReport {
        let mut report = DrainReport::default();
        self.light_tasks.drain_batch(|task| {
            let (x, z) = task.chunk();
            if task.requires_loaded_chunk() && !self.contains(x, z) {
                trace!("skipping light task for unloaded chunk ({x}, {z})");
                report.skipped += 1;
                return;
            }
            task.apply(&mut *engine);
            report.executed += 1;
        });
        self.counters.record_light_drain(report);
        report
    }

    /// Returns `true` if no light task is waiting.
    pub fn is_light_queue_empty(&self) -> bool {
        self.light_tasks.is_empty()
    }

    /// Number of queued light tasks not yet drained.
    pub fn pending_light_tasks(&self) -> usize {
        self.light_tasks.len()
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Counters plus current gauges.
    pub fn stats(&self) -> CacheStatsSnapshot {
        let storage = self.current();
        CacheStatsSnapshot {
            loaded: storage.len(),
            capacity: storage.capacity(),
            radius: storage.radius(),
            pending_light_tasks: self.light_tasks.len(),
            ..self.counters.snapshot()
        }
    }

    /// Zeroes every counter. Gauges are unaffected.
    pub fn reset_stats(&self) {
        self.counters.reset();
    }

    /// Verifies storage bookkeeping. Meaningful only while no writer is active.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let storage = self.current();
        let mut positions = FxHashSet::default();
        let mut occupied = 0;

        for (index, tile) in storage.iter() {
            occupied += 1;
            if self.is_empty_tile(&tile) {
                return Err(InvariantError::new(format!(
                    "empty placeholder stored in slot {index}"
                )));
            }
            let (x, z) = tile.position();
            let expected = storage.index_of(x, z);
            if expected != index {
                return Err(InvariantError::new(format!(
                    "chunk ({x}, {z}) stored in slot {index}, expected slot {expected}"
                )));
            }
            if !positions.insert((x, z)) {
                return Err(InvariantError::new(format!(
                    "chunk ({x}, {z}) stored more than once"
                )));
            }
        }

        if occupied != storage.len() {
            return Err(InvariantError::new(format!(
                "occupied count {} != {occupied} occupied slots",
                storage.len()
            )));
        }
        Ok(())
    }
}

impl<S: TileSource, U> std::fmt::Debug for ChunkCache<S, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let storage = self.storage.read();
        f.debug_struct("ChunkCache")
            .field("center", &unpack_center(self.center.load(Ordering::Relaxed)))
            .field("radius", &storage.radius())
            .field("loaded", &storage.len())
            .field("pending_light_tasks", &self.light_tasks.len())
            .field("resize_discard", &self.resize_discard)
            .finish()
    }
}
