// ==============================================
// CHUNK CACHE CONCURRENCY TESTS (integration)
// ==============================================
//
// Races between the network producer (install/drop), the render reader
// (get_chunk) and the tick thread (recenter/resize/drain). These require
// multi-threaded execution and cannot live inline.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use chunkring::builder::{ChunkCacheBuilder, ResizeDiscard};
use chunkring::cache::ChunkCache;
use chunkring::light::{DrainReport, LightLayer, LightTask, SectionPos};
use chunkring::traits::{LightEngine, Tile, TileSource, UnloadSink};

#[derive(Debug)]
struct Column {
    pos: (i32, i32),
    generation: usize,
}

impl Tile for Column {
    fn position(&self) -> (i32, i32) {
        self.pos
    }
}

struct Decoder;

impl TileSource for Decoder {
    type Tile = Column;
    type Payload = usize;

    fn build(&self, x: i32, z: i32, generation: usize) -> Column {
        Column {
            pos: (x, z),
            generation,
        }
    }

    fn empty_tile(&self) -> Column {
        Column {
            pos: (i32::MIN, i32::MIN),
            generation: usize::MAX,
        }
    }
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Arc<Column>>>>);

impl UnloadSink<Column> for Recorder {
    fn on_unload(&self, tile: Arc<Column>) {
        self.0.lock().unwrap().push(tile);
    }
}

type Cache = ChunkCache<Decoder, Recorder>;

fn shared_cache(radius: u32) -> (Arc<Cache>, Recorder) {
    let recorder = Recorder::default();
    let cache = Arc::new(ChunkCache::new(radius, Decoder, recorder.clone()));
    (cache, recorder)
}

// ==============================================
// Install vs Drop on the same coordinate
// ==============================================
//
// A drop that observed the old occupant must not remove a tile installed
// after it looked. Every tile ever built ends up either loaded or unloaded
// exactly once.

mod install_drop_race {
    use super::*;

    #[test]
    fn every_tile_is_loaded_or_unloaded_exactly_once() {
        for _ in 0..500 {
            let (cache, recorder) = shared_cache(2);
            let original = cache.install(0, 0, 0).unwrap();
            let barrier = Arc::new(Barrier::new(2));

            let cache_a = cache.clone();
            let barrier_a = barrier.clone();
            let dropper = thread::spawn(move || {
                barrier_a.wait();
                cache_a.drop_chunk(0, 0)
            });

            let cache_b = cache.clone();
            let barrier_b = barrier.clone();
            let installer = thread::spawn(move || {
                barrier_b.wait();
                cache_b.install(0, 0, 1).unwrap()
            });

            let dropped = dropper.join().unwrap();
            let fresh = installer.join().unwrap();

            let unloaded = recorder.0.lock().unwrap();
            assert_eq!(unloaded.len() + cache.loaded_count(), 2);
            assert!(unloaded.iter().any(|t| Arc::ptr_eq(t, &original)));
            if !dropped {
                assert!(Arc::ptr_eq(&cache.get_chunk(0, 0, false).unwrap(), &fresh));
            }
            if let Some(current) = cache.get_chunk(0, 0, false) {
                assert!(Arc::ptr_eq(&current, &fresh));
                assert!(!unloaded.iter().any(|t| Arc::ptr_eq(t, &fresh)));
            }
            drop(unloaded);
            cache.check_invariants().unwrap();
        }
    }
}

// ==============================================
// Readers never observe a foreign tile
// ==============================================

mod reader_validity {
    use super::*;

    #[test]
    fn get_chunk_returns_only_matching_positions() {
        let (cache, _) = shared_cache(3);
        let stop = Arc::new(AtomicBool::new(false));
        let checked = Arc::new(AtomicUsize::new(0));

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let cache = cache.clone();
                let stop = stop.clone();
                let checked = checked.clone();
                thread::spawn(move || {
                    while !stop.load(Ordering::Relaxed) {
                        for z in -12..=12 {
                            for x in -12..=12 {
                                if let Some(tile) = cache.get_chunk(x, z, true) {
                                    assert!(
                                        cache.is_empty_tile(&tile) || tile.pos == (x, z),
                                        "asked for ({x}, {z}), got {:?}",
                                        tile.pos
                                    );
                                }
                            }
                        }
                        checked.fetch_add(1, Ordering::Relaxed);
                    }
                })
            })
            .collect();

        let writer = {
            let cache = cache.clone();
            thread::spawn(move || {
                for step in 0..200 {
                    let cx = (step % 17) - 8;
                    let cz = (step % 11) - 5;
                    cache.recenter(cx, cz);
                    for dz in -3..=3 {
                        for dx in -3..=3 {
                            cache.install(cx + dx, cz + dz, step as usize);
                        }
                    }
                    if step % 3 == 0 {
                        cache.drop_chunk(cx, cz);
                    }
                }
            })
        };

        writer.join().unwrap();
        stop.store(true, Ordering::Relaxed);
        for reader in readers {
            reader.join().unwrap();
        }
        assert!(checked.load(Ordering::Relaxed) > 0);
        cache.check_invariants().unwrap();
    }
}

// ==============================================
// Resize while the producer is installing
// ==============================================
//
// Resize holds the writer gate exclusively, so no install can land in the
// old array after migration. Counters must reconcile exactly.

mod resize_during_install {
    use super::*;

    fn run(policy: ResizeDiscard) {
        let recorder = Recorder::default();
        let cache = Arc::new(
            ChunkCacheBuilder::new(4)
                .resize_discard(policy)
                .build(Decoder, recorder.clone()),
        );
        let barrier = Arc::new(Barrier::new(3));

        let producers: Vec<_> = (0..2)
            .map(|id| {
                let cache = cache.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    for round in 0..50 {
                        for z in -4..=4 {
                            for x in -4..=4 {
                                cache.install(x, z, round * 2 + id);
                                if (x + z + round as i32) % 5 == 0 {
                                    cache.drop_chunk(x, z);
                                }
                            }
                        }
                    }
                })
            })
            .collect();

        let tick = {
            let cache = cache.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for i in 0..100 {
                    cache.resize(if i % 2 == 0 { 2 } else { 4 });
                }
            })
        };

        for producer in producers {
            producer.join().unwrap();
        }
        tick.join().unwrap();

        cache.check_invariants().unwrap();
        let stats = cache.stats();
        let removed = stats.displacements + stats.drops + stats.resize_discarded;
        assert_eq!(stats.installs - removed, cache.loaded_count() as u64);

        let notified = recorder.0.lock().unwrap().len() as u64;
        match policy {
            ResizeDiscard::Silent => assert_eq!(notified, stats.displacements + stats.drops),
            ResizeDiscard::Notify => assert_eq!(notified, removed),
        }
    }

    #[test]
    fn counters_reconcile_with_silent_discard() {
        run(ResizeDiscard::Silent);
    }

    #[test]
    fn counters_reconcile_with_notify_discard() {
        run(ResizeDiscard::Notify);
    }

    #[test]
    fn concurrent_resize_calls_serialize() {
        let (cache, _) = shared_cache(3);
        for z in -3..=3 {
            for x in -3..=3 {
                cache.install(x, z, 0);
            }
        }
        let barrier = Arc::new(Barrier::new(4));
        let handles: Vec<_> = [5u32, 3, 6]
            .into_iter()
            .map(|radius| {
                let cache = cache.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    cache.resize(radius);
                })
            })
            .collect();
        barrier.wait();
        cache.resize(2);
        for handle in handles {
            handle.join().unwrap();
        }
        cache.check_invariants().unwrap();
        assert!(cache.contains(0, 0));
        assert!(cache.contains(2, 2));
    }
}

// ==============================================
// Light queue: many producers, one tick thread
// ==============================================

mod light_queue {
    use super::*;

    #[derive(Default)]
    struct Counting {
        applied: usize,
    }

    impl LightEngine for Counting {
        fn set_enabled(&mut self, _: (i32, i32), _: bool) {
            self.applied += 1;
        }

        fn queue_section_update(&mut self, _: LightLayer, _: SectionPos, _: &[u8]) {
            self.applied += 1;
        }

        fn update_section_status(&mut self, _: SectionPos, _: bool) {
            self.applied += 1;
        }
    }

    #[test]
    fn every_pushed_task_is_eventually_drained() {
        let (cache, _) = shared_cache(2);
        cache.install(0, 0, 0);
        let per_thread = 2_000;
        let barrier = Arc::new(Barrier::new(5));

        let producers: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..per_thread {
                        cache.push_light_task(LightTask::SectionStatus {
                            section: SectionPos::new(0, i % 24, 0),
                            is_empty: false,
                        });
                    }
                })
            })
            .collect();

        barrier.wait();
        let mut engine = Counting::default();
        let mut report = DrainReport::default();
        let mut done = false;
        while !done {
            done = producers.iter().all(|p| p.is_finished());
            let tick = cache.drain_light_tasks(&mut engine);
            report.executed += tick.executed;
            report.skipped += tick.skipped;
        }
        for producer in producers {
            producer.join().unwrap();
        }
        while !cache.is_light_queue_empty() {
            let tick = cache.drain_light_tasks(&mut engine);
            report.executed += tick.executed;
        }

        assert_eq!(report.executed + report.skipped, 4 * per_thread as usize);
        assert_eq!(report.skipped, 0);
        assert_eq!(engine.applied, report.executed);
    }
}
