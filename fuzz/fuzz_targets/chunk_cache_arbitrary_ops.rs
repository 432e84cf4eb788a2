#![no_main]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chunkring::cache::ChunkCache;
use chunkring::light::{LightLayer, LightTask, SectionPos};
use chunkring::traits::{LightEngine, Tile, TileSource};
use libfuzzer_sys::fuzz_target;

struct Column((i32, i32));

impl Tile for Column {
    fn position(&self) -> (i32, i32) {
        self.0
    }
}

struct Decoder;

impl TileSource for Decoder {
    type Tile = Column;
    type Payload = ();

    fn build(&self, x: i32, z: i32, _: ()) -> Column {
        Column((x, z))
    }

    fn empty_tile(&self) -> Column {
        Column((i32::MIN, i32::MIN))
    }
}

struct Nop;

impl LightEngine for Nop {
    fn set_enabled(&mut self, _: (i32, i32), _: bool) {}
    fn queue_section_update(&mut self, _: LightLayer, _: SectionPos, _: &[u8]) {}
    fn update_section_status(&mut self, _: SectionPos, _: bool) {}
}

// Fuzz arbitrary operation sequences on ChunkCache
//
// Lookups must only return tiles built for the requested coordinate, and every
// tile ever built ends up loaded, unloaded, or discarded by a resize.
fuzz_target!(|data: &[u8]| {
    let unloaded = Arc::new(AtomicUsize::new(0));
    let counter = unloaded.clone();
    let cache = ChunkCache::new(2, Decoder, move |_tile: Arc<Column>| {
        counter.fetch_add(1, Ordering::Relaxed);
    });

    for op in data.chunks_exact(3) {
        let x = i32::from(op[1] as i8) / 4;
        let z = i32::from(op[2] as i8) / 4;
        match op[0] % 7 {
            0 => {
                cache.install(x, z, ());
            },
            1 => {
                cache.drop_chunk(x, z);
            },
            2 => {
                if let Some(tile) = cache.get_chunk(x, z, true) {
                    assert!(cache.is_empty_tile(&tile) || tile.position() == (x, z));
                }
            },
            3 => cache.recenter(x, z),
            4 => cache.resize(2 + u32::from(op[1] % 6)),
            5 => cache.push_light_task(LightTask::SectionStatus {
                section: SectionPos::new(x, 0, z),
                is_empty: op[2] % 2 == 0,
            }),
            _ => {
                cache.drain_light_tasks(&mut Nop);
            },
        }

        cache.check_invariants().unwrap();
    }

    let stats = cache.stats();
    let unloaded = unloaded.load(Ordering::Relaxed) as u64;
    assert_eq!(
        stats.installs,
        cache.loaded_count() as u64 + unloaded + stats.resize_discarded
    );
});
