//! Simulated streaming client: a network thread installs the chunks around a
//! walking player while the main thread renders, resizes and drains light work.
//!
//! Run with: RUST_LOG=chunkring=debug cargo run --example basic_viewport

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use chunkring::prelude::*;

struct Column {
    pos: (i32, i32),
    heights: Vec<u8>,
}

impl Tile for Column {
    fn position(&self) -> (i32, i32) {
        self.pos
    }
}

struct Decoder;

impl TileSource for Decoder {
    type Tile = Column;
    type Payload = Vec<u8>;

    fn build(&self, x: i32, z: i32, heights: Vec<u8>) -> Column {
        Column { pos: (x, z), heights }
    }

    fn empty_tile(&self) -> Column {
        Column {
            pos: (0, 0),
            heights: vec![0; 256],
        }
    }
}

#[derive(Default)]
struct PrintEngine {
    updates: usize,
}

impl LightEngine for PrintEngine {
    fn set_enabled(&mut self, chunk: (i32, i32), enabled: bool) {
        log::debug!("light {} for {chunk:?}", if enabled { "on" } else { "off" });
    }

    fn queue_section_update(&mut self, _layer: LightLayer, _section: SectionPos, _data: &[u8]) {
        self.updates += 1;
    }

    fn update_section_status(&mut self, _section: SectionPos, _is_empty: bool) {}
}

enum Packet {
    Load(i32, i32),
    Unload(i32, i32),
}

fn main() {
    env_logger::init();

    const RADIUS: i32 = 4;
    let unloaded = Arc::new(AtomicUsize::new(0));
    let unload_counter = unloaded.clone();
    let cache = Arc::new(
        ChunkCacheBuilder::new(RADIUS as u32)
            .resize_discard(ResizeDiscard::Notify)
            .light_queue_capacity(256)
            .build(Decoder, move |_tile: Arc<Column>| {
                unload_counter.fetch_add(1, Ordering::Relaxed);
            }),
    );

    let (tx, rx) = mpsc::channel::<Packet>();
    let network = {
        let cache = cache.clone();
        thread::spawn(move || {
            for packet in rx {
                match packet {
                    Packet::Load(x, z) => {
                        let heights = vec![(x.unsigned_abs() % 64) as u8; 256];
                        if cache.install(x, z, heights).is_some() {
                            cache.push_light_task(LightTask::SetEnabled {
                                chunk: (x, z),
                                enabled: true,
                            });
                            cache.push_light_task(LightTask::SectionUpdate {
                                layer: LightLayer::Sky,
                                section: SectionPos::new(x, 4, z),
                                data: Arc::from(vec![15u8; 2048]),
                            });
                        }
                    },
                    Packet::Unload(x, z) => {
                        cache.push_light_task(LightTask::SetEnabled {
                            chunk: (x, z),
                            enabled: false,
                        });
                        cache.drop_chunk(x, z);
                    },
                }
            }
        })
    };

    let mut engine = PrintEngine::default();
    for step in 0..40 {
        let cx = step;
        cache.recenter(cx, 0);
        for z in -RADIUS..=RADIUS {
            let _ = tx.send(Packet::Load(cx + RADIUS, z));
            let _ = tx.send(Packet::Unload(cx - RADIUS - 1, z));
        }
        if step == 0 {
            for z in -RADIUS..=RADIUS {
                for x in -RADIUS..RADIUS {
                    let _ = tx.send(Packet::Load(x, z));
                }
            }
        }
        if step == 20 {
            cache.resize(3);
        }

        let report = cache.drain_light_tasks(&mut engine);
        let visible: usize = cache
            .chunks_in_rect((cx - 1, -1), (cx + 1, 1))
            .iter()
            .map(|tile| tile.heights.len())
            .sum();
        log::info!(
            "tick {step}: center ({cx}, 0), {} loaded, light {}/{} executed/skipped, {visible} heights near player",
            cache.loaded_count(),
            report.executed,
            report.skipped,
        );
    }

    drop(tx);
    let _ = network.join();
    while !cache.is_light_queue_empty() {
        cache.drain_light_tasks(&mut engine);
    }

    let stats = cache.stats();
    println!("{stats:#?}");
    println!(
        "unloaded {} tiles, {} light section updates applied",
        unloaded.load(Ordering::Relaxed),
        engine.updates
    );
    if let Err(err) = cache.check_invariants() {
        eprintln!("invariant violated: {err}");
    }
}
