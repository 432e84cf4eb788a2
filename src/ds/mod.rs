pub mod deferred_queue;
pub mod slot_array;
pub mod viewport;

pub use deferred_queue::{BATCH_DIVISOR, CATCH_UP_THRESHOLD, DeferredQueue, MIN_BATCH, batch_size};
pub use slot_array::SlotArray;
pub use viewport::{MIN_RADIUS, Viewport, dim_for, ring_index, wrap};
