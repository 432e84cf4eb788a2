//! Unbounded FIFO drained in rate-limited batches.
//!
//! Producers push from any thread; a single consumer calls
//! [`DeferredQueue::drain_batch`] once per tick. The batch size adapts to the
//! backlog so small queues trickle out while a large backlog is cleared in one
//! go.
//!
//! ## Batch sizing
//!
//! ```text
//!   len L            batch
//!   ───────────────  ─────────────────────────
//!   L <  1000        max(10, L / 10)
//!   L >= 1000        L            (catch-up)
//!
//!   L = 50    → 10
//!   L = 400   → 40
//!   L = 1500  → 1500
//! ```
//!
//! Items are popped one at a time and run with the queue lock released, so an
//! item may push follow-up work. Follow-ups land behind everything already
//! queued and run in the same drain if the batch still has room. A catch-up
//! drain keeps popping until the queue is empty.
//!
//! ## Example Usage
//!
//! ```
//! use chunkring::ds::DeferredQueue;
//!
//! let queue = DeferredQueue::new();
//! for i in 0..50 {
//!     queue.push(i);
//! }
//!
//! let mut seen = Vec::new();
//! let ran = queue.drain_batch(|item| seen.push(item));
//! assert_eq!(ran, 10);
//! assert_eq!(seen, (0..10).collect::<Vec<_>>());
//! assert_eq!(queue.len(), 40);
//! ```

use std::collections::VecDeque;

use parking_lot::Mutex;

/// Backlog at or above which a drain empties the whole queue.
pub const CATCH_UP_THRESHOLD: usize = 1000;
/// Smallest batch a drain will attempt.
pub const MIN_BATCH: usize = 10;
/// Below the catch-up threshold a drain runs `len / BATCH_DIVISOR` items.
pub const BATCH_DIVISOR: usize = 10;

/// Number of items a drain attempts for a backlog of `len`.
#[inline]
pub fn batch_size(len: usize) -> usize {
    if len >= CATCH_UP_THRESHOLD {
        len
    } else {
        (len / BATCH_DIVISOR).max(MIN_BATCH)
    }
}

/// Thread-safe FIFO with tick-batched draining.
#[derive(Debug)]
pub struct DeferredQueue<T> {
    inner: Mutex<VecDeque<T>>,
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Appends `item` to the tail.
    pub fn push(&self, item: T) {
        self.inner.lock().push_back(item);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Removes and returns the head, if any.
    pub fn pop_front(&self) -> Option<T> {
        self.inner.lock().pop_front()
    }

    /// Discards every queued item and returns how many were dropped.
    pub fn clear(&self) -> usize {
        let mut inner = self.inner.lock();
        let dropped = inner.len();
        inner.clear();
        dropped
    }

    /// Runs up to [`batch_size`] items through `f` in FIFO order and returns
    /// how many ran. The size is taken from the length at call time; the drain
    /// stops early once the queue is empty. In catch-up mode it runs until the
    /// queue is empty, including items pushed while draining.
    ///
    /// Intended for a single consumer; concurrent drains stay memory-safe but
    /// interleave their batches.
    pub fn drain_batch(&self, mut f: impl FnMut(T)) -> usize {
        let backlog = self.len();
        let budget = if backlog >= CATCH_UP_THRESHOLD {
            usize::MAX
        } else {
            batch_size(backlog)
        };
        let mut ran = 0;
        while ran < budget {
            let Some(item) = self.pop_front() else {
                break;
            };
            f(item);
            ran += 1;
        }
        ran
    }
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
