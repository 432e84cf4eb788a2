//! Fixed-capacity, ring-indexed tile storage.
//!
//! One [`SlotArray`] backs one viewport radius. Each slot holds an optional
//! `Arc<T>` behind its own `parking_lot::RwLock`, so a read is a lock-protected
//! pointer clone and a write is a pointer swap. Readers never observe a torn
//! handle.
//!
//! ## Architecture
//!
//! ```text
//!   SlotArray<T> (radius = 2, dim = 5)
//!
//!   slots: Box<[RwLock<Option<Arc<T>>>]>       occupied: AtomicUsize
//!   ┌──────┬──────┬──────┬──────┬──────┐
//!   │ (0,0)│ None │ (7,0)│ None │(-1,0)│  row wrap(z) = 0
//!   ├──────┼──────┼──────┼──────┼──────┤
//!   │ ...  │      │      │      │      │
//!   └──────┴──────┴──────┴──────┴──────┘
//!
//!   (7, 0) sits in column wrap(7, 5) = 2. It may be stale: the array never
//!   checks positions, the cache does.
//! ```
//!
//! ## Ownership transfer
//!
//! | Operation               | Slot change          | `occupied`           |
//! |-------------------------|----------------------|----------------------|
//! | `unconditional_replace` | always swaps         | +1 / -1 / unchanged  |
//! | `conditional_replace`   | swaps iff identical  | same as above on hit |
//!
//! The count is adjusted while the slot lock is held, so it always agrees with
//! the slots once in-flight writers finish.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::ds::viewport::{MIN_RADIUS, dim_for, ring_index};

/// Ring-indexed array of `dim * dim` tile slots.
#[derive(Debug)]
pub struct SlotArray<T> {
    slots: Box<[RwLock<Option<Arc<T>>>]>,
    occupied: AtomicUsize,
    radius: u32,
    dim: usize,
}

impl<T> SlotArray<T> {
    /// Allocates an empty array sized for `radius`.
    ///
    /// # Panics
    ///
    /// Panics if `radius < MIN_RADIUS`.
    pub fn new(radius: u32) -> Self {
        assert!(
            radius >= MIN_RADIUS,
            "slot array radius must be >= {MIN_RADIUS}, got {radius}"
        );
        let dim = dim_for(radius);
        let slots = (0..dim * dim).map(|_| RwLock::new(None)).collect();
        Self {
            slots,
            occupied: AtomicUsize::new(0),
            radius,
            dim,
        }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.occupied.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ring slot of `(x, z)` for this array's side length.
    #[inline]
    pub fn index_of(&self, x: i32, z: i32) -> usize {
        ring_index(x, z, self.dim)
    }

    /// Returns `true` if `(x, z)` is within this array's radius of `center`.
    #[inline]
    pub fn in_range(&self, center: (i32, i32), x: i32, z: i32) -> bool {
        let radius = i64::from(self.radius);
        (i64::from(x) - i64::from(center.0)).abs() <= radius
            && (i64::from(z) - i64::from(center.1)).abs() <= radius
    }

    /// Current occupant of `index`, or `None` if empty or out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Arc<T>> {
        self.slots.get(index)?.read().clone()
    }

    /// Stores `new` at `index` and returns the previous occupant.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity()`.
    pub fn unconditional_replace(&self, index: usize, new: Option<Arc<T>>) -> Option<Arc<T>> {
        let mut slot = self.slots[index].write();
        let previous = std::mem::replace(&mut *slot, new);
        self.account(previous.is_some(), slot.is_some());
        previous
    }

    /// Stores `new` at `index` only if the slot still holds `expected`
    /// (compared by identity). Returns `false` and changes nothing otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity()`.
    pub fn conditional_replace(&self, index: usize, expected: &Arc<T>, new: Option<Arc<T>>) -> bool {
        let mut slot = self.slots[index].write();
        match slot.as_ref() {
            Some(current) if Arc::ptr_eq(current, expected) => {},
            _ => return false,
        }
        let had_new = new.is_some();
        *slot = new;
        self.account(true, had_new);
        true
    }

    /// Empties every slot and returns the former occupants in slot order.
    pub fn take_all(&self) -> Vec<Arc<T>> {
        let mut taken = Vec::with_capacity(self.len());
        for index in 0..self.slots.len() {
            if let Some(tile) = self.unconditional_replace(index, None) {
                taken.push(tile);
            }
        }
        taken
    }

    /// Snapshot iterator over `(index, occupant)` pairs.
    ///
    /// Each slot is read independently; concurrent writers may be observed
    /// partway through.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Arc<T>)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.read().clone().map(|tile| (index, tile)))
    }

    fn account(&self, was_occupied: bool, now_occupied: bool) {
        match (was_occupied, now_occupied) {
            (false, true) => {
                self.occupied.fetch_add(1, Ordering::AcqRel);
            },
            (true, false) => {
                self.occupied.fetch_sub(1, Ordering::AcqRel);
            },
            _ => {},
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let occupied = self.slots.iter().filter(|slot| slot.read().is_some()).count();
        assert_eq!(self.len(), occupied);
        assert_eq!(self.capacity(), self.dim * self.dim);
        assert_eq!(self.dim, dim_for(self.radius));
    }
}
