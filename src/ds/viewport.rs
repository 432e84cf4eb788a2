//! Square viewport geometry and the toroidal slot index.
//!
//! A viewport is a `(center_x, center_z, radius)` square. Storage for it is a
//! `dim * dim` array where `dim = 2 * radius + 1`, and a coordinate maps to a
//! slot by wrapping each axis modulo `dim`.
//!
//! ## Architecture
//!
//! ```text
//!   radius = 2, dim = 5, center = (7, 0)
//!
//!   world x:   5   6   7   8   9        wrap(x, 5):  0   1   2   3   4
//!            ┌───┬───┬───┬───┬───┐                 ┌───┬───┬───┬───┬───┐
//!            │   │   │ C │   │   │                 │   │   │ C │   │   │
//!            └───┴───┴───┴───┴───┘                 └───┴───┴───┴───┴───┘
//!
//!   recenter to (8, 0): x = 10 enters, x = 5 leaves. Both wrap to column 0,
//!   so the entering chunk reuses the leaving chunk's slot and nothing moves.
//! ```
//!
//! ## Key Concepts
//!
//! - **Ring index**: `index_of(x, z) = wrap(z) * dim + wrap(x)`, a 2D torus.
//!   Any `dim`-wide band of coordinates maps onto distinct slots.
//! - **Range check**: done in `i64` so extreme `i32` centers cannot overflow.
//!
//! ## Example Usage
//!
//! ```
//! use chunkring::ds::Viewport;
//!
//! let view = Viewport::new(0, 0, 3);
//! assert_eq!(view.dim(), 7);
//! assert_eq!(view.slot_count(), 49);
//! assert!(view.in_range(-3, 3));
//! assert!(!view.in_range(4, 0));
//! assert_eq!(view.index_of(1, 2), view.index_of(1 + 7, 2 - 7));
//! ```

use crate::error::ConfigError;

/// Smallest radius a viewport may have.
pub const MIN_RADIUS: u32 = 2;

/// Side length of the square covered by `radius`.
#[inline]
pub fn dim_for(radius: u32) -> usize {
    2 * radius as usize + 1
}

/// Euclidean (always non-negative) modulo of `value` by `dim`.
#[inline]
pub fn wrap(value: i32, dim: usize) -> usize {
    i64::from(value).rem_euclid(dim as i64) as usize
}

/// Slot index of `(x, z)` in a `dim * dim` ring.
#[inline]
pub fn ring_index(x: i32, z: i32, dim: usize) -> usize {
    wrap(z, dim) * dim + wrap(x, dim)
}

/// Packs a center coordinate into one word so it can be published atomically.
#[inline]
pub(crate) fn pack_center(x: i32, z: i32) -> u64 {
    (u64::from(x as u32) << 32) | u64::from(z as u32)
}

#[inline]
pub(crate) fn unpack_center(packed: u64) -> (i32, i32) {
    ((packed >> 32) as u32 as i32, packed as u32 as i32)
}

/// A square region of interest around a center chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Viewport {
    center_x: i32,
    center_z: i32,
    radius: u32,
}

impl Viewport {
    /// Creates a viewport.
    ///
    /// # Panics
    ///
    /// Panics if `radius < MIN_RADIUS`.
    pub fn new(center_x: i32, center_z: i32, radius: u32) -> Self {
        assert!(
            radius >= MIN_RADIUS,
            "viewport radius must be >= {MIN_RADIUS}, got {radius}"
        );
        Self {
            center_x,
            center_z,
            radius,
        }
    }

    /// Fallible variant of [`Viewport::new`].
    ///
    /// ```
    /// use chunkring::ds::Viewport;
    ///
    /// assert!(Viewport::try_new(0, 0, 1).is_err());
    /// assert!(Viewport::try_new(0, 0, 2).is_ok());
    /// ```
    pub fn try_new(center_x: i32, center_z: i32, radius: u32) -> Result<Self, ConfigError> {
        if radius < MIN_RADIUS {
            return Err(ConfigError::new(format!(
                "radius must be >= {MIN_RADIUS}, got {radius}"
            )));
        }
        Ok(Self {
            center_x,
            center_z,
            radius,
        })
    }

    pub fn center(&self) -> (i32, i32) {
        (self.center_x, self.center_z)
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Side length, `2 * radius + 1`.
    pub fn dim(&self) -> usize {
        dim_for(self.radius)
    }

    /// Number of slots needed to back this viewport.
    pub fn slot_count(&self) -> usize {
        let dim = self.dim();
        dim * dim
    }

    /// Returns `true` if `(x, z)` lies within `radius` of the center on both axes.
    #[inline]
    pub fn in_range(&self, x: i32, z: i32) -> bool {
        let radius = i64::from(self.radius);
        (i64::from(x) - i64::from(self.center_x)).abs() <= radius
            && (i64::from(z) - i64::from(self.center_z)).abs() <= radius
    }

    /// Ring slot for `(x, z)`. Meaningful only for in-range coordinates.
    #[inline]
    pub fn index_of(&self, x: i32, z: i32) -> usize {
        ring_index(x, z, self.dim())
    }

    /// Same radius, different center.
    pub fn with_center(self, center_x: i32, center_z: i32) -> Self {
        Self {
            center_x,
            center_z,
            ..self
        }
    }

    /// Same center, different radius.
    ///
    /// # Panics
    ///
    /// Panics if `radius < MIN_RADIUS`.
    pub fn with_radius(self, radius: u32) -> Self {
        Self::new(self.center_x, self.center_z, radius)
    }

    /// Inclusive lower corner, saturated to the `i32` domain.
    pub fn min_corner(&self) -> (i32, i32) {
        let radius = i64::from(self.radius);
        (
            saturate(i64::from(self.center_x) - radius),
            saturate(i64::from(self.center_z) - radius),
        )
    }

    /// Inclusive upper corner, saturated to the `i32` domain.
    pub fn max_corner(&self) -> (i32, i32) {
        let radius = i64::from(self.radius);
        (
            saturate(i64::from(self.center_x) + radius),
            saturate(i64::from(self.center_z) + radius),
        )
    }
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dim_and_slot_count_follow_radius() {
        let view = Viewport::new(0, 0, 2);
        assert_eq!(view.dim(), 5);
        assert_eq!(view.slot_count(), 25);

        let view = Viewport::new(0, 0, 12);
        assert_eq!(view.dim(), 25);
        assert_eq!(view.slot_count(), 625);
    }

    #[test]
    fn wrap_is_non_negative() {
        assert_eq!(wrap(-1, 5), 4);
        assert_eq!(wrap(-5, 5), 0);
        assert_eq!(wrap(-6, 5), 4);
        assert_eq!(wrap(7, 5), 2);
        assert_eq!(wrap(i32::MIN, 5), (i64::from(i32::MIN).rem_euclid(5)) as usize);
    }

    #[test]
    fn in_range_is_inclusive_on_both_axes() {
        let view = Viewport::new(10, -4, 3);
        assert!(view.in_range(13, -1));
        assert!(view.in_range(7, -7));
        assert!(!view.in_range(14, -4));
        assert!(!view.in_range(10, -8));
    }

    #[test]
    fn in_range_does_not_overflow_at_extremes() {
        let view = Viewport::new(i32::MAX, i32::MIN, 2);
        assert!(view.in_range(i32::MAX - 2, i32::MIN + 2));
        assert!(!view.in_range(i32::MIN, i32::MAX));
        assert_eq!(view.max_corner(), (i32::MAX, i32::MIN + 2));
        assert_eq!(view.min_corner(), (i32::MAX - 2, i32::MIN));
    }

    #[test]
    fn center_packing_preserves_sign() {
        for &(x, z) in &[(0, 0), (-1, 1), (i32::MIN, i32::MAX), (123, -456)] {
            assert_eq!(unpack_center(pack_center(x, z)), (x, z));
        }
    }

    #[test]
    fn try_new_rejects_small_radius() {
        let err = Viewport::try_new(0, 0, 1).unwrap_err();
        assert!(err.to_string().contains("radius"));
    }

    #[test]
    #[should_panic(expected = "radius must be >= 2")]
    fn new_panics_on_small_radius() {
        let _ = Viewport::new(0, 0, 0);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: shifting either axis by `dim` lands on the same slot
            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_index_wraps_toroidally(
                radius in 2u32..40,
                x in -100_000i32..100_000,
                z in -100_000i32..100_000,
            ) {
                let view = Viewport::new(0, 0, radius);
                let dim = view.dim() as i32;
                let index = view.index_of(x, z);
                prop_assert!(index < view.slot_count());
                prop_assert_eq!(index, view.index_of(x + dim, z));
                prop_assert_eq!(index, view.index_of(x, z + dim));
                prop_assert_eq!(index, view.index_of(x - dim, z - dim));
            }

            /// Property: in_range matches the axis-distance definition
            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_in_range_matches_definition(
                cx in -1_000i32..1_000,
                cz in -1_000i32..1_000,
                radius in 2u32..20,
                x in -1_100i32..1_100,
                z in -1_100i32..1_100,
            ) {
                let view = Viewport::new(cx, cz, radius);
                let expected = (x - cx).abs() <= radius as i32 && (z - cz).abs() <= radius as i32;
                prop_assert_eq!(view.in_range(x, z), expected);
            }

            /// Property: all in-range coordinates occupy distinct slots
            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_in_range_coordinates_never_collide(
                cx in -10_000i32..10_000,
                cz in -10_000i32..10_000,
                radius in 2u32..12,
            ) {
                let view = Viewport::new(cx, cz, radius);
                let r = radius as i32;
                let mut seen = vec![false; view.slot_count()];
                for z in cz - r..=cz + r {
                    for x in cx - r..=cx + r {
                        let index = view.index_of(x, z);
                        prop_assert!(!seen[index]);
                        seen[index] = true;
                    }
                }
                prop_assert!(seen.iter().all(|&hit| hit));
            }
        }
    }
}
