//! Error types for the chunkring library.
//!
//! Stale coordinates, stale identities and vanished light-task targets are
//! normal under an asynchronous producer and are never reported as errors.
//! Only configuration mistakes and invariant checks produce values here.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache configuration is invalid (radius
//!   below [`MIN_RADIUS`](crate::ds::viewport::MIN_RADIUS)).
//! - [`InvariantError`]: Returned by
//!   [`ChunkCache::check_invariants`](crate::cache::ChunkCache::check_invariants)
//!   when storage bookkeeping disagrees with slot contents.
//!
//! ## Example Usage
//!
//! ```
//! use chunkring::builder::ChunkCacheBuilder;
//! use chunkring::error::ConfigError;
//! # use chunkring::traits::{NoopSink, Tile, TileSource};
//! # struct T((i32, i32));
//! # impl Tile for T { fn position(&self) -> (i32, i32) { self.0 } }
//! # struct Src;
//! # impl TileSource for Src {
//! #     type Tile = T;
//! #     type Payload = ();
//! #     fn build(&self, x: i32, z: i32, _: ()) -> T { T((x, z)) }
//! #     fn empty_tile(&self) -> T { T((0, 0)) }
//! # }
//!
//! let bad = ChunkCacheBuilder::new(1).try_build(Src, NoopSink);
//! let err: ConfigError = bad.err().unwrap();
//! assert!(err.to_string().contains("radius"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal storage invariants are violated.
///
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`ChunkCacheBuilder::try_build`](crate::builder::ChunkCacheBuilder::try_build),
/// [`ChunkCache::try_new`](crate::cache::ChunkCache::try_new) and
/// [`Viewport::try_new`](crate::ds::Viewport::try_new).
///
/// # Example
///
/// ```
/// use chunkring::ds::Viewport;
///
/// let err = Viewport::try_new(0, 0, 0).unwrap_err();
/// assert!(err.message().contains("radius"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
