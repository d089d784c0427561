//! BuildConfig - octree depth and build scheduling.

use crate::constants::{capacity, grid_size, MAX_DEPTH};
use crate::error::{Result, SvoError};

/// Configuration shared by the builder and the pools it fills.
///
/// `max_depth` fixes the grid resolution (`2^max_depth` voxels per axis) and
/// the pool capacity. It is immutable for a pool's lifetime; changing it
/// means building into a fresh pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildConfig {
  /// Number of subdivision levels below the root.
  pub max_depth: u32,
  /// Process each level with rayon. Sequential builds allocate in
  /// fragment list order, giving a reproducible slot layout.
  pub parallel: bool,
}

impl BuildConfig {
  pub fn new(max_depth: u32) -> Self {
    Self {
      max_depth,
      ..Default::default()
    }
  }

  /// Same configuration with sequential processing.
  pub fn sequential(self) -> Self {
    Self {
      parallel: false,
      ..self
    }
  }

  /// Reject depths the pool cannot address.
  pub fn validate(&self) -> Result<()> {
    if self.max_depth == 0 || self.max_depth > MAX_DEPTH {
      return Err(SvoError::Capacity {
        reason: format!("max_depth must be in 1..={}, got {}", MAX_DEPTH, self.max_depth),
      });
    }
    Ok(())
  }

  /// Voxels per axis.
  #[inline]
  pub fn resolution(&self) -> u32 {
    grid_size(self.max_depth)
  }

  /// Pool slots a build at this depth reserves.
  #[inline]
  pub fn pool_capacity(&self) -> Option<u64> {
    capacity(self.max_depth)
  }
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      max_depth: 6,
      parallel: true,
    }
  }
}
