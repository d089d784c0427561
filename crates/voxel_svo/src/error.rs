//! Error taxonomy for the octree core.

use glam::UVec3;

/// Errors raised by the fragment list, node pool, builder and tracer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SvoError {
  /// Zero or unsupported capacity at construction. Fatal.
  #[error("invalid capacity: {reason}")]
  Capacity { reason: String },

  /// Fragment list is full; the fragment was dropped.
  #[error("fragment list full ({capacity} fragments), fragment dropped")]
  Overflow { capacity: usize },

  /// Fragment coordinate outside `[0, 2^max_depth)`. The fragment is skipped.
  #[error("fragment at {position} outside grid of depth {max_depth}")]
  OutOfBounds { position: UVec3, max_depth: u32 },

  /// Node pool capacity exceeded during a build. Fatal for the build.
  #[error("node pool exhausted: need {requested} slots, capacity is {capacity}")]
  PoolExhausted { requested: u64, capacity: u32 },

  /// Malformed ray (zero-length or non-finite direction, inverted range).
  #[error("invalid ray: {reason}")]
  InvalidRay { reason: &'static str },

  /// Pool is not in a traceable state (never built, mid-build, or aborted).
  #[error("node pool is not valid for tracing")]
  PoolInvalid,

  /// Builder configured for a different depth than the target pool.
  #[error("builder depth {builder} does not match pool depth {pool}")]
  DepthMismatch { builder: u32, pool: u32 },
}

/// Result alias for octree operations.
pub type Result<T> = std::result::Result<T, SvoError>;
