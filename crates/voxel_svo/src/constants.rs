//! Slot encoding and sizing constants shared by the pool, builder and tracer.
//!
//! # Slot encoding
//!
//! Every pool slot is one `u32`. Interior slots hold either [`EMPTY`] or the
//! base index of a child block; slots owned by the deepest interior level
//! hold a reference into the pool's leaf color table instead.
//!
//! ```text
//! 0            EMPTY (root block lives at 0, so 0 is never a child base)
//! 8..capacity  child block base (interior depths)
//! u32::MAX     PENDING claim marker (build only, never published)
//! 1..=leaves   leaf color table index + 1 (leaf slots)
//! ```
//!
//! Every color, `0` included, is therefore a storable payload.

/// Child slots per node block (one per octant).
pub const NODE_SLOTS: u32 = 8;

/// Base slot of the implicit root block.
pub const ROOT: u32 = 0;

/// "No child" / "no payload" sentinel.
pub const EMPTY: u32 = 0;

/// Transient marker written by the claim winner while it allocates.
pub const PENDING: u32 = u32::MAX;

/// Deepest supported octree. `capacity(9)` is the largest that fits `u32` slot indices.
pub const MAX_DEPTH: u32 = 9;

/// Bits per axis in a packed fragment position (10:10:10:2 layout).
pub const POSITION_BITS: u32 = 10;

/// Largest coordinate representable in a packed position.
pub const POSITION_MAX: u32 = (1 << POSITION_BITS) - 1;

/// Lower clamp applied to every ray's `t_min` to avoid self-intersection.
pub const RAY_EPSILON: f64 = 1e-6;

/// Default shader binding point for the node pool buffer.
pub const NODE_POOL_BINDING: u32 = 0;

/// Default shader binding point for packed fragment positions.
pub const FRAGMENT_POSITION_BINDING: u32 = 1;

/// Default shader binding point for fragment colors.
pub const FRAGMENT_COLOR_BINDING: u32 = 2;

/// Default shader binding point for the leaf color table.
pub const LEAF_PAYLOAD_BINDING: u32 = 3;

/// Pool capacity in slots for a tree of depth `max_depth`.
///
/// `capacity(L) = 8 * Σ_{l=1}^{L} 8^l`. Depth 0 (the root) is implicit and
/// its block is covered by the factor-8 oversizing.
///
/// Returns `None` for depth 0 or when the sum overflows `u64`.
pub const fn capacity(max_depth: u32) -> Option<u64> {
  if max_depth == 0 {
    return None;
  }
  let mut total: u64 = 0;
  let mut level = max_depth;
  while level != 0 {
    let nodes = match 8u64.checked_pow(level) {
      Some(n) => n,
      None => return None,
    };
    total = match total.checked_add(nodes * NODE_SLOTS as u64) {
      Some(t) => t,
      None => return None,
    };
    level -= 1;
  }
  Some(total)
}

/// Edge length of the voxel grid at `max_depth` (`2^max_depth`).
#[inline]
pub const fn grid_size(max_depth: u32) -> u32 {
  1 << max_depth
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
