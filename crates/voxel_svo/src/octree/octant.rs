//! Octant addressing from leaf coordinates.

use glam::UVec3;
use smallvec::SmallVec;

/// Octant sequence from the root down to a leaf.
pub type OctantPath = SmallVec<[u8; 16]>;

/// Octant of `position` at `depth` in a tree of `max_depth` levels.
///
/// Reads bit `max_depth - 1 - depth` of each coordinate:
/// - bit 0: X
/// - bit 1: Y
/// - bit 2: Z
#[inline]
pub fn octant_at(position: UVec3, depth: u32, max_depth: u32) -> u8 {
  debug_assert!(depth < max_depth, "depth {} has no octant below max_depth {}", depth, max_depth);
  let shift = max_depth - 1 - depth;
  let x = (position.x >> shift) & 1;
  let y = (position.y >> shift) & 1;
  let z = (position.z >> shift) & 1;
  (x | y << 1 | z << 2) as u8
}

/// Full root-to-leaf octant path of `position`.
pub fn octant_path(position: UVec3, max_depth: u32) -> OctantPath {
  (0..max_depth).map(|d| octant_at(position, d, max_depth)).collect()
}

/// Unit offset of an octant: each component is 0 or 1.
#[inline]
pub fn octant_offset(octant: u8) -> UVec3 {
  UVec3::new(
    (octant & 1) as u32,
    ((octant >> 1) & 1) as u32,
    ((octant >> 2) & 1) as u32,
  )
}

/// Minimum corner of a child box whose edge is `child_size`.
#[inline]
pub fn child_min(parent_min: UVec3, child_size: u32, octant: u8) -> UVec3 {
  parent_min + octant_offset(octant) * child_size
}
