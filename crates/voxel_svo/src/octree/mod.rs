//! Octree geometry: octant addressing and axis-aligned boxes.
//!
//! Node positions are never stored in the pool. They are reconstructed from
//! the root box and the octant chosen at each depth.
//!
//! # Octant Convention
//!
//! ```text
//! bit 0: X half (0 = low, 1 = high)
//! bit 1: Y half
//! bit 2: Z half
//! ```
//!
//! Depth 0 examines the most significant bit of a `max_depth`-bit
//! coordinate, the deepest interior level the least significant.

pub mod bounds;
pub mod octant;

pub use bounds::DAabb3;
pub use octant::{child_min, octant_at, octant_offset, octant_path, OctantPath};
