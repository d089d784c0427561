//! OctreeTracer - nearest-hit ray queries against a built pool.
//!
//! # Traversal
//!
//! Depth-first with an explicit stack of at most `max_depth` frames. The
//! children of a node are visited in the order `i ^ mask` for `i = 0..8`,
//! where `mask` flips the axes along which the ray travels towards negative
//! coordinates. A monotone ray can only cross from octant `a` into octant
//! `b` when `a ^ mask` is a bit subset of `b ^ mask`, so this order never
//! visits a farther sibling first and the first leaf hit is the nearest.
//!
//! Empty slots are skipped before any box test. Box tests are inclusive, so
//! a ray running exactly along a shared face reaches both siblings and the
//! one with the lower coordinate wins the tie.

use glam::UVec3;
use rayon::prelude::*;

use crate::constants::{grid_size, EMPTY, MAX_DEPTH, ROOT};
use crate::error::{Result, SvoError};
use crate::octree::{child_min, DAabb3};
use crate::pool::NodePool;
use crate::ray::Ray;
use crate::types::Color;

/// Outcome of one ray query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceResult {
  pub hit: bool,
  /// Pool slot referencing the hit leaf's payload.
  pub leaf_index: u32,
  /// Distance from the ray origin to the leaf's entry point.
  pub distance: f64,
  pub payload: Color,
  /// Grid coordinate of the hit leaf.
  pub voxel: UVec3,
}

impl TraceResult {
  pub const MISS: Self = Self {
    hit: false,
    leaf_index: 0,
    distance: f64::INFINITY,
    payload: Color::TRANSPARENT,
    voxel: UVec3::ZERO,
  };

  /// Payload of a hit, `None` for a miss.
  #[inline]
  pub fn color(&self) -> Option<Color> {
    self.hit.then_some(self.payload)
  }
}

#[derive(Clone, Copy, Default)]
struct Frame {
  node: u32,
  min: UVec3,
  /// Next child position in visiting order, 8 when exhausted.
  next: u8,
}

/// Read-only ray queries over one pool.
///
/// Borrowing the pool freezes its state, so the validity check happens once
/// at construction.
#[derive(Clone, Copy, Debug)]
pub struct OctreeTracer<'a> {
  pool: &'a NodePool,
}

impl<'a> OctreeTracer<'a> {
  /// Fails with [`SvoError::PoolInvalid`] unless the pool holds a complete build.
  pub fn new(pool: &'a NodePool) -> Result<Self> {
    if !pool.is_valid() {
      return Err(SvoError::PoolInvalid);
    }
    Ok(Self { pool })
  }

  pub fn pool(&self) -> &'a NodePool {
    self.pool
  }

  /// Nearest non-empty leaf along `ray`, or [`TraceResult::MISS`].
  pub fn trace(&self, ray: &Ray) -> TraceResult {
    let max_depth = self.pool.max_depth();
    let root = DAabb3::from_voxel_cube(UVec3::ZERO, grid_size(max_depth));
    if ray.interval(&root).is_none() {
      return TraceResult::MISS;
    }

    let mask = ray.octant_mask();
    let mut stack = [Frame::default(); MAX_DEPTH as usize];
    stack[0] = Frame {
      node: ROOT,
      min: UVec3::ZERO,
      next: 0,
    };
    let mut len = 1usize;

    while len > 0 {
      let depth = len as u32 - 1;
      let frame = &mut stack[len - 1];
      if frame.next == 8 {
        len -= 1;
        continue;
      }
      let octant = frame.next ^ mask;
      frame.next += 1;
      let (node, parent_min) = (frame.node, frame.min);

      let child = self.pool.read_child(node, octant);
      if child == EMPTY {
        continue;
      }

      let child_size = grid_size(max_depth) >> (depth + 1);
      let min = child_min(parent_min, child_size, octant);
      let Some((t_enter, _)) = ray.interval(&DAabb3::from_voxel_cube(min, child_size)) else {
        continue;
      };

      if depth + 1 == max_depth {
        let Some(payload) = self.pool.payload(child) else {
          continue;
        };
        return TraceResult {
          hit: true,
          leaf_index: node + octant as u32,
          distance: t_enter,
          payload,
          voxel: min,
        };
      }

      stack[len] = Frame {
        node: child,
        min,
        next: 0,
      };
      len += 1;
    }

    TraceResult::MISS
  }

  /// Trace a batch of rays in parallel. Results keep the input order.
  pub fn trace_many(&self, rays: &[Ray]) -> Vec<TraceResult> {
    let _span = tracing::debug_span!("svo::trace_many", rays = rays.len()).entered();
    rays.par_iter().map(|ray| self.trace(ray)).collect()
  }
}

/// One-shot query: validate `pool` and trace a single ray.
pub fn trace(pool: &NodePool, ray: &Ray) -> Result<TraceResult> {
  Ok(OctreeTracer::new(pool)?.trace(ray))
}

#[cfg(test)]
#[path = "tracer_test.rs"]
mod tracer_test;
