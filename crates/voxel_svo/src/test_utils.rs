//! Test utilities: fragment fixtures and structural checks on built pools.

use std::collections::{HashMap, HashSet};

use glam::{UVec3, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::{grid_size, EMPTY, NODE_SLOTS, PENDING, ROOT};
use crate::fragments::FragmentList;
use crate::pool::NodePool;
use crate::types::{Color, Fragment};

// =============================================================================
// Fragment fixtures
// =============================================================================

pub fn frag(x: u32, y: u32, z: u32, color: Color) -> Fragment {
  Fragment::new(UVec3::new(x, y, z), color)
}

/// Fragment list sized exactly for `fragments`.
pub fn list_of(fragments: &[Fragment]) -> FragmentList {
  let mut list = FragmentList::new(fragments.len().max(1)).unwrap();
  assert_eq!(list.extend(fragments.iter().copied()), 0);
  list
}

/// Surface voxels of a sphere centred in the grid, colored by octant.
pub fn sphere_shell(max_depth: u32) -> Vec<Fragment> {
  let size = grid_size(max_depth);
  let center = Vec3::splat(size as f32 * 0.5);
  let radius = size as f32 * 0.5 - 1.0;
  let mut out = Vec::new();
  for z in 0..size {
    for y in 0..size {
      for x in 0..size {
        let p = Vec3::new(x as f32, y as f32, z as f32) + 0.5;
        if ((p - center).length() - radius).abs() < 0.87 {
          let shade = ((x * 7 + y * 13 + z * 29) % 200) as u8 + 40;
          out.push(frag(x, y, z, Color::rgb(shade, 255 - shade, 128)));
        }
      }
    }
  }
  out
}

/// Every voxel of an `edge`-wide cube at the grid origin.
pub fn filled_cube(edge: u32, color: Color) -> Vec<Fragment> {
  let mut out = Vec::with_capacity((edge * edge * edge) as usize);
  for z in 0..edge {
    for y in 0..edge {
      for x in 0..edge {
        out.push(frag(x, y, z, color));
      }
    }
  }
  out
}

/// `count` random in-grid fragments; duplicates positions on purpose.
pub fn random_fragments(max_depth: u32, count: usize, seed: u64) -> Vec<Fragment> {
  let size = grid_size(max_depth);
  let mut rng = StdRng::seed_from_u64(seed);
  (0..count)
    .map(|_| {
      let p = UVec3::new(
        rng.random_range(0..size),
        rng.random_range(0..size),
        rng.random_range(0..size),
      );
      Fragment::new(p, Color(rng.random()))
    })
    .collect()
}

/// Expected payload per leaf: the last fragment in list order wins.
pub fn expected_leaves(fragments: &[Fragment], max_depth: u32) -> HashMap<UVec3, Color> {
  let mut out = HashMap::new();
  for f in fragments {
    if f.in_bounds(max_depth) {
      out.insert(f.position, f.color);
    }
  }
  out
}

// =============================================================================
// Structural checks
// =============================================================================

/// Shape of a built pool, gathered by walking it from the root.
#[derive(Debug, PartialEq, Eq)]
pub struct Structure {
  /// Reachable non-root blocks.
  pub blocks: u32,
  /// Non-empty payload slots.
  pub leaves: usize,
}

/// Walk every reachable block and assert the pool is a proper tree:
/// every block referenced exactly once, all inside the used range, no
/// PENDING left behind, and no allocated block unreachable.
pub fn check_structure(pool: &NodePool) -> Structure {
  let used = pool.slots_used();
  let mut seen = HashSet::new();
  let mut leaves = 0;
  let mut stack = vec![(ROOT, 0u32)];

  while let Some((node, depth)) = stack.pop() {
    for octant in 0..8u8 {
      let child = pool.read_child(node, octant);
      assert_ne!(child, PENDING, "PENDING left in slot {}", node + octant as u32);
      if child == EMPTY {
        continue;
      }
      if depth + 1 == pool.max_depth() {
        leaves += 1;
        continue;
      }
      assert_eq!(child % NODE_SLOTS, 0, "Block base {} misaligned", child);
      assert!(child >= NODE_SLOTS && child < used, "Block {} outside used range", child);
      assert!(seen.insert(child), "Block {} referenced twice", child);
      stack.push((child, depth + 1));
    }
  }

  assert_eq!(seen.len() as u32, pool.nodes_allocated(), "Orphaned blocks in pool");
  Structure {
    blocks: seen.len() as u32,
    leaves,
  }
}

/// Distinct interior nodes the fragments imply, root excluded.
pub fn distinct_interior_nodes(fragments: &[Fragment], max_depth: u32) -> u32 {
  let mut nodes = HashSet::new();
  for f in fragments.iter().filter(|f| f.in_bounds(max_depth)) {
    for depth in 1..max_depth {
      let shift = max_depth - depth;
      nodes.insert((depth, f.position >> shift));
    }
  }
  nodes.len() as u32
}
