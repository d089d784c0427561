//! OctreeBuilder - turns a fragment list into a populated node pool.
//!
//! # Algorithm
//!
//! Breadth-first, one pass per level, every fragment in parallel:
//!
//! 1. **Filter**: skip fragments outside the grid (counted in the report).
//! 2. **Interior levels** (`0 .. max_depth - 1`): each fragment claims the
//!    child block for its octant with [`NodePool::claim_child`] and descends.
//!    A level finishes for every fragment before the next starts.
//! 3. **Leaf level** (`max_depth - 1`): the fragment's payload slot is its
//!    parent block plus its octant. Colliding fragments resolve in three
//!    passes: record the largest list index per slot, read back the winners,
//!    link each winner's slot to its entry in the leaf color table. The
//!    highest list index always wins, independent of scheduling, and the
//!    table follows list order.
//!
//! A [`SvoError::PoolExhausted`] aborts the build and marks the pool
//! [`PoolState::Invalid`].

use rayon::prelude::*;
use web_time::Instant;

use crate::config::BuildConfig;
use crate::constants::ROOT;
use crate::error::{Result, SvoError};
use crate::fragments::FragmentList;
use crate::octree::octant_at;
use crate::pool::{NodePool, PoolState};
use crate::report::BuildReport;
use crate::types::{Color, Fragment};

/// A fragment on its way down the tree.
#[derive(Clone, Copy, Debug)]
struct Descent {
  /// Index in the fragment list, the tie-break key.
  index: u32,
  fragment: Fragment,
  /// Current block base; at the leaf level, the payload slot.
  node: u32,
}

/// Fails with [`SvoError::OutOfBounds`] when any coordinate is `>= 2^max_depth`.
pub fn check_bounds(fragment: &Fragment, max_depth: u32) -> Result<()> {
  if fragment.in_bounds(max_depth) {
    Ok(())
  } else {
    Err(SvoError::OutOfBounds {
      position: fragment.position,
      max_depth,
    })
  }
}

/// Builds octrees of one fixed depth.
#[derive(Clone, Debug)]
pub struct OctreeBuilder {
  config: BuildConfig,
}

impl OctreeBuilder {
  pub fn new(config: BuildConfig) -> Result<Self> {
    config.validate()?;
    Ok(Self { config })
  }

  pub fn config(&self) -> &BuildConfig {
    &self.config
  }

  /// Build into a freshly allocated pool.
  pub fn build_new(&self, fragments: &FragmentList) -> Result<(NodePool, BuildReport)> {
    let mut pool = NodePool::new(self.config.max_depth)?;
    let report = self.build(&mut pool, fragments)?;
    Ok((pool, report))
  }

  /// Reset `pool` and rebuild it from `fragments`.
  pub fn build(&self, pool: &mut NodePool, fragments: &FragmentList) -> Result<BuildReport> {
    let max_depth = self.config.max_depth;
    if pool.max_depth() != max_depth {
      return Err(SvoError::DepthMismatch {
        builder: max_depth,
        pool: pool.max_depth(),
      });
    }
    if fragments.len() >= u32::MAX as usize {
      return Err(SvoError::Capacity {
        reason: format!("{} fragments exceed the u32 index range", fragments.len()),
      });
    }

    let _span = tracing::info_span!("svo::build", max_depth, fragments = fragments.len()).entered();
    let start = Instant::now();

    pool.reset();
    pool.set_state(PoolState::Building);

    let mut report = BuildReport {
      fragments: fragments.len(),
      ..Default::default()
    };

    let mut live = Vec::with_capacity(fragments.len());
    for (index, fragment) in fragments.iter().enumerate() {
      if let Err(err) = check_bounds(&fragment, max_depth) {
        tracing::trace!(%err, index, "skipping fragment");
        report.out_of_bounds += 1;
        continue;
      }
      live.push(Descent {
        index: index as u32,
        fragment,
        node: ROOT,
      });
    }

    if let Err(err) = self.descend_interior(pool, &mut live) {
      pool.set_state(PoolState::Invalid);
      tracing::error!(%err, nodes = pool.nodes_allocated(), "octree build aborted");
      return Err(err);
    }

    let winners = self.resolve_leaves(pool, &mut live);
    self.write_leaves(pool, &winners);
    pool.set_payloads(winners.iter().map(|&(_, color)| color).collect());

    pool.set_state(PoolState::Valid);

    report.placed = live.len();
    report.leaves = winners.len();
    report.overwritten = report.placed - report.leaves;
    report.nodes_allocated = pool.nodes_allocated();
    report.elapsed_us = start.elapsed().as_micros() as u64;

    if !report.is_clean() {
      tracing::warn!(out_of_bounds = report.out_of_bounds, "fragments skipped during octree build");
    }
    tracing::info!(
      placed = report.placed,
      leaves = report.leaves,
      nodes = report.nodes_allocated,
      elapsed_us = report.elapsed_us,
      "octree build complete"
    );

    Ok(report)
  }

  /// Claim and descend through every interior level, one level at a time.
  fn descend_interior(&self, pool: &NodePool, live: &mut [Descent]) -> Result<()> {
    let max_depth = self.config.max_depth;

    for depth in 0..max_depth - 1 {
      let _span = tracing::debug_span!("svo::build_level", depth).entered();

      let step = |d: &mut Descent| -> Result<()> {
        let octant = octant_at(d.fragment.position, depth, max_depth);
        d.node = pool.claim_child(d.node, octant)?;
        Ok(())
      };

      if self.config.parallel {
        live.par_iter_mut().try_for_each(step)?;
      } else {
        live.iter_mut().try_for_each(step)?;
      }

      tracing::debug!(depth, live = live.len(), nodes = pool.nodes_allocated(), "level complete");
    }
    Ok(())
  }

  /// Point every descent at its payload slot and pick one winner per slot.
  fn resolve_leaves(&self, pool: &NodePool, live: &mut [Descent]) -> Vec<(u32, Color)> {
    let max_depth = self.config.max_depth;
    let leaf_depth = max_depth - 1;

    let record = |d: &mut Descent| {
      d.node += octant_at(d.fragment.position, leaf_depth, max_depth) as u32;
      pool.record_leaf(d.node, d.index);
    };
    let won = |d: &&Descent| pool.load_slot(d.node) == d.index + 1;

    if self.config.parallel {
      live.par_iter_mut().for_each(record);
      live.par_iter()
        .filter(won)
        .map(|d| (d.node, d.fragment.color))
        .collect()
    } else {
      live.iter_mut().for_each(record);
      live.iter().filter(won).map(|d| (d.node, d.fragment.color)).collect()
    }
  }

  /// Replace the recorded list indices with leaf color table references.
  fn write_leaves(&self, pool: &NodePool, winners: &[(u32, Color)]) {
    let write = |(payload, &(slot, _)): (usize, &(u32, Color))| pool.store_slot(slot, payload as u32 + 1);
    if self.config.parallel {
      winners.par_iter().enumerate().for_each(write);
    } else {
      winners.iter().enumerate().for_each(write);
    }
  }
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod builder_test;
