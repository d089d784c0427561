//! Statistics from a build.
//!
//! Per-fragment problems are reported as counts, never as lists, so the
//! report stays the same size whatever the fragment count.

/// Outcome counters of one [`OctreeBuilder::build`](crate::OctreeBuilder::build).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
  /// Fragments in the list at build time.
  pub fragments: usize,
  /// Fragments that descended to a leaf.
  pub placed: usize,
  /// Fragments skipped for a coordinate outside the grid.
  pub out_of_bounds: usize,
  /// Placed fragments whose leaf was taken by a later fragment in list order.
  pub overwritten: usize,
  /// Distinct non-empty leaves written.
  pub leaves: usize,
  /// Node blocks allocated, root excluded.
  pub nodes_allocated: u32,
  /// Wall time of the build in microseconds.
  pub elapsed_us: u64,
}

impl BuildReport {
  /// Fragments that never reached the tree.
  #[inline]
  pub fn skipped(&self) -> usize {
    self.out_of_bounds
  }

  /// True when every fragment was placed.
  #[inline]
  pub fn is_clean(&self) -> bool {
    self.skipped() == 0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_report_totals() {
    let report = BuildReport {
      fragments: 10,
      placed: 6,
      out_of_bounds: 4,
      overwritten: 2,
      leaves: 4,
      ..Default::default()
    };
    assert_eq!(report.skipped(), 4);
    assert!(!report.is_clean());
    assert_eq!(report.placed + report.skipped(), report.fragments);
    assert_eq!(report.leaves + report.overwritten, report.placed);
  }

  #[test]
  fn test_default_is_clean() {
    assert!(BuildReport::default().is_clean());
  }
}
