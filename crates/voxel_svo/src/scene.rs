//! SvoScene - publishes completed builds to concurrent tracers.
//!
//! A rebuild always fills a fresh pool. The published pool is swapped only
//! after the build succeeds, so tracers never observe a pool mid-build and a
//! failed build leaves the previous scene in place.
//!
//! Rebuilds run one at a time. A rebuild that arrives while another is in
//! progress waits for it, so publishes follow the order in which rebuilds
//! acquire the lock and a slow early build never replaces a later one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::builder::OctreeBuilder;
use crate::config::BuildConfig;
use crate::error::Result;
use crate::fragments::FragmentList;
use crate::pool::NodePool;
use crate::ray::Ray;
use crate::report::BuildReport;
use crate::tracer::{OctreeTracer, TraceResult};

pub struct SvoScene {
  builder: OctreeBuilder,
  /// Held for the whole of a rebuild, publish included.
  rebuild_lock: Mutex<()>,
  current: RwLock<Arc<NodePool>>,
  generation: AtomicU64,
}

impl SvoScene {
  /// Scene holding the empty octree for `config.max_depth`.
  pub fn new(config: BuildConfig) -> Result<Self> {
    let builder = OctreeBuilder::new(config)?;
    let pool = NodePool::new(config.max_depth)?;
    Ok(Self {
      builder,
      rebuild_lock: Mutex::new(()),
      current: RwLock::new(Arc::new(pool)),
      generation: AtomicU64::new(0),
    })
  }

  pub fn config(&self) -> &BuildConfig {
    self.builder.config()
  }

  /// Build `fragments` into a new pool and publish it.
  ///
  /// Blocks while another rebuild is running. On error the previously
  /// published pool stays current.
  pub fn rebuild(&self, fragments: &FragmentList) -> Result<BuildReport> {
    let _rebuild = self.rebuild_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let (pool, report) = match self.builder.build_new(fragments) {
      Ok(built) => built,
      Err(err) => {
        tracing::warn!(%err, "rebuild failed, keeping previous scene");
        return Err(err);
      }
    };

    let mut current = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *current = Arc::new(pool);
    let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
    tracing::debug!(generation, "scene published");
    Ok(report)
  }

  /// Number of successful rebuilds published so far.
  pub fn generation(&self) -> u64 {
    self.generation.load(Ordering::Acquire)
  }

  /// The currently published pool. Holding the snapshot keeps it alive
  /// across later rebuilds.
  pub fn snapshot(&self) -> Arc<NodePool> {
    let current = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    Arc::clone(&current)
  }

  /// Trace one ray against the current snapshot.
  pub fn trace(&self, ray: &Ray) -> Result<TraceResult> {
    let pool = self.snapshot();
    let tracer = OctreeTracer::new(&pool)?;
    Ok(tracer.trace(ray))
  }

  /// Trace a batch against one snapshot, so every ray sees the same scene.
  pub fn trace_many(&self, rays: &[Ray]) -> Result<Vec<TraceResult>> {
    let pool = self.snapshot();
    Ok(OctreeTracer::new(&pool)?.trace_many(rays))
  }
}

impl std::fmt::Debug for SvoScene {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SvoScene")
      .field("config", self.builder.config())
      .field("generation", &self.generation())
      .field("pool", &*self.snapshot())
      .finish()
  }
}
