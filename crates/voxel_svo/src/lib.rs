//! voxel_svo - Sparse voxel octree construction and ray tracing
//!
//! Converts an unordered list of voxel fragments into a sparse octree stored
//! in a flat, fixed-capacity pool of 32-bit slots, then answers nearest-hit
//! ray queries against it. Every container can be exported as a raw buffer
//! for a GPU compute or render stage.
//!
//! # Pipeline
//!
//! - **FragmentList**: bounded store of `(position, color)` samples from a
//!   voxelizer, laid out as packed 10:10:10:2 positions and RGBA8 colors
//! - **NodePool**: blocks of 8 child slots addressed by index, root at slot 0
//! - **OctreeBuilder**: level-by-level parallel build with lock-free child
//!   claiming and deterministic last-writer-wins leaves
//! - **OctreeTracer**: stack-based front-to-back traversal
//! - **SvoScene**: publishes completed builds to concurrent tracers
//!
//! # Example
//!
//! ```ignore
//! use glam::{DVec3, UVec3};
//! use voxel_svo::{BuildConfig, Color, Fragment, FragmentList, OctreeBuilder, OctreeTracer, Ray};
//!
//! let mut fragments = FragmentList::new(1024)?;
//! fragments.append(Fragment::new(UVec3::ZERO, Color::RED))?;
//!
//! let builder = OctreeBuilder::new(BuildConfig::new(2))?;
//! let (pool, report) = builder.build_new(&fragments)?;
//!
//! let ray = Ray::infinite(DVec3::new(-1.0, 0.5, 0.5), DVec3::X)?;
//! let hit = OctreeTracer::new(&pool)?.trace(&ray);
//! assert_eq!(hit.payload, Color::RED);
//! ```

pub mod constants;
pub mod error;
pub mod types;

pub use constants::{capacity, grid_size, EMPTY, MAX_DEPTH, NODE_SLOTS, RAY_EPSILON, ROOT};
pub use error::{Result, SvoError};
pub use types::{pack_position, unpack_position, Color, Fragment};

// Raw buffer views for the renderer
pub mod export;
pub use export::{BufferBinding, BufferFormat};

pub mod fragments;
pub use fragments::FragmentList;

// Octant addressing and box geometry
pub mod octree;

pub mod pool;
pub use pool::{NodePool, PoolState};

pub mod config;
pub mod report;
pub use config::BuildConfig;
pub use report::BuildReport;

pub mod builder;
pub use builder::{check_bounds, OctreeBuilder};

pub mod ray;
pub mod tracer;
pub use ray::Ray;
pub use tracer::{OctreeTracer, TraceResult};

// Build/trace isolation via snapshot swapping
pub mod scene;
pub use scene::SvoScene;

#[cfg(test)]
mod test_utils;
