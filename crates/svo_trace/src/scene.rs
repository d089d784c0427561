//! Procedural fragment producers standing in for a voxelizer.
//!
//! Each scene emits surface voxels only, the way a rasterizing voxelizer
//! would. Interiors stay empty so the octree stays sparse.

use glam::{UVec3, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use voxel_svo::{grid_size, Color, Fragment};

use crate::config::{SceneConfig, SceneKind};

/// Fragments for `scene` on a grid of depth `max_depth`.
pub fn generate(scene: &SceneConfig, max_depth: u32) -> Vec<Fragment> {
	let size = grid_size(max_depth);
	match scene.kind {
		SceneKind::Sphere => sphere(size),
		SceneKind::Terrain => terrain(size, scene.seed),
		SceneKind::Cubes => cubes(size, scene.seed, scene.cube_count),
	}
}

// =============================================================================
// Sphere
// =============================================================================

/// Hollow sphere touching the grid faces, shaded by surface normal.
fn sphere(size: u32) -> Vec<Fragment> {
	let center = Vec3::splat(size as f32 * 0.5);
	let radius = (size as f32 * 0.5 - 1.0).max(0.5);
	let mut out = Vec::new();

	for z in 0..size {
		for y in 0..size {
			for x in 0..size {
				let offset = Vec3::new(x as f32, y as f32, z as f32) + 0.5 - center;
				if (offset.length() - radius).abs() < 0.87 {
					let normal = offset.normalize_or_zero();
					out.push(Fragment::new(UVec3::new(x, y, z), normal_color(normal)));
				}
			}
		}
	}
	out
}

fn normal_color(normal: Vec3) -> Color {
	let c = (normal * 0.5 + 0.5) * 255.0;
	Color::rgb(c.x as u8, c.y as u8, c.z as u8)
}

// =============================================================================
// Terrain
// =============================================================================

/// Lattice spacing of the height noise in voxels.
const TERRAIN_CELL: u32 = 16;

/// Value-noise heightfield. Each column emits its top voxel plus the side
/// voxels exposed by lower neighbours.
fn terrain(size: u32, seed: u64) -> Vec<Fragment> {
	let heights = heightfield(size, seed);
	let height = |x: i64, z: i64| -> u32 {
		if x < 0 || z < 0 || x >= size as i64 || z >= size as i64 {
			0
		} else {
			heights[(z as u32 * size + x as u32) as usize]
		}
	};

	let mut out = Vec::new();
	for z in 0..size {
		for x in 0..size {
			let (xi, zi) = (x as i64, z as i64);
			let top = height(xi, zi);
			let lowest = [(1, 0), (-1, 0), (0, 1), (0, -1)]
				.iter()
				.map(|(dx, dz)| height(xi + dx, zi + dz))
				.min()
				.unwrap_or(0)
				.min(top);
			for y in lowest..=top {
				out.push(Fragment::new(UVec3::new(x, y, z), terrain_color(y, top, size)));
			}
		}
	}
	out
}

fn heightfield(size: u32, seed: u64) -> Vec<u32> {
	let cells = size / TERRAIN_CELL + 2;
	let mut rng = StdRng::seed_from_u64(seed);
	let lattice: Vec<f32> = (0..cells * cells).map(|_| rng.random::<f32>()).collect();
	let sample = |cx: u32, cz: u32| lattice[(cz * cells + cx) as usize];

	let max_height = (size * 3 / 4).max(1) as f32;
	let base = size as f32 / 8.0;

	let mut out = Vec::with_capacity((size * size) as usize);
	for z in 0..size {
		for x in 0..size {
			let (cx, cz) = (x / TERRAIN_CELL, z / TERRAIN_CELL);
			let tx = smoothstep((x % TERRAIN_CELL) as f32 / TERRAIN_CELL as f32);
			let tz = smoothstep((z % TERRAIN_CELL) as f32 / TERRAIN_CELL as f32);
			let top = lerp(sample(cx, cz), sample(cx + 1, cz), tx);
			let bottom = lerp(sample(cx, cz + 1), sample(cx + 1, cz + 1), tx);
			let h = base + lerp(top, bottom, tz) * (max_height - base);
			out.push((h as u32).min(size - 1));
		}
	}
	out
}

fn terrain_color(y: u32, top: u32, size: u32) -> Color {
	let band = y as f32 / size as f32;
	if y < top {
		Color::rgb(110, 84, 60)
	} else if band > 0.6 {
		Color::rgb(235, 235, 240)
	} else if band > 0.4 {
		Color::rgb(128, 128, 120)
	} else {
		Color::rgb(72, 150, 64)
	}
}

#[inline]
fn smoothstep(t: f32) -> f32 {
	t * t * (3.0 - 2.0 * t)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
	a + (b - a) * t
}

// =============================================================================
// Cubes
// =============================================================================

/// `count` hollow boxes with random extents and colors. Boxes may overlap;
/// later boxes win shared voxels.
fn cubes(size: u32, seed: u64, count: u32) -> Vec<Fragment> {
	let mut rng = StdRng::seed_from_u64(seed);
	let max_edge = (size / 3).max(1);
	let mut out = Vec::new();

	for _ in 0..count {
		let edge = UVec3::new(
			rng.random_range(1..=max_edge),
			rng.random_range(1..=max_edge),
			rng.random_range(1..=max_edge),
		);
		let min = UVec3::new(
			rng.random_range(0..=size - edge.x),
			rng.random_range(0..=size - edge.y),
			rng.random_range(0..=size - edge.z),
		);
		let color = Color::rgb(
			rng.random_range(64..=255),
			rng.random_range(64..=255),
			rng.random_range(64..=255),
		);
		let max = min + edge - 1;

		for z in min.z..=max.z {
			for y in min.y..=max.y {
				for x in min.x..=max.x {
					let on_face = x == min.x || x == max.x || y == min.y || y == max.y || z == min.z || z == max.z;
					if on_face {
						out.push(Fragment::new(UVec3::new(x, y, z), color));
					}
				}
			}
		}
	}
	out
}
