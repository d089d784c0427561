//! Axis-aligned bounding box with double precision, plus the slab ray test.

use glam::{DVec3, UVec3};

/// Double-precision axis-aligned bounding box.
///
/// Both corners are inclusive: a point on a face is inside, and a ray that
/// only touches a face still intersects. Sibling octants therefore share
/// their common face, and seam rays never fall between them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DAabb3 {
	/// Minimum corner (inclusive).
	pub min: DVec3,
	/// Maximum corner (inclusive).
	pub max: DVec3,
}

impl DAabb3 {
	/// Cube of edge `size` voxels at integer corner `min`.
	#[inline]
	pub fn from_voxel_cube(min: UVec3, size: u32) -> Self {
		let min = min.as_dvec3();
		Self {
			min,
			max: min + DVec3::splat(size as f64),
		}
	}

	/// Slab test: the parametric interval `[t_enter, t_exit]` of the ray
	/// inside this box, clipped to `[t_min, t_max]`.
	///
	/// `inv_dir` is the component-wise reciprocal of the ray direction. An axis whose
	/// reciprocal is not finite (zero or subnormal component) is treated as
	/// parallel: the ray is inside that slab for all `t` when the origin lies
	/// within it (inclusive), and never otherwise.
	#[inline]
	pub fn ray_interval(
		&self,
		origin: DVec3,
		inv_dir: DVec3,
		t_min: f64,
		t_max: f64,
	) -> Option<(f64, f64)> {
		let mut t_enter = t_min;
		let mut t_exit = t_max;

		for axis in 0..3 {
			let o = origin[axis];
			let lo = self.min[axis];
			let hi = self.max[axis];

			if !inv_dir[axis].is_finite() {
				if o < lo || o > hi {
					return None;
				}
				continue;
			}

			let t0 = (lo - o) * inv_dir[axis];
			let t1 = (hi - o) * inv_dir[axis];
			let (near, far) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };

			t_enter = t_enter.max(near);
			t_exit = t_exit.min(far);
			if t_enter > t_exit {
				return None;
			}
		}

		Some((t_enter, t_exit))
	}
}
