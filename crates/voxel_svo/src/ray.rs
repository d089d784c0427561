//! Rays in voxel space.

use glam::DVec3;

use crate::constants::RAY_EPSILON;
use crate::error::{Result, SvoError};
use crate::octree::DAabb3;

/// A validated ray with a unit direction, so `t` is Euclidean distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
  origin: DVec3,
  direction: DVec3,
  inv_direction: DVec3,
  t_min: f64,
  t_max: f64,
}

impl Ray {
  /// Build a ray over the parametric range `[t_min, t_max]`.
  ///
  /// `t_min` is raised to at least [`RAY_EPSILON`]. `t_max` may be infinite.
  /// Direction components whose reciprocal overflows become `0.0`.
  pub fn new(origin: DVec3, direction: DVec3, t_min: f64, t_max: f64) -> Result<Self> {
    if !origin.is_finite() {
      return Err(SvoError::InvalidRay {
        reason: "origin is not finite",
      });
    }
    if !direction.is_finite() {
      return Err(SvoError::InvalidRay {
        reason: "direction is not finite",
      });
    }
    let length = direction.length();
    if length == 0.0 || !length.is_finite() {
      return Err(SvoError::InvalidRay {
        reason: "direction has zero length",
      });
    }
    if t_min.is_nan() || t_max.is_nan() || t_min > t_max {
      return Err(SvoError::InvalidRay {
        reason: "t_min must not exceed t_max",
      });
    }

    // Components too small to invert are parallel to their axis.
    let flush = |c: f64| if c.recip().is_finite() { c } else { 0.0 };
    let unit = direction / length;
    let direction = DVec3::new(flush(unit.x), flush(unit.y), flush(unit.z));
    Ok(Self {
      origin,
      direction,
      inv_direction: direction.recip(),
      t_min: t_min.max(RAY_EPSILON),
      t_max,
    })
  }

  /// Unbounded ray from `origin` along `direction`.
  pub fn infinite(origin: DVec3, direction: DVec3) -> Result<Self> {
    Self::new(origin, direction, 0.0, f64::INFINITY)
  }

  /// Ray from `origin` through `target`.
  pub fn towards(origin: DVec3, target: DVec3) -> Result<Self> {
    Self::infinite(origin, target - origin)
  }

  #[inline]
  pub fn origin(&self) -> DVec3 {
    self.origin
  }

  /// Unit direction.
  #[inline]
  pub fn direction(&self) -> DVec3 {
    self.direction
  }

  #[inline]
  pub fn t_min(&self) -> f64 {
    self.t_min
  }

  #[inline]
  pub fn t_max(&self) -> f64 {
    self.t_max
  }

  /// Point at distance `t`.
  #[inline]
  pub fn at(&self, t: f64) -> DVec3 {
    self.origin + self.direction * t
  }

  /// Octant flip mask: bit k is set when direction component k is negative.
  /// Zero components count as positive.
  #[inline]
  pub fn octant_mask(&self) -> u8 {
    (self.direction.x < 0.0) as u8 | ((self.direction.y < 0.0) as u8) << 1 | ((self.direction.z < 0.0) as u8) << 2
  }

  /// Parametric interval of this ray inside `aabb`, within `[t_min, t_max]`.
  #[inline]
  pub fn interval(&self, aabb: &DAabb3) -> Option<(f64, f64)> {
    aabb.ray_interval(self.origin, self.inv_direction, self.t_min, self.t_max)
  }
}
