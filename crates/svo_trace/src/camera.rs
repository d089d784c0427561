//! Pinhole camera producing one primary ray per pixel.

use anyhow::{Context, Result};
use glam::DVec3;
use voxel_svo::Ray;

use crate::config::CameraConfig;

#[derive(Debug, Clone, Copy)]
pub struct Camera {
	position: DVec3,
	forward: DVec3,
	right: DVec3,
	up: DVec3,
	/// Half-height of the image plane at distance 1.
	tan_half_fov: f64,
}

impl Camera {
	/// Camera from config; unset position/target frame a grid of `grid_size` voxels.
	pub fn from_config(config: &CameraConfig, grid_size: u32) -> Result<Self> {
		let size = grid_size as f64;
		let position = config
			.position
			.map(DVec3::from_array)
			.unwrap_or(DVec3::new(-0.6 * size, 1.3 * size, -0.9 * size));
		let target = config
			.target
			.map(DVec3::from_array)
			.unwrap_or(DVec3::splat(0.5 * size));
		Self::look_at(position, target, config.fov_degrees)
	}

	pub fn look_at(position: DVec3, target: DVec3, fov_degrees: f64) -> Result<Self> {
		let forward = (target - position)
			.try_normalize()
			.context("camera position and target coincide")?;
		let world_up = if forward.cross(DVec3::Y).length_squared() < 1e-12 {
			DVec3::Z
		} else {
			DVec3::Y
		};
		let right = forward.cross(world_up).normalize();
		let up = right.cross(forward);

		Ok(Self {
			position,
			forward,
			right,
			up,
			tan_half_fov: (fov_degrees.to_radians() * 0.5).tan(),
		})
	}

	/// Ray through the centre of pixel `(px, py)`, row 0 at the top.
	pub fn ray(&self, px: u32, py: u32, width: u32, height: u32) -> Result<Ray> {
		let aspect = width as f64 / height as f64;
		let ndc_x = ((px as f64 + 0.5) / width as f64) * 2.0 - 1.0;
		let ndc_y = 1.0 - ((py as f64 + 0.5) / height as f64) * 2.0;
		let direction = self.forward
			+ self.right * (ndc_x * aspect * self.tan_half_fov)
			+ self.up * (ndc_y * self.tan_half_fov);
		Ok(Ray::infinite(self.position, direction)?)
	}
}
