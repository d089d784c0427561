//! Configuration parsing for the trace harness.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use voxel_svo::{BuildConfig, MAX_DEPTH};

/// Root configuration. Every field has a default, so an empty file is valid.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Octree depth; the grid is `2^max_depth` voxels per axis.
	pub max_depth: u32,
	/// Fragment list capacity. Fragments past it are dropped.
	pub fragment_capacity: usize,
	pub scene: SceneConfig,
	pub camera: CameraConfig,
	pub image: ImageConfig,
	/// PNG written after tracing.
	pub output: PathBuf,
}

/// Procedural fragment source.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
	pub kind: SceneKind,
	/// Seed for the randomized scenes.
	pub seed: u64,
	/// Number of boxes in the `cubes` scene.
	pub cube_count: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
	/// Hollow sphere filling the grid.
	Sphere,
	/// Value-noise heightfield.
	Terrain,
	/// Randomly placed hollow boxes.
	Cubes,
}

/// Pinhole camera in voxel units. Unset positions are placed relative to the grid.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
	pub position: Option<[f64; 3]>,
	pub target: Option<[f64; 3]>,
	/// Vertical field of view.
	pub fov_degrees: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageConfig {
	pub width: u32,
	pub height: u32,
	/// Color of pixels whose ray misses [R, G, B].
	pub background: [u8; 3],
}

impl Default for Config {
	fn default() -> Self {
		Self {
			max_depth: 6,
			fragment_capacity: 1 << 20,
			scene: SceneConfig::default(),
			camera: CameraConfig::default(),
			image: ImageConfig::default(),
			output: PathBuf::from("svo_trace.png"),
		}
	}
}

impl Default for SceneConfig {
	fn default() -> Self {
		Self {
			kind: SceneKind::Sphere,
			seed: 1,
			cube_count: 12,
		}
	}
}

impl Default for CameraConfig {
	fn default() -> Self {
		Self {
			position: None,
			target: None,
			fov_degrees: 50.0,
		}
	}
}

impl Default for ImageConfig {
	fn default() -> Self {
		Self {
			width: 512,
			height: 512,
			background: [24, 24, 32],
		}
	}
}

/// Largest accepted image edge.
const MAX_IMAGE_EDGE: u32 = 16384;

impl Config {
	/// Load configuration from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {}", path.display()))?;
		Self::parse(&content)
	}

	/// Parse and validate TOML text.
	pub fn parse(content: &str) -> Result<Self> {
		let config: Config = toml::from_str(content).context("Failed to parse config TOML")?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<()> {
		self.build_config(true).validate().with_context(|| {
			format!("max_depth must be in 1..={}, got {}", MAX_DEPTH, self.max_depth)
		})?;
		if self.fragment_capacity == 0 {
			anyhow::bail!("fragment_capacity must be non-zero");
		}
		let ImageConfig { width, height, .. } = self.image;
		if width == 0 || height == 0 || width > MAX_IMAGE_EDGE || height > MAX_IMAGE_EDGE {
			anyhow::bail!(
				"image size must be within 1..={} per edge, got {}x{}",
				MAX_IMAGE_EDGE,
				width,
				height
			);
		}
		let fov = self.camera.fov_degrees;
		if !(fov > 0.0 && fov < 180.0) {
			anyhow::bail!("fov_degrees must be in (0, 180), got {}", fov);
		}
		if let (Some(position), Some(target)) = (self.camera.position, self.camera.target) {
			if position == target {
				anyhow::bail!("camera position and target coincide at {:?}", position);
			}
		}
		if self.scene.kind == SceneKind::Cubes && self.scene.cube_count == 0 {
			anyhow::bail!("cube_count must be non-zero for the cubes scene");
		}
		Ok(())
	}

	/// Octree build settings for this run.
	pub fn build_config(&self, parallel: bool) -> BuildConfig {
		BuildConfig {
			max_depth: self.max_depth,
			parallel,
		}
	}
}
