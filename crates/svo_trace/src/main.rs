//! Sparse voxel octree trace harness.
//!
//! Produces fragments from a procedural scene, builds the octree and traces
//! one primary ray per pixel. The PNG holds the raw leaf payload of each hit,
//! with no lighting, so it shows exactly what the octree stores.

mod camera;
mod config;
mod scene;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use std::path::PathBuf;
use voxel_svo::{grid_size, FragmentList, Ray, SvoScene};

use camera::Camera;
use config::Config;

/// Builds a sparse voxel octree and traces it into a PNG.
#[derive(Parser, Debug)]
#[command(name = "svo_trace")]
#[command(about = "Builds a sparse voxel octree from a procedural scene and traces it")]
struct Args {
	/// Path to configuration TOML file (defaults apply when omitted).
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Output PNG, overriding the config.
	#[arg(short, long)]
	output: Option<PathBuf>,

	/// Build on one thread for a reproducible pool layout.
	#[arg(long)]
	sequential: bool,
}

fn main() -> Result<()> {
	env_logger::Builder::new()
		.target(env_logger::Target::Stdout)
		.filter_level(log::LevelFilter::Info)
		.parse_env("RUST_LOG")
		.init();

	let args = Args::parse();

	let config = match &args.config {
		Some(path) => {
			log::info!("Loading config from: {}", path.display());
			Config::load(path)?
		}
		None => Config::default(),
	};
	let output = args.output.clone().unwrap_or_else(|| config.output.clone());

	// Fragments
	let fragments = scene::generate(&config.scene, config.max_depth);
	let mut list = FragmentList::new(config.fragment_capacity).context("Creating fragment list")?;
	let dropped = list.extend(fragments);
	if dropped > 0 {
		log::warn!(
			"Fragment list full: dropped {} of {} fragments (capacity {})",
			dropped,
			dropped + list.len(),
			list.capacity()
		);
	}
	log::info!(
		"Scene {:?}: {} fragments on a {}^3 grid",
		config.scene.kind,
		list.len(),
		grid_size(config.max_depth)
	);

	// Build
	let scene = SvoScene::new(config.build_config(!args.sequential)).context("Creating octree")?;
	let report = scene.rebuild(&list).context("Building octree")?;
	log::info!(
		"Built {} leaves in {} nodes ({} slots used) in {:.2} ms",
		report.leaves,
		report.nodes_allocated,
		scene.snapshot().slots_used(),
		report.elapsed_us as f64 / 1000.0
	);

	// Trace
	let camera = Camera::from_config(&config.camera, grid_size(config.max_depth))?;
	let (width, height) = (config.image.width, config.image.height);
	let rays = (0..width * height)
		.into_par_iter()
		.map(|i| camera.ray(i % width, i / width, width, height))
		.collect::<Result<Vec<Ray>>>()?;
	let results = scene.trace_many(&rays).context("Tracing image")?;

	let background = config.image.background;
	let mut pixels = Vec::with_capacity(results.len() * 4);
	let mut hits = 0usize;
	for result in &results {
		match result.color() {
			Some(color) => {
				hits += 1;
				let [r, g, b, _] = color.to_array();
				pixels.extend_from_slice(&[r, g, b, 255]);
			}
			None => pixels.extend_from_slice(&[background[0], background[1], background[2], 255]),
		}
	}
	log::info!("Traced {} rays, {} hits", results.len(), hits);

	let image = image::RgbaImage::from_raw(width, height, pixels).context("Assembling image buffer")?;
	if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
		std::fs::create_dir_all(dir).with_context(|| format!("Failed to create output dir: {}", dir.display()))?;
	}
	image
		.save(&output)
		.with_context(|| format!("Failed to write: {}", output.display()))?;

	println!("Wrote {}", output.display());
	Ok(())
}
