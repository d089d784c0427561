//! Core value types: packed colors and voxel fragments.

use glam::UVec3;

use crate::constants::{POSITION_BITS, POSITION_MAX};

/// Packed RGBA8 color, `r | g << 8 | b << 16 | a << 24`.
///
/// Matches the byte order of an `Rgba8Unorm` texel on little-endian hosts.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color(pub u32);

impl Color {
  pub const RED: Self = Self::rgba(255, 0, 0, 255);
  pub const GREEN: Self = Self::rgba(0, 255, 0, 255);
  pub const BLUE: Self = Self::rgba(0, 0, 255, 255);
  pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
  /// Fully transparent black.
  pub const TRANSPARENT: Self = Self(0);

  /// Pack four 8-bit channels.
  #[inline]
  pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
    Self(r as u32 | (g as u32) << 8 | (b as u32) << 16 | (a as u32) << 24)
  }

  /// Opaque color from three channels.
  #[inline]
  pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
    Self::rgba(r, g, b, 255)
  }

  /// Unpack to `[r, g, b, a]`.
  #[inline]
  pub const fn to_array(self) -> [u8; 4] {
    self.0.to_le_bytes()
  }

  /// Raw packed value.
  #[inline]
  pub const fn packed(self) -> u32 {
    self.0
  }
}

impl From<[u8; 4]> for Color {
  fn from(c: [u8; 4]) -> Self {
    Self(u32::from_le_bytes(c))
  }
}

/// One voxel sample produced by voxelization.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Fragment {
  /// Leaf-resolution grid coordinate.
  pub position: UVec3,
  pub color: Color,
}

impl Fragment {
  pub fn new(position: UVec3, color: Color) -> Self {
    Self { position, color }
  }

  /// True when every coordinate lies in `[0, 2^max_depth)`.
  #[inline]
  pub fn in_bounds(&self, max_depth: u32) -> bool {
    let size = 1u32 << max_depth;
    self.position.x < size && self.position.y < size && self.position.z < size
  }
}

/// Pack a position into the 10:10:10:2 layout (`x | y << 10 | z << 20`).
///
/// Coordinates above [`POSITION_MAX`] saturate. A saturated coordinate is
/// still outside every supported grid, so bounds checks stay exact.
#[inline]
pub fn pack_position(p: UVec3) -> u32 {
  let x = p.x.min(POSITION_MAX);
  let y = p.y.min(POSITION_MAX);
  let z = p.z.min(POSITION_MAX);
  x | y << POSITION_BITS | z << (2 * POSITION_BITS)
}

/// Inverse of [`pack_position`].
#[inline]
pub fn unpack_position(packed: u32) -> UVec3 {
  UVec3::new(
    packed & POSITION_MAX,
    (packed >> POSITION_BITS) & POSITION_MAX,
    (packed >> (2 * POSITION_BITS)) & POSITION_MAX,
  )
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
