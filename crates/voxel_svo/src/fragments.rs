//! FragmentList - fixed-capacity store of voxelization output.
//!
//! Backed by two parallel buffers mirroring the GPU layout: packed
//! 10:10:10:2 positions and RGBA8 colors. The list never grows past the
//! capacity it was created with; fragments beyond it are dropped and counted.

use crate::constants::{FRAGMENT_COLOR_BINDING, FRAGMENT_POSITION_BINDING};
use crate::error::{Result, SvoError};
use crate::export::{BufferBinding, BufferFormat};
use crate::types::{pack_position, unpack_position, Color, Fragment};

/// Unordered, write-once-per-build fragment store.
#[derive(Debug)]
pub struct FragmentList {
  positions: Vec<u32>,
  colors: Vec<Color>,
  capacity: usize,
  dropped: usize,
}

impl FragmentList {
  /// Allocate storage for up to `capacity` fragments.
  pub fn new(capacity: usize) -> Result<Self> {
    if capacity == 0 {
      return Err(SvoError::Capacity {
        reason: "fragment list capacity must be non-zero".into(),
      });
    }
    Ok(Self {
      positions: Vec::with_capacity(capacity),
      colors: Vec::with_capacity(capacity),
      capacity,
      dropped: 0,
    })
  }

  /// Append a fragment, or drop it and report [`SvoError::Overflow`] when full.
  pub fn append(&mut self, fragment: Fragment) -> Result<()> {
    if self.positions.len() >= self.capacity {
      self.dropped += 1;
      return Err(SvoError::Overflow {
        capacity: self.capacity,
      });
    }
    self.positions.push(pack_position(fragment.position));
    self.colors.push(fragment.color);
    Ok(())
  }

  /// Append every fragment that fits; returns how many were dropped.
  pub fn extend<I: IntoIterator<Item = Fragment>>(&mut self, fragments: I) -> usize {
    let before = self.dropped;
    for fragment in fragments {
      // Overflow is already counted in `dropped`.
      let _ = self.append(fragment);
    }
    self.dropped - before
  }

  /// Logically empty the list, keeping the backing storage.
  pub fn clear(&mut self) {
    self.positions.clear();
    self.colors.clear();
    self.dropped = 0;
  }

  pub fn len(&self) -> usize {
    self.positions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.positions.is_empty()
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Fragments rejected by [`append`](Self::append) since the last clear.
  pub fn dropped(&self) -> usize {
    self.dropped
  }

  /// Fragment at list index `index`.
  pub fn get(&self, index: usize) -> Option<Fragment> {
    let packed = *self.positions.get(index)?;
    Some(Fragment::new(unpack_position(packed), self.colors[index]))
  }

  /// Iterate fragments in list order.
  pub fn iter(&self) -> impl ExactSizeIterator<Item = Fragment> + '_ {
    self.positions
      .iter()
      .zip(&self.colors)
      .map(|(&p, &c)| Fragment::new(unpack_position(p), c))
  }

  /// Position and color buffers for the voxelization/build stages.
  pub fn bind(&self, position_binding: u32, color_binding: u32) -> (BufferBinding<'_>, BufferBinding<'_>) {
    (
      BufferBinding {
        binding: position_binding,
        format: BufferFormat::Rgb10A2Uint,
        bytes: bytemuck::cast_slice(&self.positions),
      },
      BufferBinding {
        binding: color_binding,
        format: BufferFormat::Rgba8Unorm,
        bytes: bytemuck::cast_slice(&self.colors),
      },
    )
  }

  /// [`bind`](Self::bind) at the default binding points.
  pub fn bind_default(&self) -> (BufferBinding<'_>, BufferBinding<'_>) {
    self.bind(FRAGMENT_POSITION_BINDING, FRAGMENT_COLOR_BINDING)
  }
}

#[cfg(test)]
#[path = "fragments_test.rs"]
mod fragments_test;
