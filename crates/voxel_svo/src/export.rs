//! Raw buffer views handed to the rendering collaborator.
//!
//! The core never talks to a graphics API. It exposes each container as a
//! contiguous byte slice plus a texel format and a binding point, so a
//! compute or render stage can upload or map it without an intermediate copy.

/// Texel format of an exported buffer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BufferFormat {
  /// One `u32` per element (node pool slots).
  R32Uint,
  /// Packed 10:10:10:2 unsigned integer (fragment positions).
  Rgb10A2Uint,
  /// Four normalized 8-bit channels (fragment colors).
  Rgba8Unorm,
}

impl BufferFormat {
  /// Bytes per element.
  #[inline]
  pub fn element_size(&self) -> usize {
    4
  }
}

/// Borrowed view of a buffer ready for binding.
#[derive(Clone, Copy, Debug)]
pub struct BufferBinding<'a> {
  /// Shader binding point.
  pub binding: u32,
  pub format: BufferFormat,
  pub bytes: &'a [u8],
}

impl<'a> BufferBinding<'a> {
  /// Number of elements in the view.
  #[inline]
  pub fn len(&self) -> usize {
    self.bytes.len() / self.format.element_size()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.bytes.is_empty()
  }
}
