//! NodePool - flat, fixed-capacity octree storage addressed by slot index.
//!
//! Each interior node is a block of 8 consecutive `u32` slots, one per
//! octant. The root block is pre-existing at slot 0 and the allocation
//! cursor starts right after it. Blocks are never reused within a build.
//!
//! All slot access goes through atomics so that the builder can claim and
//! link children from many threads at once while tracers only read.
//!
//! Leaf colors live in a separate table written once at the end of a build.
//! A leaf slot holds its table index plus one, so it never reads as EMPTY.

use std::sync::atomic::{AtomicU32, Ordering};

use glam::UVec3;

use crate::constants::{
  capacity, EMPTY, LEAF_PAYLOAD_BINDING, MAX_DEPTH, NODE_POOL_BINDING, NODE_SLOTS, PENDING, ROOT,
};
use crate::error::{Result, SvoError};
use crate::export::{BufferBinding, BufferFormat};
use crate::octree::octant_path;
use crate::types::Color;

/// Lifecycle of a pool's contents.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PoolState {
  /// A build is populating the pool. Not traceable.
  Building,
  /// Contents describe a complete octree (possibly the empty scene).
  Valid,
  /// A build aborted. Contents are undefined until the next full build.
  Invalid,
}

/// Fixed-capacity slot array plus the atomic allocation cursor.
pub struct NodePool {
  slots: Box<[AtomicU32]>,
  cursor: AtomicU32,
  /// Leaf colors, referenced from leaf slots as `index + 1`.
  payloads: Vec<Color>,
  max_depth: u32,
  state: PoolState,
}

impl NodePool {
  /// Allocate `capacity(max_depth)` slots with an all-empty root.
  pub fn new(max_depth: u32) -> Result<Self> {
    if max_depth == 0 || max_depth > MAX_DEPTH {
      return Err(SvoError::Capacity {
        reason: format!("max_depth must be in 1..={}, got {}", MAX_DEPTH, max_depth),
      });
    }
    let slot_count = capacity(max_depth).ok_or_else(|| SvoError::Capacity {
      reason: format!("capacity overflow at depth {}", max_depth),
    })?;
    Self::allocate(max_depth, slot_count)
  }

  /// Pool of depth `max_depth` holding only `slot_count` slots.
  #[cfg(test)]
  pub(crate) fn with_slot_count(max_depth: u32, slot_count: u64) -> Result<Self> {
    assert!(slot_count >= NODE_SLOTS as u64, "Pool must fit the root block");
    Self::allocate(max_depth, slot_count)
  }

  fn allocate(max_depth: u32, slot_count: u64) -> Result<Self> {
    let len = usize::try_from(slot_count).map_err(|_| SvoError::Capacity {
      reason: format!("{} slots exceed the address space", slot_count),
    })?;

    let mut slots = Vec::new();
    slots.try_reserve_exact(len).map_err(|err| SvoError::Capacity {
      reason: format!("cannot allocate {} slots: {}", slot_count, err),
    })?;
    slots.extend((0..len).map(|_| AtomicU32::new(EMPTY)));

    Ok(Self {
      slots: slots.into_boxed_slice(),
      cursor: AtomicU32::new(ROOT + NODE_SLOTS),
      payloads: Vec::new(),
      max_depth,
      state: PoolState::Valid,
    })
  }

  #[inline]
  pub fn max_depth(&self) -> u32 {
    self.max_depth
  }

  /// Total slots.
  #[inline]
  pub fn capacity(&self) -> u32 {
    self.slots.len() as u32
  }

  /// Slots handed out so far, root block included.
  #[inline]
  pub fn slots_used(&self) -> u32 {
    self.cursor.load(Ordering::Acquire)
  }

  /// Blocks allocated by builds, root excluded.
  #[inline]
  pub fn nodes_allocated(&self) -> u32 {
    (self.slots_used() - NODE_SLOTS) / NODE_SLOTS
  }

  #[inline]
  pub fn state(&self) -> PoolState {
    self.state
  }

  #[inline]
  pub fn is_valid(&self) -> bool {
    self.state == PoolState::Valid
  }

  pub(crate) fn set_state(&mut self, state: PoolState) {
    self.state = state;
  }

  /// Empty every used slot and rewind the cursor. The pool becomes the
  /// valid empty scene.
  pub fn reset(&mut self) {
    let used = *self.cursor.get_mut() as usize;
    for slot in &mut self.slots[..used] {
      *slot.get_mut() = EMPTY;
    }
    *self.cursor.get_mut() = ROOT + NODE_SLOTS;
    self.payloads.clear();
    self.state = PoolState::Valid;
  }

  /// Reserve `count` consecutive slots. The cursor never moves past capacity.
  fn reserve(&self, count: u32) -> Result<u32> {
    let capacity = self.capacity();
    self.cursor
      .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cursor| {
        cursor.checked_add(count).filter(|&end| end <= capacity)
      })
      .map_err(|cursor| SvoError::PoolExhausted {
        requested: cursor as u64 + count as u64,
        capacity,
      })
  }

  /// Atomically reserve the next 8-slot block with all children empty.
  pub fn allocate_node(&self) -> Result<u32> {
    let base = self.reserve(NODE_SLOTS)?;
    for slot in &self.slots[base as usize..(base + NODE_SLOTS) as usize] {
      slot.store(EMPTY, Ordering::Relaxed);
    }
    Ok(base)
  }

  #[inline]
  fn slot(&self, node: u32, octant: u8) -> &AtomicU32 {
    debug_assert!(octant < 8, "octant {} out of range", octant);
    &self.slots[(node + octant as u32) as usize]
  }

  /// Child value of `node` at `octant`: EMPTY, a block base, or a leaf reference.
  #[inline]
  pub fn read_child(&self, node: u32, octant: u8) -> u32 {
    self.slot(node, octant).load(Ordering::Acquire)
  }

  #[inline]
  pub fn write_child(&self, node: u32, octant: u8, value: u32) {
    self.slot(node, octant).store(value, Ordering::Release);
  }

  /// Return the child block of `node` at `octant`, allocating it if empty.
  ///
  /// Claim protocol: CAS `EMPTY -> PENDING`, allocate, publish the index.
  /// Exactly one caller allocates per (node, octant); every concurrent
  /// caller returns the same index. If the winner's allocation fails the
  /// slot goes back to EMPTY and the waiting callers retry, hitting the
  /// same exhaustion.
  pub fn claim_child(&self, node: u32, octant: u8) -> Result<u32> {
    let slot = self.slot(node, octant);
    loop {
      match slot.compare_exchange(EMPTY, PENDING, Ordering::AcqRel, Ordering::Acquire) {
        Ok(_) => {
          return match self.allocate_node() {
            Ok(child) => {
              slot.store(child, Ordering::Release);
              Ok(child)
            }
            Err(err) => {
              slot.store(EMPTY, Ordering::Release);
              Err(err)
            }
          };
        }
        Err(PENDING) => std::hint::spin_loop(),
        Err(child) => return Ok(child),
      }
    }
  }

  /// Record `fragment_index` as a writer of payload slot `slot`, keeping the
  /// largest index seen (stored as `index + 1` so that EMPTY stays 0).
  #[inline]
  pub(crate) fn record_leaf(&self, slot: u32, fragment_index: u32) {
    self.slots[slot as usize].fetch_max(fragment_index + 1, Ordering::AcqRel);
  }

  #[inline]
  pub(crate) fn load_slot(&self, slot: u32) -> u32 {
    self.slots[slot as usize].load(Ordering::Acquire)
  }

  #[inline]
  pub(crate) fn store_slot(&self, slot: u32, value: u32) {
    self.slots[slot as usize].store(value, Ordering::Release);
  }

  /// Payload slot of the leaf containing `position`, if its parent exists.
  pub fn leaf_slot(&self, position: UVec3) -> Option<u32> {
    let size = 1u32 << self.max_depth;
    if position.x >= size || position.y >= size || position.z >= size {
      return None;
    }
    self.leaf_slot_for_path(&octant_path(position, self.max_depth))
  }

  /// Payload slot reached by following `path` (one octant per depth).
  ///
  /// Returns `None` when the path length differs from `max_depth` or an
  /// interior child on the way is empty.
  pub fn leaf_slot_for_path(&self, path: &[u8]) -> Option<u32> {
    let (&leaf_octant, interior) = path.split_last()?;
    if path.len() != self.max_depth as usize {
      return None;
    }
    let mut node = ROOT;
    for &octant in interior {
      let child = self.read_child(node, octant);
      if child == EMPTY || child == PENDING {
        return None;
      }
      node = child;
    }
    Some(node + leaf_octant as u32)
  }

  /// Leaf payload at `position`, `None` for empty space.
  pub fn leaf_payload(&self, position: UVec3) -> Option<Color> {
    let slot = self.leaf_slot(position)?;
    self.payload(self.load_slot(slot))
  }

  /// Resolve a leaf slot value to its color. `None` for EMPTY.
  #[inline]
  pub fn payload(&self, leaf: u32) -> Option<Color> {
    let index = leaf.checked_sub(1)?;
    self.payloads.get(index as usize).copied()
  }

  /// Leaf color table in reference order.
  #[inline]
  pub fn payloads(&self) -> &[Color] {
    &self.payloads
  }

  pub(crate) fn set_payloads(&mut self, payloads: Vec<Color>) {
    self.payloads = payloads;
  }

  /// Copy of every slot.
  pub fn to_vec(&self) -> Vec<u32> {
    self.slots.iter().map(|s| s.load(Ordering::Acquire)).collect()
  }

  /// Raw slot array as an `R32Uint` buffer at `binding`.
  ///
  /// Takes `&mut self` so no atomic access can overlap the borrow.
  pub fn bind(&mut self, binding: u32) -> BufferBinding<'_> {
    let len = self.slots.len();
    // SAFETY: AtomicU32 has the same size and alignment as u32, and the
    // exclusive borrow rules out concurrent atomic access for the
    // lifetime of the returned slice.
    let words: &[u32] = unsafe { std::slice::from_raw_parts(self.slots.as_ptr().cast::<u32>(), len) };
    BufferBinding {
      binding,
      format: BufferFormat::R32Uint,
      bytes: bytemuck::cast_slice(words),
    }
  }

  /// [`bind`](Self::bind) at the default binding point.
  pub fn bind_default(&mut self) -> BufferBinding<'_> {
    self.bind(NODE_POOL_BINDING)
  }

  /// Leaf color table as an `Rgba8Unorm` buffer. A shader resolves leaf
  /// slot value `v` to element `v - 1`.
  pub fn bind_payloads(&self, binding: u32) -> BufferBinding<'_> {
    BufferBinding {
      binding,
      format: BufferFormat::Rgba8Unorm,
      bytes: bytemuck::cast_slice(&self.payloads),
    }
  }

  /// [`bind_payloads`](Self::bind_payloads) at the default binding point.
  pub fn bind_payloads_default(&self) -> BufferBinding<'_> {
    self.bind_payloads(LEAF_PAYLOAD_BINDING)
  }
}

impl std::fmt::Debug for NodePool {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("NodePool")
      .field("max_depth", &self.max_depth)
      .field("capacity", &self.capacity())
      .field("slots_used", &self.slots_used())
      .field("leaves", &self.payloads.len())
      .field("state", &self.state)
      .finish()
  }
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod pool_test;
