use std::sync::Barrier;

use super::*;

// =========================================================================
// Construction
// =========================================================================

#[test]
fn test_new_allocates_formula_capacity() {
  for depth in 1..=4 {
    let pool = NodePool::new(depth).unwrap();
    assert_eq!(pool.capacity() as u64, capacity(depth).unwrap());
    assert_eq!(pool.max_depth(), depth);
  }
}

/// A slot count no allocator can satisfy is an error, not an abort.
#[test]
fn test_allocation_failure_reported() {
  let err = NodePool::with_slot_count(9, u64::MAX).unwrap_err();
  assert!(matches!(err, SvoError::Capacity { .. }), "Got {:?}", err);
}

#[test]
fn test_new_rejects_unsupported_depth() {
  assert!(matches!(NodePool::new(0), Err(SvoError::Capacity { .. })));
  assert!(matches!(NodePool::new(MAX_DEPTH + 1), Err(SvoError::Capacity { .. })));
}

/// A fresh pool is the valid empty scene: root children all EMPTY.
#[test]
fn test_new_pool_has_empty_root() {
  let pool = NodePool::new(3).unwrap();
  for octant in 0..8 {
    assert_eq!(pool.read_child(ROOT, octant), EMPTY);
  }
  assert_eq!(pool.slots_used(), NODE_SLOTS);
  assert_eq!(pool.nodes_allocated(), 0);
  assert!(pool.is_valid());
}

// =========================================================================
// Allocation
// =========================================================================

#[test]
fn test_allocate_node_hands_out_consecutive_blocks() {
  let pool = NodePool::new(2).unwrap();
  assert_eq!(pool.allocate_node().unwrap(), 8);
  assert_eq!(pool.allocate_node().unwrap(), 16);
  assert_eq!(pool.allocate_node().unwrap(), 24);
  assert_eq!(pool.nodes_allocated(), 3);
}

/// Depth 1 holds 64 slots: root + 7 blocks, then exhaustion.
#[test]
fn test_allocate_node_exhaustion() {
  let pool = NodePool::new(1).unwrap();
  for _ in 0..7 {
    pool.allocate_node().unwrap();
  }
  let err = pool.allocate_node().unwrap_err();
  assert_eq!(
    err,
    SvoError::PoolExhausted {
      requested: 72,
      capacity: 64
    }
  );
  assert_eq!(pool.slots_used(), 64, "Cursor must not move past capacity");
}

#[test]
fn test_allocated_block_is_empty() {
  let pool = NodePool::new(2).unwrap();
  let node = pool.allocate_node().unwrap();
  for octant in 0..8 {
    assert_eq!(pool.read_child(node, octant), EMPTY);
  }
}

#[test]
fn test_write_then_read_child() {
  let pool = NodePool::new(2).unwrap();
  pool.write_child(ROOT, 5, 0xDEAD_BEEF);
  assert_eq!(pool.read_child(ROOT, 5), 0xDEAD_BEEF);
  assert_eq!(pool.read_child(ROOT, 4), EMPTY);
}

// =========================================================================
// Claiming
// =========================================================================

#[test]
fn test_claim_child_is_idempotent() {
  let pool = NodePool::new(3).unwrap();
  let first = pool.claim_child(ROOT, 3).unwrap();
  let second = pool.claim_child(ROOT, 3).unwrap();
  assert_eq!(first, second);
  assert_eq!(pool.read_child(ROOT, 3), first);
  assert_eq!(pool.nodes_allocated(), 1);
}

/// Many threads racing on one empty slot: one allocation, one shared index.
#[test]
fn test_claim_child_concurrent_single_winner() {
  const THREADS: usize = 16;
  let pool = NodePool::new(3).unwrap();
  let barrier = Barrier::new(THREADS);

  let results: Vec<u32> = std::thread::scope(|scope| {
    let handles: Vec<_> = (0..THREADS)
      .map(|_| {
        scope.spawn(|| {
          barrier.wait();
          pool.claim_child(ROOT, 6).unwrap()
        })
      })
      .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
  });

  assert!(results.iter().all(|&r| r == results[0]), "All claimants see one index");
  assert_eq!(pool.nodes_allocated(), 1, "Exactly one block allocated");
  assert_eq!(pool.read_child(ROOT, 6), results[0]);
}

/// Exhaustion during a claim leaves the slot EMPTY, never PENDING.
#[test]
fn test_claim_child_exhaustion_restores_empty() {
  let pool = NodePool::new(1).unwrap();
  for _ in 0..7 {
    pool.allocate_node().unwrap();
  }
  let err = pool.claim_child(ROOT, 0).unwrap_err();
  assert!(matches!(err, SvoError::PoolExhausted { .. }));
  assert_eq!(pool.read_child(ROOT, 0), EMPTY);
}

/// Leaf recording keeps the largest fragment index.
#[test]
fn test_record_leaf_keeps_max_index() {
  let pool = NodePool::new(1).unwrap();
  pool.record_leaf(3, 7);
  pool.record_leaf(3, 2);
  pool.record_leaf(3, 5);
  assert_eq!(pool.load_slot(3), 8);
}

// =========================================================================
// Lookup, reset, export
// =========================================================================

#[test]
fn test_leaf_slot_for_path() {
  let pool = NodePool::new(2).unwrap();
  assert_eq!(pool.leaf_slot_for_path(&[0, 0]), None, "Interior child missing");

  let child = pool.claim_child(ROOT, 0).unwrap();
  assert_eq!(pool.leaf_slot_for_path(&[0, 0]), Some(child));
  assert_eq!(pool.leaf_slot_for_path(&[0, 7]), Some(child + 7));
  assert_eq!(pool.leaf_slot_for_path(&[0]), None, "Wrong path length");
  assert_eq!(pool.leaf_slot_for_path(&[]), None);
}

#[test]
fn test_leaf_slot_by_position() {
  let mut pool = NodePool::new(2).unwrap();
  let child = pool.claim_child(ROOT, 0b001).unwrap();
  // x = 3 -> bits (1, 1): octant 1 at both depths.
  assert_eq!(pool.leaf_slot(UVec3::new(3, 0, 0)), Some(child + 1));
  assert_eq!(pool.leaf_slot(UVec3::new(4, 0, 0)), None, "Outside the grid");
  assert_eq!(pool.leaf_payload(UVec3::new(3, 0, 0)), None, "Slot exists but is empty");

  pool.set_payloads(vec![Color::GREEN, Color::RED]);
  pool.store_slot(child + 1, 2);
  assert_eq!(pool.leaf_payload(UVec3::new(3, 0, 0)), Some(Color::RED));
}

/// Depth 1: the root block holds payloads directly.
#[test]
fn test_depth_one_leaves_live_in_root() {
  let pool = NodePool::new(1).unwrap();
  assert_eq!(pool.leaf_slot(UVec3::new(1, 1, 0)), Some(ROOT + 3));
}

#[test]
fn test_reset_clears_everything() {
  let mut pool = NodePool::new(2).unwrap();
  let child = pool.claim_child(ROOT, 2).unwrap();
  pool.write_child(child, 1, 1);
  pool.set_payloads(vec![Color::RED]);
  pool.set_state(PoolState::Invalid);

  pool.reset();

  assert!(pool.to_vec().iter().all(|&s| s == EMPTY));
  assert!(pool.payloads().is_empty());
  assert_eq!(pool.slots_used(), NODE_SLOTS);
  assert_eq!(pool.state(), PoolState::Valid);
  assert_eq!(pool.allocate_node().unwrap(), 8, "Allocation restarts after the root");
}

#[test]
fn test_bind_exports_all_slots() {
  let mut pool = NodePool::new(1).unwrap();
  pool.write_child(ROOT, 1, 0x0102_0304);

  let binding = pool.bind(4);
  assert_eq!(binding.binding, 4);
  assert_eq!(binding.format, BufferFormat::R32Uint);
  assert_eq!(binding.len(), 64);
  assert_eq!(&binding.bytes[4..8], &0x0102_0304u32.to_ne_bytes());
}

#[test]
fn test_bind_default_point() {
  let mut pool = NodePool::new(1).unwrap();
  assert_eq!(pool.bind_default().binding, NODE_POOL_BINDING);
}

#[test]
fn test_payload_resolution() {
  let mut pool = NodePool::new(1).unwrap();
  pool.set_payloads(vec![Color::TRANSPARENT, Color::BLUE]);
  assert_eq!(pool.payload(EMPTY), None);
  assert_eq!(pool.payload(1), Some(Color::TRANSPARENT));
  assert_eq!(pool.payload(2), Some(Color::BLUE));
  assert_eq!(pool.payload(3), None);
}

#[test]
fn test_bind_payloads_exports_table() {
  let mut pool = NodePool::new(1).unwrap();
  pool.set_payloads(vec![Color::RED, Color::TRANSPARENT]);

  let binding = pool.bind_payloads_default();
  assert_eq!(binding.binding, LEAF_PAYLOAD_BINDING);
  assert_eq!(binding.format, BufferFormat::Rgba8Unorm);
  assert_eq!(binding.len(), 2);
  assert_eq!(&binding.bytes[..4], &[255, 0, 0, 255]);
}
