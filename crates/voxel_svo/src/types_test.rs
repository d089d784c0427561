use super::*;

#[test]
fn test_color_channel_packing() {
  let c = Color::rgba(0x11, 0x22, 0x33, 0x44);
  assert_eq!(c.packed(), 0x4433_2211);
  assert_eq!(c.to_array(), [0x11, 0x22, 0x33, 0x44]);
  assert_eq!(Color::from([0x11, 0x22, 0x33, 0x44]), c);
}

#[test]
fn test_red_is_opaque_red() {
  assert_eq!(Color::RED.to_array(), [255, 0, 0, 255]);
}

#[test]
fn test_transparent_packs_to_zero() {
  assert_eq!(Color::TRANSPARENT.packed(), 0);
  assert_eq!(Color::rgba(0, 0, 0, 0), Color::TRANSPARENT);
}

#[test]
fn test_position_packing_layout() {
  let packed = pack_position(UVec3::new(1, 2, 3));
  assert_eq!(packed, 1 | 2 << 10 | 3 << 20);
  assert_eq!(packed >> 30, 0, "Top two bits stay clear");
  assert_eq!(unpack_position(packed), UVec3::new(1, 2, 3));
}

#[test]
fn test_position_packing_max_coordinate() {
  let p = UVec3::splat(POSITION_MAX);
  assert_eq!(unpack_position(pack_position(p)), p);
}

/// Oversized coordinates saturate, and stay out of bounds after unpacking.
#[test]
fn test_position_packing_saturates() {
  let p = UVec3::new(5000, 7, u32::MAX);
  let unpacked = unpack_position(pack_position(p));
  assert_eq!(unpacked, UVec3::new(POSITION_MAX, 7, POSITION_MAX));

  let fragment = Fragment::new(unpacked, Color::RED);
  assert!(!fragment.in_bounds(crate::constants::MAX_DEPTH));
}

#[test]
fn test_fragment_bounds() {
  let inside = Fragment::new(UVec3::new(3, 0, 3), Color::RED);
  let edge = Fragment::new(UVec3::new(4, 0, 0), Color::RED);

  assert!(inside.in_bounds(2));
  assert!(!edge.in_bounds(2), "2^depth itself is outside the grid");
  assert!(edge.in_bounds(3));
}
