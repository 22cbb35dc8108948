//! Neighbor tiles a tile borrows elevation from.
//!
//! Neighbors are the offsets `(dx, dy)` with `0 < |dx| + |dy| <= max_offset`
//! (a diamond, not a full square). Each one is given a stable slot: slot `0`
//! is the tile itself, then come the rings of increasing Manhattan distance,
//! each walked clockwise starting from north (`dy < 0` is north):
//!
//! ```text
//! max_offset = 2
//!
//!             5
//!         12  1  6
//!     11   4  0  2  7
//!         10  3  8
//!             9
//! ```
//!
//! The engine evaluates the mapping once at startup into a [`slot_table()`]
//! and hands it to the shaders, which only ever index that table.

use spirv_std::glam::{ivec2, IVec2};

/// Default number of neighbor rings.
pub const DEFAULT_MAX_NEIGHBOR_OFFSET: u32 = 2;

/// Upper bound for the number of neighbor rings.
pub const MAX_NEIGHBOR_OFFSET_LIMIT: u32 = 3;

/// Returns number of slots (tile itself + its neighbors) for given ring count.
pub fn slot_count(max_offset: u32) -> u32 {
    1 + 2 * max_offset * (max_offset + 1)
}

/// Returns slot of given offset, or `None` if the offset lies outside of the
/// diamond.
pub fn neighbor_slot(offset: IVec2, max_offset: u32) -> Option<u32> {
    let (dx, dy) = (offset.x, offset.y);
    let dist = dx.abs() + dy.abs();

    if dist == 0 {
        return Some(0);
    }

    if dist > max_offset as i32 {
        return None;
    }

    let ring_start = 1 + 2 * dist * (dist - 1);

    let idx_in_ring = if dx >= 0 && dy < 0 {
        dx
    } else if dx > 0 && dy >= 0 {
        dist + dy
    } else if dx <= 0 && dy > 0 {
        2 * dist - dx
    } else {
        3 * dist - dy
    };

    Some((ring_start + idx_in_ring) as u32)
}

/// Width (and height) of the slot table; covers offsets up to
/// [`MAX_NEIGHBOR_OFFSET_LIMIT`] in every direction.
pub const SLOT_TABLE_WIDTH: usize = 2 * MAX_NEIGHBOR_OFFSET_LIMIT as usize + 1;

pub const SLOT_TABLE_LEN: usize = SLOT_TABLE_WIDTH * SLOT_TABLE_WIDTH;

/// Marks offsets that lie outside of the diamond.
pub const SLOT_NONE: u32 = u32::MAX;

/// Returns index into the slot table for given offset, or `None` if the
/// offset doesn't fit into the table at all.
pub fn slot_table_index(offset: IVec2) -> Option<usize> {
    let limit = MAX_NEIGHBOR_OFFSET_LIMIT as i32;

    if offset.x.abs() > limit || offset.y.abs() > limit {
        return None;
    }

    let x = (offset.x + limit) as usize;
    let y = (offset.y + limit) as usize;

    Some(y * SLOT_TABLE_WIDTH + x)
}

/// Builds the offset -> slot lookup table; entries outside of the diamond are
/// set to [`SLOT_NONE`].
pub fn slot_table(max_offset: u32) -> [u32; SLOT_TABLE_LEN] {
    let limit = MAX_NEIGHBOR_OFFSET_LIMIT as i32;
    let mut table = [SLOT_NONE; SLOT_TABLE_LEN];
    let mut idx = 0;

    while idx < SLOT_TABLE_LEN {
        let offset = ivec2(
            (idx % SLOT_TABLE_WIDTH) as i32 - limit,
            (idx / SLOT_TABLE_WIDTH) as i32 - limit,
        );

        if let Some(slot) = neighbor_slot(offset, max_offset) {
            table[idx] = slot;
        }

        idx += 1;
    }

    table
}

/// Looks up slot of given offset in a table built by [`slot_table()`].
pub fn lookup_slot(table: &[u32], offset: IVec2) -> Option<u32> {
    let slot = table[slot_table_index(offset)?];

    if slot == SLOT_NONE {
        None
    } else {
        Some(slot)
    }
}

/// Returns offset of given slot; inverse of [`neighbor_slot()`].
pub fn neighbor_offset(slot: u32) -> IVec2 {
    if slot == 0 {
        return IVec2::ZERO;
    }

    let slot = slot as i32;
    let mut dist = 1;

    while 1 + 2 * (dist + 1) * dist <= slot {
        dist += 1;
    }

    let idx = slot - (1 + 2 * dist * (dist - 1));
    let edge = idx / dist;
    let k = idx % dist;

    if edge == 0 {
        ivec2(k, -dist + k)
    } else if edge == 1 {
        ivec2(dist - k, k)
    } else if edge == 2 {
        ivec2(-k, dist - k)
    } else {
        ivec2(-dist + k, -k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts() {
        assert_eq!(1, slot_count(0));
        assert_eq!(5, slot_count(1));
        assert_eq!(13, slot_count(2));
        assert_eq!(25, slot_count(3));
    }

    #[test]
    fn immediate_ring() {
        assert_eq!(ivec2(0, -1), neighbor_offset(1));
        assert_eq!(ivec2(1, 0), neighbor_offset(2));
        assert_eq!(ivec2(0, 1), neighbor_offset(3));
        assert_eq!(ivec2(-1, 0), neighbor_offset(4));
    }

    #[test]
    fn second_ring_is_walked_clockwise() {
        let offsets: [_; 8] = core::array::from_fn(|i| neighbor_offset(5 + i as u32));

        assert_eq!(
            [
                ivec2(0, -2),
                ivec2(1, -1),
                ivec2(2, 0),
                ivec2(1, 1),
                ivec2(0, 2),
                ivec2(-1, 1),
                ivec2(-2, 0),
                ivec2(-1, -1),
            ],
            offsets
        );
    }

    #[test]
    fn slots_roundtrip() {
        for max_offset in 0..=MAX_NEIGHBOR_OFFSET_LIMIT {
            for slot in 0..slot_count(max_offset) {
                let offset = neighbor_offset(slot);

                assert!(offset.x.abs() + offset.y.abs() <= max_offset as i32);
                assert_eq!(Some(slot), neighbor_slot(offset, max_offset));
            }
        }
    }

    #[test]
    fn corners_are_outside_of_the_diamond() {
        assert_eq!(None, neighbor_slot(ivec2(2, 2), 2));
        assert_eq!(None, neighbor_slot(ivec2(-2, 1), 2));
        assert_eq!(Some(24), neighbor_slot(ivec2(-1, -2), 3));
    }

    #[test]
    fn table_agrees_with_mapping() {
        let table = slot_table(2);

        assert_eq!(13, table.iter().filter(|slot| **slot != SLOT_NONE).count());
        assert_eq!(Some(0), lookup_slot(&table, IVec2::ZERO));
        assert_eq!(Some(7), lookup_slot(&table, ivec2(2, 0)));
        assert_eq!(None, lookup_slot(&table, ivec2(2, 1)));
        assert_eq!(None, lookup_slot(&table, ivec2(4, 0)));
    }
}
