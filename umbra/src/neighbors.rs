use spirv_std::glam::IVec2;

use crate::{gpu, TileId};

/// Neighbor a tile borrows elevation from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NeighborOffset {
    pub offset: IVec2,

    /// Symbolic name, e.g. `ne` or `n2e`.
    pub name: String,

    /// Layer of the stitched texture this neighbor lands in.
    pub slot: u32,
}

/// Set of neighbors used for every tile; computed once, when the engine
/// starts.
#[derive(Clone, Debug)]
pub struct NeighborOffsets {
    max_offset: u32,
    offsets: Vec<NeighborOffset>,
    slot_table: Vec<u32>,
}

impl NeighborOffsets {
    pub fn new(max_offset: u32) -> Self {
        let max_offset = max_offset.min(gpu::MAX_NEIGHBOR_OFFSET_LIMIT);

        let offsets = (1..gpu::slot_count(max_offset))
            .map(|slot| {
                let offset = gpu::neighbor_offset(slot);

                NeighborOffset {
                    offset,
                    name: Self::name(offset),
                    slot,
                }
            })
            .collect();

        Self {
            max_offset,
            offsets,
            slot_table: gpu::slot_table(max_offset).to_vec(),
        }
    }

    /// Names an offset: vertical part first, then the horizontal one, each
    /// followed by its distance when it's larger than one.
    pub fn name(offset: IVec2) -> String {
        fn part(name: char, dist: i32) -> String {
            match dist {
                0 => String::new(),
                1 => name.to_string(),
                dist => format!("{name}{dist}"),
            }
        }

        let vertical = part(if offset.y < 0 { 'n' } else { 's' }, offset.y.abs());
        let horizontal = part(if offset.x < 0 { 'w' } else { 'e' }, offset.x.abs());

        vertical + &horizontal
    }

    pub fn max_offset(&self) -> u32 {
        self.max_offset
    }

    /// Number of layers of the stitched texture, including the tile itself.
    pub fn slot_count(&self) -> u32 {
        self.offsets.len() as u32 + 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &NeighborOffset> + '_ {
        self.offsets.iter()
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Offset -> slot lookup table, as uploaded for the shaders.
    pub fn slot_table(&self) -> &[u32] {
        &self.slot_table
    }

    /// Resolves every neighbor of given tile; `None` stands for neighbors
    /// lying beyond the top or bottom edge of the map.
    pub fn tiles_around(
        &self,
        tile: TileId,
    ) -> impl Iterator<Item = (&NeighborOffset, Option<TileId>)> + '_ {
        self.offsets.iter().map(move |neighbor| {
            (neighbor, tile.neighbor(neighbor.offset.x, neighbor.offset.y))
        })
    }
}
