use spirv_std::glam::{uvec2, IVec2, UVec2};

use crate::{neighbor_offset, slot_count, ElevationSource};

/// CPU-side counterpart of the stitched elevation texture: decoded elevations
/// of a tile and its neighbors, one raster per slot.
///
/// Used by the engine's tests and by anything that wants to run the very same
/// algorithms the shaders run, without a GPU.
#[derive(Clone, Debug)]
pub struct StitchedGrid {
    tile_size: u32,
    max_offset: u32,
    data: Vec<f32>,
}

impl StitchedGrid {
    /// Creates a grid by evaluating `f(offset, texel)` for every slot and
    /// texel.
    pub fn new(
        tile_size: u32,
        max_offset: u32,
        mut f: impl FnMut(IVec2, UVec2) -> f32,
    ) -> Self {
        let slots = slot_count(max_offset);
        let mut data = Vec::with_capacity((slots * tile_size * tile_size) as usize);

        for slot in 0..slots {
            let offset = neighbor_offset(slot);

            for y in 0..tile_size {
                for x in 0..tile_size {
                    data.push(f(offset, uvec2(x, y)));
                }
            }
        }

        Self {
            tile_size,
            max_offset,
            data,
        }
    }

    /// Creates a grid from a global elevation function, evaluated in texel
    /// coordinates relative to the origin tile's top-left corner.
    pub fn from_fn(
        tile_size: u32,
        max_offset: u32,
        mut f: impl FnMut(i32, i32) -> f32,
    ) -> Self {
        let size = tile_size as i32;

        Self::new(tile_size, max_offset, |offset, texel| {
            f(
                offset.x * size + texel.x as i32,
                offset.y * size + texel.y as i32,
            )
        })
    }

    pub fn flat(tile_size: u32, max_offset: u32, elevation: f32) -> Self {
        Self::new(tile_size, max_offset, |_, _| elevation)
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn max_offset(&self) -> u32 {
        self.max_offset
    }
}

impl ElevationSource for StitchedGrid {
    fn elevation(&self, slot: u32, texel: UVec2) -> f32 {
        let idx = (slot * self.tile_size + texel.y) * self.tile_size + texel.x;

        self.data[idx as usize]
    }
}
