use spirv_std::glam::{ivec2, uvec2, vec2, IVec2, IVec3, UVec2, Vec2};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{decode_terrarium, lookup_slot, TexElevation};

/// Something that stores decoded elevations of a tile and its neighbors, one
/// raster per slot (see [`crate::neighbor_slot()`]).
///
/// Slots of neighbors that aren't available are expected to hold a copy of
/// the tile itself.
pub trait ElevationSource {
    /// Returns elevation (in meters) of given texel of given slot.
    ///
    /// `texel` is always within `<0, tile_size)`.
    fn elevation(&self, slot: u32, texel: UVec2) -> f32;
}

/// Elevation source backed by the stitched Terrarium texture array.
#[derive(Clone, Copy)]
pub struct StitchedElevation<'a> {
    tex: TexElevation<'a>,
}

impl<'a> StitchedElevation<'a> {
    pub fn new(tex: TexElevation<'a>) -> Self {
        Self { tex }
    }
}

impl ElevationSource for StitchedElevation<'_> {
    fn elevation(&self, slot: u32, texel: UVec2) -> f32 {
        let texel: IVec3 = texel.as_ivec2().extend(slot as i32);

        decode_terrarium(self.tex.fetch(texel))
    }
}

/// Tile-relative position resolved to a concrete raster.
#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct ResolvedPosition {
    /// Offset of the tile the position landed in.
    pub offset: IVec2,

    /// Position within that tile, in `<0, 1>`.
    pub pos: Vec2,
}

/// Moves `pos` (normalized tile coordinates that may lie outside of `<0, 1>`)
/// by whole tiles until it lands within the tile, accumulating the offset of
/// the tile it ends up in.
///
/// The offset is bounded by `|x| + |y| <= max_offset`; positions further away
/// are left where they are (and clamped later), i.e. they sample the nearest
/// available ring.
pub fn resolve_position(mut pos: Vec2, max_offset: u32) -> ResolvedPosition {
    let max_offset = max_offset as i32;
    let mut offset = IVec2::ZERO;
    let mut iter = 0;

    let fits = |offset: IVec2| offset.x.abs() + offset.y.abs() <= max_offset;

    while iter < 4 * max_offset {
        if pos.x < 0.0 && fits(offset - ivec2(1, 0)) {
            pos.x += 1.0;
            offset.x -= 1;
        } else if pos.x > 1.0 && fits(offset + ivec2(1, 0)) {
            pos.x -= 1.0;
            offset.x += 1;
        } else if pos.y < 0.0 && fits(offset - ivec2(0, 1)) {
            pos.y += 1.0;
            offset.y -= 1;
        } else if pos.y > 1.0 && fits(offset + ivec2(0, 1)) {
            pos.y -= 1.0;
            offset.y += 1;
        } else {
            break;
        }

        iter += 1;
    }

    ResolvedPosition { offset, pos }
}

/// Samples elevation at positions relative to a tile, reaching into its
/// neighbors when the position lies outside of the tile.
#[derive(Clone, Copy)]
pub struct ElevationSampler<'a, S> {
    source: &'a S,
    slots: &'a [u32],
    tile_size: f32,
    max_offset: u32,
}

impl<'a, S> ElevationSampler<'a, S>
where
    S: ElevationSource,
{
    pub fn new(
        source: &'a S,
        slots: &'a [u32],
        tile_size: f32,
        max_offset: u32,
    ) -> Self {
        Self {
            source,
            slots,
            tile_size,
            max_offset,
        }
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn max_offset(&self) -> u32 {
        self.max_offset
    }

    /// Returns (bilinearly interpolated) elevation at given normalized
    /// position.
    pub fn sample(&self, pos: Vec2) -> f32 {
        let resolved = resolve_position(pos, self.max_offset);

        // Offsets produced by `resolve_position()` always fit within the
        // diamond, but let's not index out of the texture if they don't
        let slot = lookup_slot(self.slots, resolved.offset).unwrap_or(0);

        self.sample_slot(slot, resolved.pos)
    }

    /// Returns elevation at given normalized position of given slot, clamping
    /// the position half a texel from the border.
    pub fn sample_slot(&self, slot: u32, pos: Vec2) -> f32 {
        let half_texel = 0.5 / self.tile_size;
        let pos = pos.clamp(Vec2::splat(half_texel), Vec2::splat(1.0 - half_texel));

        let max_texel = self.tile_size as u32 - 1;
        let texel = pos * self.tile_size - 0.5;
        let base = texel.floor();
        let t = texel - base;

        let t00 = base.as_uvec2().min(UVec2::splat(max_texel));
        let t11 = (t00 + 1).min(UVec2::splat(max_texel));

        let h00 = self.source.elevation(slot, t00);
        let h10 = self.source.elevation(slot, uvec2(t11.x, t00.y));
        let h01 = self.source.elevation(slot, uvec2(t00.x, t11.y));
        let h11 = self.source.elevation(slot, t11);

        let top = h00 + (h10 - h00) * t.x;
        let bottom = h01 + (h11 - h01) * t.x;

        top + (bottom - top) * t.y
    }

    /// Returns elevation at the center of given texel of the tile itself.
    pub fn texel(&self, texel: UVec2) -> f32 {
        self.source.elevation(0, texel)
    }

    /// Converts texel coordinates into normalized tile position (of the
    /// texel's center).
    pub fn texel_to_pos(&self, texel: UVec2) -> Vec2 {
        (texel.as_vec2() + vec2(0.5, 0.5)) / self.tile_size
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{slot_table, StitchedGrid};

    #[test]
    fn positions_within_tile_resolve_to_origin() {
        for pos in [vec2(0.5, 0.5), vec2(0.01, 0.99), vec2(0.999, 0.001)] {
            let resolved = resolve_position(pos, 2);

            assert_eq!(IVec2::ZERO, resolved.offset);
            assert_eq!(pos, resolved.pos);
        }
    }

    #[test]
    fn negative_x_crosses_tiles() {
        for (x, crossings) in [(-0.3, 1), (-0.999, 1), (-1.4, 2), (-1.9, 2)] {
            let resolved = resolve_position(vec2(x, 0.5), 2);

            assert_eq!(ivec2(-crossings, 0), resolved.offset, "x={x}");
            assert!(resolved.pos.x >= 0.0 && resolved.pos.x <= 1.0, "x={x}");
            assert_relative_eq!(
                x + crossings as f32,
                resolved.pos.x,
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn offsets_are_bounded_by_the_diamond() {
        let resolved = resolve_position(vec2(-1.5, -1.5), 2);

        assert_eq!(2, resolved.offset.x.abs() + resolved.offset.y.abs());

        let resolved = resolve_position(vec2(-3.5, 0.5), 2);

        assert_eq!(ivec2(-2, 0), resolved.offset);
        assert!(resolved.pos.x < 0.0);
    }

    #[test]
    fn sampling_reaches_into_neighbors() {
        let grid = StitchedGrid::new(4, 2, |offset, _| {
            (offset.x * 100 + offset.y * 10) as f32
        });

        let slots = slot_table(2);
        let sampler = ElevationSampler::new(&grid, &slots, 4.0, 2);

        assert_relative_eq!(0.0, sampler.sample(vec2(0.5, 0.5)));
        assert_relative_eq!(-100.0, sampler.sample(vec2(-0.5, 0.5)));
        assert_relative_eq!(100.0, sampler.sample(vec2(1.5, 0.5)));
        assert_relative_eq!(200.0, sampler.sample(vec2(2.5, 0.5)));
        assert_relative_eq!(-20.0, sampler.sample(vec2(0.5, -1.5)));
        assert_relative_eq!(110.0, sampler.sample(vec2(1.5, 1.5)));
    }

    #[test]
    fn positions_beyond_the_diamond_sample_nearest_ring() {
        let grid = StitchedGrid::new(4, 2, |offset, _| {
            (offset.x * 100 + offset.y * 10) as f32
        });

        let slots = slot_table(2);
        let sampler = ElevationSampler::new(&grid, &slots, 4.0, 2);

        assert_relative_eq!(200.0, sampler.sample(vec2(4.5, 0.5)));
    }

    #[test]
    fn sampling_is_bilinear() {
        let grid = StitchedGrid::new(4, 2, |_, texel| texel.x as f32 * 10.0);
        let slots = slot_table(2);
        let sampler = ElevationSampler::new(&grid, &slots, 4.0, 2);

        // Texel centers
        assert_relative_eq!(0.0, sampler.sample(vec2(0.125, 0.5)));
        assert_relative_eq!(10.0, sampler.sample(vec2(0.375, 0.5)));

        // Halfway between texels
        assert_relative_eq!(5.0, sampler.sample(vec2(0.25, 0.5)));

        // Clamped at the border
        assert_relative_eq!(30.0, sampler.sample(vec2(1.0, 0.5)));
    }
}
