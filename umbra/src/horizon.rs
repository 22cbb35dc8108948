use crate::gpu;
use crate::{CacheEntry, ExposureLut, PassKey, Texture, TileId};

/// Horizon table of a single tile: one layer per azimuth bucket, each texel
/// holding `level / (levels - 1)` of the horizon angle seen from there.
#[derive(Clone, Copy, Debug)]
pub struct HorizonTable<'a> {
    tile: TileId,
    texture: &'a Texture,
    azimuth_count: u32,
    quantization: gpu::HorizonQuantization,
    max_distance: f32,
}

impl<'a> HorizonTable<'a> {
    pub(crate) fn new(entry: &'a CacheEntry<Texture>) -> Option<Self> {
        let PassKey::Horizon {
            azimuth_count,
            quantization_levels,
            angle_min,
            angle_max,
            max_distance,
            ..
        } = entry.signature.pass
        else {
            return None;
        };

        Some(Self {
            tile: entry.tile,
            texture: &entry.resource,
            azimuth_count,
            quantization: gpu::HorizonQuantization {
                levels: quantization_levels,
                angle_min: f32::from_bits(angle_min),
                angle_max: f32::from_bits(angle_max),
            },
            max_distance: f32::from_bits(max_distance),
        })
    }

    pub fn tile(&self) -> TileId {
        self.tile
    }

    pub fn texture(&self) -> &'a Texture {
        self.texture
    }

    /// `D2Array` view over all buckets.
    pub fn view(&self) -> &'a wgpu::TextureView {
        self.texture.view()
    }

    pub fn azimuth_count(&self) -> u32 {
        self.azimuth_count
    }

    pub fn quantization(&self) -> gpu::HorizonQuantization {
        self.quantization
    }

    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Layer holding horizon angles towards given azimuth (clockwise from
    /// north, in radians).
    pub fn layer(&self, azimuth: f32) -> u32 {
        gpu::azimuth_bucket(azimuth, self.azimuth_count)
    }

    /// Whether given exposure table has been built for tables of this shape,
    /// i.e. whether the two can be combined.
    pub fn matches(&self, lut: &ExposureLut) -> bool {
        let key = lut.key();

        key.azimuth_count == self.azimuth_count
            && key.quantization_levels == self.quantization.levels
            && key.angle_min == self.quantization.angle_min.to_bits()
            && key.angle_max == self.quantization.angle_max.to_bits()
    }
}
