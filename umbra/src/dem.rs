use std::io::Cursor;

use log::debug;

use crate::gpu;
use crate::{Error, Result};

/// Square elevation raster, in meters.
///
/// Mostly useful for hosts that don't have their elevation on the GPU yet (and
/// for tests): it converts between elevations, Terrarium-encoded PNGs and
/// textures the engine can stitch from.
#[derive(Clone, Debug, PartialEq)]
pub struct DemRaster {
    size: u32,
    elevations: Vec<f32>,
}

impl DemRaster {
    pub fn new(size: u32, elevations: Vec<f32>) -> Result<Self> {
        if size == 0 || elevations.len() != (size * size) as usize {
            return Err(Error::InvalidRaster(format!(
                "expected {size}x{size} elevations, got {}",
                elevations.len()
            )));
        }

        Ok(Self { size, elevations })
    }

    pub fn from_fn(size: u32, mut f: impl FnMut(u32, u32) -> f32) -> Self {
        let elevations = (0..size)
            .flat_map(|y| (0..size).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();

        Self { size, elevations }
    }

    /// Decodes a raster from Terrarium-encoded RGBA bytes.
    pub fn from_terrarium(size: u32, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != (size * size * 4) as usize {
            return Err(Error::InvalidRaster(format!(
                "expected {} bytes, got {}",
                size * size * 4,
                bytes.len()
            )));
        }

        let elevations = bytes
            .chunks_exact(4)
            .map(|px| gpu::decode_terrarium_bytes([px[0], px[1], px[2]]))
            .collect();

        Self::new(size, elevations)
    }

    /// Decodes a raster from a Terrarium-encoded PNG.
    pub fn decode_png(png: &[u8]) -> Result<Self> {
        let img = image::load_from_memory_with_format(png, image::ImageFormat::Png)?
            .to_rgba8();

        if img.width() != img.height() {
            return Err(Error::InvalidRaster(format!(
                "expected a square image, got {}x{}",
                img.width(),
                img.height()
            )));
        }

        Self::from_terrarium(img.width(), img.as_raw())
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let img = image::RgbaImage::from_raw(
            self.size,
            self.size,
            self.to_terrarium(),
        )
        .ok_or_else(|| Error::InvalidRaster("couldn't build image".into()))?;

        let mut png = Vec::new();

        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)?;

        Ok(png)
    }

    pub fn to_terrarium(&self) -> Vec<u8> {
        self.elevations
            .iter()
            .flat_map(|elevation| gpu::encode_terrarium(*elevation))
            .collect()
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn elevation(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.size || y >= self.size {
            return None;
        }

        self.elevations.get((y * self.size + x) as usize).copied()
    }

    /// Creates a texture suitable for [`crate::TerrainData`].
    pub fn upload(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: impl AsRef<str>,
    ) -> wgpu::Texture {
        let label = label.as_ref();

        debug!("Uploading elevation `{label}`; size={}", self.size);

        let size = wgpu::Extent3d {
            width: self.size,
            height: self.size,
            depth_or_array_layers: 1,
        };

        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &tex,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &self.to_terrarium(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.size),
                rows_per_image: Some(self.size),
            },
            size,
        );

        tex
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn size_is_validated() {
        assert!(DemRaster::new(2, vec![0.0; 4]).is_ok());
        assert!(DemRaster::new(2, vec![0.0; 3]).is_err());
        assert!(DemRaster::new(0, vec![]).is_err());
        assert!(DemRaster::from_terrarium(2, &[0; 15]).is_err());
    }

    #[test]
    fn png() {
        let dem = DemRaster::from_fn(8, |x, y| 100.0 * x as f32 - 25.5 * y as f32);
        let png = dem.encode_png().unwrap();
        let decoded = DemRaster::decode_png(&png).unwrap();

        assert_eq!(8, decoded.size());

        for y in 0..8 {
            for x in 0..8 {
                assert_relative_eq!(
                    dem.elevation(x, y).unwrap(),
                    decoded.elevation(x, y).unwrap(),
                    epsilon = 1.0 / 256.0,
                );
            }
        }
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            DemRaster::decode_png(b"definitely not a png"),
            Err(Error::Image(_))
        ));
    }

    #[test]
    fn elevation_outside_of_the_raster() {
        let dem = DemRaster::from_fn(4, |x, _| x as f32);

        assert_eq!(Some(3.0), dem.elevation(3, 0));
        assert_eq!(None, dem.elevation(4, 0));
    }
}
