use derivative::Derivative;
use log::debug;

use crate::{Bindable, Error, Result};

/// Layered texture the passes read elevation from: layer 0 holds the tile
/// being rendered, the remaining ones its neighbors (see
/// [`crate::NeighborOffsets`]).
///
/// There's just one such texture, reused for every tile and reallocated only
/// when the tile size or the number of neighbors changes.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct StitchTexture {
    #[derivative(Debug = "ignore")]
    tex: wgpu::Texture,

    #[derivative(Debug = "ignore")]
    view: wgpu::TextureView,

    size: u32,
    layers: u32,
}

impl StitchTexture {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    pub fn new(device: &wgpu::Device, size: u32, layers: u32) -> Self {
        debug!("Allocating stitch texture; size={size}, layers={layers}");

        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("umbra_stitch_tex"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = tex.create_view(&wgpu::TextureViewDescriptor {
            label: Some("umbra_stitch_view"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        Self {
            tex,
            view,
            size,
            layers,
        }
    }

    pub fn fits(&self, size: u32, layers: u32) -> bool {
        self.size == size && self.layers == layers
    }

    /// Checks whether given elevation texture can be stitched in.
    pub fn validate(&self, source: &wgpu::Texture) -> Result<()> {
        ElevationTexture::of(source).check(self.size)
    }

    /// Records copying given elevation texture into given layer.
    pub fn copy(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        layer: u32,
        source: &wgpu::Texture,
    ) {
        encoder.copy_texture_to_texture(
            wgpu::ImageCopyTexture {
                texture: source,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyTexture {
                texture: &self.tex,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: layer,
                },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width: self.size,
                height: self.size,
                depth_or_array_layers: 1,
            },
        );
    }
}

/// Properties of an elevation texture that decide whether it can be stitched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElevationTexture {
    pub format: wgpu::TextureFormat,
    pub usage: wgpu::TextureUsages,
    pub width: u32,
    pub height: u32,
}

impl ElevationTexture {
    pub fn of(tex: &wgpu::Texture) -> Self {
        Self {
            format: tex.format(),
            usage: tex.usage(),
            width: tex.width(),
            height: tex.height(),
        }
    }

    /// Checks whether this texture can be copied into a layer of a stitch
    /// texture of given size.
    pub fn check(&self, size: u32) -> Result<()> {
        if self.format != StitchTexture::FORMAT {
            return Err(Error::InvalidRaster(format!(
                "expected {:?}, got {:?}",
                StitchTexture::FORMAT,
                self.format
            )));
        }

        if !self.usage.contains(wgpu::TextureUsages::COPY_SRC) {
            return Err(Error::InvalidRaster(
                "elevation texture lacks COPY_SRC usage".into(),
            ));
        }

        if self.width != size || self.height != size {
            return Err(Error::InvalidRaster(format!(
                "expected {0}x{0} texels, got {1}x{2}",
                size, self.width, self.height
            )));
        }

        Ok(())
    }
}

impl Bindable for StitchTexture {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2Array,
                sample_type: wgpu::TextureSampleType::Float {
                    filterable: false,
                },
            },
            count: None,
        };

        vec![(layout, wgpu::BindingResource::TextureView(&self.view))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture() -> ElevationTexture {
        ElevationTexture {
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            width: 256,
            height: 256,
        }
    }

    #[test]
    fn stitchable_textures() {
        assert!(texture().check(256).is_ok());
        assert!(texture().check(512).is_err());

        let tex = ElevationTexture {
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            ..texture()
        };

        assert!(tex.check(256).is_err());

        let tex = ElevationTexture {
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            ..texture()
        };

        assert!(matches!(tex.check(256), Err(Error::InvalidRaster(_))));

        let tex = ElevationTexture {
            height: 128,
            ..texture()
        };

        assert!(tex.check(256).is_err());
    }
}
