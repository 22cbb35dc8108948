use std::mem;

use log::{info, warn};

use crate::gpu;
use crate::{Error, Mode, Result};

/// Largest push-constant block any of the passes uses.
pub const MAX_PASS_PARAMS_SIZE: u32 = {
    let a = mem::size_of::<gpu::GradientPassParams>();
    let b = mem::size_of::<gpu::ShadowPassParams>();
    let c = mem::size_of::<gpu::HorizonPassParams>();

    let ab = if a > b { a } else { b };

    (if ab > c { ab } else { c }) as u32
};

/// What the device can do, as far as the engine is concerned; detected once,
/// when the engine gets created.
#[derive(Clone, Debug)]
pub struct Capabilities {
    /// Format of the gradient, shadow and daylight targets.
    pub target_format: Option<wgpu::TextureFormat>,

    /// Format of horizon tables.
    pub horizon_format: Option<wgpu::TextureFormat>,

    pub max_texture_size: u32,
    pub max_texture_layers: u32,

    /// Why the engine can't run on this device, if it can't.
    pub unsupported: Option<&'static str>,
}

impl Capabilities {
    pub fn required_features() -> wgpu::Features {
        wgpu::Features::PUSH_CONSTANTS
    }

    pub fn required_limits(base: wgpu::Limits) -> wgpu::Limits {
        wgpu::Limits {
            max_push_constant_size: base
                .max_push_constant_size
                .max(MAX_PASS_PARAMS_SIZE),
            ..base
        }
    }

    pub fn detect(adapter: &wgpu::Adapter, device: &wgpu::Device) -> Self {
        let limits = device.limits();

        let renderable = |format: wgpu::TextureFormat| {
            adapter
                .get_texture_format_features(format)
                .allowed_usages
                .contains(
                    wgpu::TextureUsages::RENDER_ATTACHMENT
                        | wgpu::TextureUsages::TEXTURE_BINDING,
                )
        };

        let pick = |formats: &[wgpu::TextureFormat]| {
            formats.iter().copied().find(|format| renderable(*format))
        };

        let target_format = pick(&[
            wgpu::TextureFormat::Rgba32Float,
            wgpu::TextureFormat::Rgba16Float,
        ]);

        let horizon_format =
            pick(&[wgpu::TextureFormat::R32Float, wgpu::TextureFormat::R16Float]);

        let unsupported = if !device
            .features()
            .contains(wgpu::Features::PUSH_CONSTANTS)
        {
            Some("push constants")
        } else if limits.max_push_constant_size < MAX_PASS_PARAMS_SIZE {
            Some("push constants large enough")
        } else if target_format.is_none() || horizon_format.is_none() {
            Some("renderable float textures")
        } else if !adapter
            .get_texture_format_features(wgpu::TextureFormat::Rgba8Unorm)
            .allowed_usages
            .contains(wgpu::TextureUsages::TEXTURE_BINDING)
        {
            Some("sampled Rgba8Unorm textures")
        } else {
            None
        };

        let this = Self {
            target_format,
            horizon_format,
            max_texture_size: limits.max_texture_dimension_2d,
            max_texture_layers: limits.max_texture_array_layers,
            unsupported,
        };

        if let Some(feature) = this.unsupported {
            warn!("Device doesn't support {feature}; precomputation disabled");
        } else {
            info!(
                "Detected capabilities; target_format={:?}, horizon_format={:?}, \
                 max_texture_size={}, max_texture_layers={}",
                this.target_format,
                this.horizon_format,
                this.max_texture_size,
                this.max_texture_layers,
            );
        }

        this
    }

    pub fn is_supported(&self) -> bool {
        self.unsupported.is_none()
    }

    pub fn format(&self, mode: Mode) -> Result<wgpu::TextureFormat> {
        let format = match mode {
            Mode::Horizon => self.horizon_format,
            _ => self.target_format,
        };

        format.ok_or(Error::Unsupported("renderable float textures"))
    }

    /// Checks whether a target of given shape can be created.
    pub fn check_target(&self, size: u32, layers: u32) -> Result<()> {
        if size == 0 || size > self.max_texture_size {
            return Err(Error::TargetTooLarge {
                size,
                limit: self.max_texture_size,
            });
        }

        if layers == 0 || layers > self.max_texture_layers {
            return Err(Error::TooManyLayers {
                layers,
                limit: self.max_texture_layers,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capabilities() -> Capabilities {
        Capabilities {
            target_format: Some(wgpu::TextureFormat::Rgba16Float),
            horizon_format: None,
            max_texture_size: 2048,
            max_texture_layers: 32,
            unsupported: None,
        }
    }

    #[test]
    fn params_fit_into_push_constants() {
        // wgpu guarantees at least 128 bytes wherever push constants are
        // supported at all
        assert!(MAX_PASS_PARAMS_SIZE <= 128);
        assert_eq!(0, MAX_PASS_PARAMS_SIZE % 4);
    }

    #[test]
    fn check_target() {
        let caps = capabilities();

        assert!(caps.check_target(512, 1).is_ok());
        assert!(caps.check_target(2048, 32).is_ok());

        assert!(matches!(
            caps.check_target(4096, 1),
            Err(Error::TargetTooLarge { size: 4096, limit: 2048 })
        ));

        assert!(matches!(
            caps.check_target(512, 64),
            Err(Error::TooManyLayers { layers: 64, limit: 32 })
        ));
    }

    #[test]
    fn format() {
        let caps = capabilities();

        assert_eq!(
            wgpu::TextureFormat::Rgba16Float,
            caps.format(Mode::Daylight).unwrap()
        );

        assert!(caps.format(Mode::Horizon).is_err());
    }
}
