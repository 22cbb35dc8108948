use crate::gpu;
use crate::{
    HorizonSettings, Mode, PassResources, Result, Texture, TileContext,
    TilePass,
};

/// Renders horizon tables, one layer (i.e. one azimuth bucket) at a time.
#[derive(Debug)]
pub struct HorizonPass {
    pass: TilePass<gpu::HorizonPassParams>,
}

impl HorizonPass {
    pub fn new(device: &wgpu::Device, res: &PassResources) -> Result<Self> {
        let pass = TilePass::builder("horizon")
            .bind([res.stitch, res.slots])
            .build(
                device,
                &res.shaders.fullscreen,
                &res.shaders.horizon,
                res.capabilities.format(Mode::Horizon)?,
            );

        Ok(Self { pass })
    }

    pub fn run(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &Texture,
        ctx: TileContext,
        settings: &HorizonSettings,
    ) {
        for azimuth_index in 0..settings.azimuth_count {
            let Some(view) = target.layer_view(azimuth_index) else {
                break;
            };

            let params = gpu::HorizonPassParams {
                tile_size: ctx.tile_size as f32,
                meters_per_pixel: ctx.meters_per_pixel,
                max_neighbor_offset: ctx.max_neighbor_offset,
                max_distance: settings.max_distance,
                step_multiplier: settings.ray_step_multiplier,
                azimuth_index,
                azimuth_count: settings.azimuth_count,
                quantization_levels: settings.quantization_levels,
                angle_min: settings.angle_min,
                angle_max: settings.angle_max,
            };

            self.pass.run(encoder, view, params);
        }
    }
}
