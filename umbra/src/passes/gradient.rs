use crate::gpu;
use crate::{
    GradientSettings, Mode, PassResources, Result, Texture, TileContext,
    TilePass,
};

#[derive(Debug)]
pub struct GradientPass {
    pass: TilePass<gpu::GradientPassParams>,
}

impl GradientPass {
    pub fn new(device: &wgpu::Device, res: &PassResources) -> Result<Self> {
        let pass = TilePass::builder("gradient")
            .bind([res.stitch, res.slots])
            .build(
                device,
                &res.shaders.fullscreen,
                &res.shaders.gradient,
                res.capabilities.format(Mode::Gradient)?,
            );

        Ok(Self { pass })
    }

    pub fn run(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &Texture,
        ctx: TileContext,
        settings: &GradientSettings,
    ) {
        let params = gpu::GradientPassParams {
            tile_size: ctx.tile_size as f32,
            meters_per_pixel: ctx.meters_per_pixel,
            max_neighbor_offset: ctx.max_neighbor_offset,
            sampling_distance: settings.sampling_distance,
        };

        self.pass.run(encoder, target.view(), params);
    }
}
