use crate::gpu;
use crate::{
    Mode, PassResources, Result, ShadowSettings, SunParams, Texture,
    TileContext, TilePass,
};

#[derive(Debug)]
pub struct ShadowPass {
    pass: TilePass<gpu::ShadowPassParams>,
}

impl ShadowPass {
    pub fn new(device: &wgpu::Device, res: &PassResources) -> Result<Self> {
        let pass = TilePass::builder("shadow")
            .bind([res.stitch, res.slots])
            .build(
                device,
                &res.shaders.fullscreen,
                &res.shaders.shadow,
                res.capabilities.format(Mode::Shadow)?,
            );

        Ok(Self { pass })
    }

    pub fn run(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &Texture,
        ctx: TileContext,
        sun: &SunParams,
        shadow: &ShadowSettings,
    ) {
        let params = gpu::ShadowPassParams {
            sun_azimuth: sun.azimuth,
            sun_altitude: sun.altitude,
            ..shadow_params(ctx, shadow)
        };

        self.pass.run(encoder, target.view(), params);
    }
}

/// Fills everything but the sun's position; shared with
/// [`crate::DaylightPass`].
pub(crate) fn shadow_params(
    ctx: TileContext,
    shadow: &ShadowSettings,
) -> gpu::ShadowPassParams {
    gpu::ShadowPassParams {
        tile_size: ctx.tile_size as f32,
        meters_per_pixel: ctx.meters_per_pixel,
        max_neighbor_offset: ctx.max_neighbor_offset,
        max_distance: shadow.max_distance,
        step_multiplier: shadow.ray_step_multiplier,
        sample_count: shadow.sample_count,
        blur_radius: shadow.blur_radius,
        visibility_threshold: shadow.visibility_threshold,
        edge_softness: shadow.edge_softness,
        max_opacity: shadow.max_opacity,
        sun_azimuth: 0.0,
        sun_altitude: 0.0,
        daylight_sample_count: 0,
    }
}
