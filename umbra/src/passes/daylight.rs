use crate::gpu;
use crate::{
    Mode, PassResources, Result, ShadowSettings, Texture, TileContext,
    TilePass,
};

#[derive(Debug)]
pub struct DaylightPass {
    pass: TilePass<gpu::ShadowPassParams>,
}

impl DaylightPass {
    pub fn new(device: &wgpu::Device, res: &PassResources) -> Result<Self> {
        let pass = TilePass::builder("daylight")
            .bind([res.stitch, res.slots, res.samples])
            .build(
                device,
                &res.shaders.fullscreen,
                &res.shaders.daylight,
                res.capabilities.format(Mode::Daylight)?,
            );

        Ok(Self { pass })
    }

    /// Expects the samples to have been already flushed into the buffer bound
    /// during [`Self::new()`].
    pub fn run(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &Texture,
        ctx: TileContext,
        sample_count: u32,
        shadow: &ShadowSettings,
    ) {
        let params = gpu::ShadowPassParams {
            daylight_sample_count: sample_count
                .min(gpu::MAX_DAYLIGHT_SAMPLES),
            ..super::shadow::shadow_params(ctx, shadow)
        };

        self.pass.run(encoder, target.view(), params);
    }
}
