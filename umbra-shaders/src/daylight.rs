use umbra_gpu::prelude::*;

#[spirv(fragment)]
pub fn main(
    #[spirv(frag_coord)] pos: Vec4,
    #[spirv(push_constant)] params: &ShadowPassParams,
    #[spirv(descriptor_set = 0, binding = 0)] elevation: TexElevation,
    #[spirv(descriptor_set = 0, binding = 1, storage_buffer)] slots: &[u32],
    #[spirv(descriptor_set = 0, binding = 2, storage_buffer)]
    samples: &[DaylightSample],
    out: &mut Vec4,
) {
    let source = StitchedElevation::new(elevation);

    let sampler = ElevationSampler::new(
        &source,
        slots,
        params.tile_size,
        params.max_neighbor_offset,
    );

    *out = eval_daylight(
        &sampler,
        pos.xy() / params.tile_size,
        samples,
        params.daylight_sample_count,
        params.soft_shadow(),
        params.raymarch(),
    );
}
