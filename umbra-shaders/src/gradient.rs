use umbra_gpu::prelude::*;

#[spirv(fragment)]
pub fn main(
    #[spirv(frag_coord)] pos: Vec4,
    #[spirv(push_constant)] params: &GradientPassParams,
    #[spirv(descriptor_set = 0, binding = 0)] elevation: TexElevation,
    #[spirv(descriptor_set = 0, binding = 1, storage_buffer)] slots: &[u32],
    out: &mut Vec4,
) {
    let source = StitchedElevation::new(elevation);

    let sampler = ElevationSampler::new(
        &source,
        slots,
        params.tile_size,
        params.max_neighbor_offset,
    );

    *out = eval_gradient(
        &sampler,
        pos.xy() / params.tile_size,
        params.sampling_distance,
        params.meters_per_pixel,
    );
}
