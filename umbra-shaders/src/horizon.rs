use umbra_gpu::prelude::*;

/// Renders a single layer (azimuth bucket) of a horizon table.
#[spirv(fragment)]
pub fn main(
    #[spirv(frag_coord)] pos: Vec4,
    #[spirv(push_constant)] params: &HorizonPassParams,
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

    let value = eval_horizon(
        &sampler,
        pos.xy() / params.tile_size,
        params.azimuth_index,
        params.azimuth_count,
        params.quantization(),
        params.raymarch(),
    );

    *out = vec4(value, 0.0, 0.0, 1.0);
}
