use umbra_gpu::prelude::*;

/// Covers the whole target with a single triangle; every pass of the engine is
/// a per-texel fragment shader drawn with it.
#[spirv(vertex)]
pub fn main(
    #[spirv(vertex_index)] vert_idx: i32,
    #[spirv(position)] output: &mut Vec4,
) {
    let uv = vec2(((vert_idx << 1) & 2) as f32, (vert_idx & 2) as f32);
    let pos = 2.0 * uv - Vec2::ONE;

    *output = pos.extend(0.0).extend(1.0);
}
