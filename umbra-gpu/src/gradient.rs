use spirv_std::glam::{vec2, vec4, Vec2, Vec4};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{ElevationSampler, ElevationSource, F32Ext, UMBRA_EPSILON};

/// Computes output of the gradient pass: `(dz/dx, dz/dy, slope, aspect)`.
///
/// Derivatives are central differences taken `sampling_distance` texels apart
/// (`+x` east, `+y` south), so they reach across tile borders. Slope is the
/// angle against the horizontal plane; aspect is the direction the terrain
/// faces, clockwise from north. Both are in radians.
pub fn eval_gradient<S>(
    sampler: &ElevationSampler<S>,
    pos: Vec2,
    sampling_distance: f32,
    meters_per_pixel: f32,
) -> Vec4
where
    S: ElevationSource,
{
    let distance = sampling_distance.max(UMBRA_EPSILON);
    let dx = vec2(distance / sampler.tile_size(), 0.0);
    let dy = vec2(0.0, distance / sampler.tile_size());
    let run = 2.0 * distance * meters_per_pixel.max(UMBRA_EPSILON);

    let dzdx = (sampler.sample(pos + dx) - sampler.sample(pos - dx)) / run;
    let dzdy = (sampler.sample(pos + dy) - sampler.sample(pos - dy)) / run;

    let slope = (dzdx * dzdx + dzdy * dzdy).sqrt().atan();

    let aspect = if dzdx.abs() < UMBRA_EPSILON && dzdy.abs() < UMBRA_EPSILON {
        0.0
    } else {
        (-dzdx).atan2(dzdy).wrap_angle()
    };

    vec4(dzdx, dzdy, slope, aspect)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use spirv_std::glam::uvec2;

    use super::*;
    use core::f32::consts::PI;

    use crate::{slot_table, StitchedGrid};

    #[test]
    fn flat() {
        let grid = StitchedGrid::flat(16, 2, 42.0);
        let slots = slot_table(2);
        let sampler = ElevationSampler::new(&grid, &slots, 16.0, 2);

        let out = eval_gradient(&sampler, vec2(0.5, 0.5), 1.0, 10.0);

        assert_eq!(vec4(0.0, 0.0, 0.0, 0.0), out);
    }

    #[test]
    fn eastward_ramp_faces_west() {
        // 10 m per 10 m texel; i.e. 45°
        let grid = StitchedGrid::from_fn(16, 2, |x, _| x as f32 * 10.0);
        let slots = slot_table(2);
        let sampler = ElevationSampler::new(&grid, &slots, 16.0, 2);

        for x in [0, 7, 15] {
            let pos = sampler.texel_to_pos(uvec2(x, 3));
            let out = eval_gradient(&sampler, pos, 1.0, 10.0);

            assert_relative_eq!(1.0, out.x, epsilon = 1e-4);
            assert_relative_eq!(0.0, out.y, epsilon = 1e-4);
            assert_relative_eq!(0.25 * PI, out.z, epsilon = 1e-4);
            assert_relative_eq!(1.5 * PI, out.w, epsilon = 1e-4);
        }
    }

    #[test]
    fn southward_ramp_faces_north() {
        let grid = StitchedGrid::from_fn(16, 2, |_, y| y as f32 * 5.0);
        let slots = slot_table(2);
        let sampler = ElevationSampler::new(&grid, &slots, 16.0, 2);

        let out = eval_gradient(&sampler, vec2(0.5, 0.5), 2.0, 10.0);

        assert_relative_eq!(0.5, out.y, epsilon = 1e-4);
        assert_relative_eq!(0.0, out.w, epsilon = 1e-4);
    }
}
