use spirv_std::glam::{vec2, vec4, Vec2, Vec4};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{
    azimuth_direction, trace_visibility, ElevationSampler, ElevationSource,
    RaymarchParams, GOLDEN_ANGLE,
};

/// Upper bound for the number of rays averaged into a soft shadow.
pub const MAX_SHADOW_SAMPLES: u32 = 16;

#[derive(Clone, Copy)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct SoftShadow {
    pub sample_count: u32,

    /// Radius (in texels) of the disk ray origins are spread over.
    pub blur_radius: f32,

    /// Visibilities at or above this value are snapped to full visibility.
    pub visibility_threshold: f32,

    pub edge_softness: f32,
}

/// Returns offset (in texels) of the `idx`-th out of `count` ray origins,
/// spread over a golden-angle spiral of given radius.
pub fn spiral_offset(idx: u32, count: u32, radius: f32) -> Vec2 {
    if count <= 1 || radius <= 0.0 {
        return Vec2::ZERO;
    }

    let r = radius * ((idx as f32 + 0.5) / count as f32).sqrt();
    let theta = idx as f32 * GOLDEN_ANGLE;

    vec2(theta.cos(), theta.sin()) * r
}

/// Returns how visible the sun is from given position, averaged over the
/// soft-shadow rays.
///
/// Sun below (or at) the horizon is never visible.
pub fn sun_visibility<S>(
    sampler: &ElevationSampler<S>,
    pos: Vec2,
    sun_azimuth: f32,
    sun_altitude: f32,
    shadow: SoftShadow,
    params: RaymarchParams,
) -> f32
where
    S: ElevationSource,
{
    if sun_altitude <= 0.0 {
        return 0.0;
    }

    let count = shadow.sample_count.clamp(1, MAX_SHADOW_SAMPLES);
    let direction = azimuth_direction(sun_azimuth);
    let sun_slope = sun_altitude.tan();
    let mut sum = 0.0;
    let mut idx = 0;

    while idx < count {
        let origin = pos
            + spiral_offset(idx, count, shadow.blur_radius) / sampler.tile_size();

        sum += trace_visibility(
            sampler,
            origin,
            sampler.sample(origin),
            direction,
            params,
            sun_slope,
            shadow.edge_softness,
        );

        idx += 1;
    }

    let visibility = sum / count as f32;

    if visibility >= shadow.visibility_threshold {
        1.0
    } else {
        visibility
    }
}

/// Computes output of the shadow pass: `(visibility, alpha, 0, 1)`.
pub fn eval_shadow<S>(
    sampler: &ElevationSampler<S>,
    pos: Vec2,
    sun_azimuth: f32,
    sun_altitude: f32,
    shadow: SoftShadow,
    max_opacity: f32,
    params: RaymarchParams,
) -> Vec4
where
    S: ElevationSource,
{
    let visibility =
        sun_visibility(sampler, pos, sun_azimuth, sun_altitude, shadow, params);

    vec4(visibility, (1.0 - visibility) * max_opacity, 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use spirv_std::glam::uvec2;

    use super::*;
    use core::f32::consts::PI;

    use crate::{slot_table, StitchedGrid};

    const SHADOW: SoftShadow = SoftShadow {
        sample_count: 4,
        blur_radius: 1.0,
        visibility_threshold: 0.98,
        edge_softness: 0.05,
    };

    const PARAMS: RaymarchParams = RaymarchParams {
        meters_per_pixel: 10.0,
        max_distance: 3000.0,
        step_multiplier: 1.0,
    };

    #[test]
    fn spiral_stays_within_radius() {
        for idx in 0..16 {
            assert!(spiral_offset(idx, 16, 3.0).length() <= 3.0);
        }

        assert_eq!(Vec2::ZERO, spiral_offset(0, 1, 3.0));
        assert_eq!(Vec2::ZERO, spiral_offset(5, 16, 0.0));
    }

    #[test]
    fn flat_tile_is_fully_visible() {
        let grid = StitchedGrid::flat(32, 2, 250.0);
        let slots = slot_table(2);
        let sampler = ElevationSampler::new(&grid, &slots, 32.0, 2);

        for azimuth in [0.0, 0.3 * PI, PI, 1.7 * PI] {
            for altitude in [0.05, 0.4, 1.2] {
                for texel in [uvec2(0, 0), uvec2(16, 7), uvec2(31, 31)] {
                    let pos = sampler.texel_to_pos(texel);

                    let out = eval_shadow(
                        &sampler, pos, azimuth, altitude, SHADOW, 0.6, PARAMS,
                    );

                    assert_relative_eq!(1.0, out.x);
                    assert_relative_eq!(0.0, out.y);
                    assert_relative_eq!(1.0, out.w);
                }
            }
        }
    }

    #[test]
    fn sun_below_horizon_is_not_visible() {
        let grid = StitchedGrid::flat(16, 2, 0.0);
        let slots = slot_table(2);
        let sampler = ElevationSampler::new(&grid, &slots, 16.0, 2);

        let out = eval_shadow(
            &sampler,
            vec2(0.5, 0.5),
            PI,
            -0.1,
            SHADOW,
            0.6,
            PARAMS,
        );

        assert_relative_eq!(0.0, out.x);
        assert_relative_eq!(0.6, out.y);
    }

    #[test]
    fn spike_casts_shadow_away_from_the_sun() {
        // 400 m spike near the eastern edge of the tile, sun low in the east
        let grid = StitchedGrid::from_fn(32, 2, |x, y| {
            if (x - 27).abs() <= 3 && (y - 16).abs() <= 3 {
                400.0
            } else {
                0.0
            }
        });

        let slots = slot_table(2);
        let sampler = ElevationSampler::new(&grid, &slots, 32.0, 2);

        let visibility = |x: u32| {
            sun_visibility(
                &sampler,
                sampler.texel_to_pos(uvec2(x, 16)),
                0.5 * PI,
                0.2,
                SHADOW,
                PARAMS,
            )
        };

        // Behind the spike
        assert!(visibility(20) < 0.5);
        assert!(visibility(10) < 0.5);

        // In front of it
        assert_relative_eq!(1.0, visibility(31));
    }

    #[test]
    fn spike_in_neighbor_casts_shadow_into_the_tile() {
        // Spike sits in the eastern neighbor, tile itself is flat
        let grid = StitchedGrid::from_fn(32, 2, |x, y| {
            if (x - 40).abs() <= 3 && (y - 16).abs() <= 3 {
                400.0
            } else {
                0.0
            }
        });

        let slots = slot_table(2);
        let sampler = ElevationSampler::new(&grid, &slots, 32.0, 2);
        let pos = sampler.texel_to_pos(uvec2(28, 16));

        let towards_spike =
            sun_visibility(&sampler, pos, 0.5 * PI, 0.2, SHADOW, PARAMS);

        let away_from_spike =
            sun_visibility(&sampler, pos, 1.5 * PI, 0.2, SHADOW, PARAMS);

        assert!(towards_spike < 0.5);
        assert_relative_eq!(1.0, away_from_spike);
    }
}
