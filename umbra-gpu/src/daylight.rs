use bytemuck::{Pod, Zeroable};
use spirv_std::glam::{vec4, Vec2, Vec4};

use crate::{
    sun_visibility, ElevationSampler, ElevationSource, RaymarchParams,
    SoftShadow, UMBRA_EPSILON,
};

/// Upper bound for the number of sun samples a day is approximated with.
pub const MAX_DAYLIGHT_SAMPLES: u32 = 16;

/// Sun's position at some moment of the day, along with the weight of that
/// moment.
#[repr(C)]
#[derive(Copy, Clone, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct DaylightSample {
    /// Clockwise from north, in radians.
    pub azimuth: f32,

    /// Upwards from the horizon, in radians.
    pub altitude: f32,

    pub weight: f32,

    /// Minutes since midnight (UTC); informational only.
    pub time: f32,
}

/// Computes output of the daylight pass:
/// `(sum(visibility * weight), sum(weight), ratio, 1)`.
///
/// Samples with the sun at or below the horizon contribute their weight but
/// no visibility.
pub fn eval_daylight<S>(
    sampler: &ElevationSampler<S>,
    pos: Vec2,
    samples: &[DaylightSample],
    sample_count: u32,
    shadow: SoftShadow,
    params: RaymarchParams,
) -> Vec4
where
    S: ElevationSource,
{
    let count = sample_count.min(MAX_DAYLIGHT_SAMPLES);
    let mut lit = 0.0;
    let mut total = 0.0;
    let mut idx = 0;

    while idx < count {
        let sample = samples[idx as usize];

        let visibility = sun_visibility(
            sampler,
            pos,
            sample.azimuth,
            sample.altitude,
            shadow,
            params,
        );

        lit += visibility * sample.weight;
        total += sample.weight;
        idx += 1;
    }

    let ratio = if total > UMBRA_EPSILON {
        lit / total
    } else {
        0.0
    };

    vec4(lit, total, ratio, 1.0)
}
