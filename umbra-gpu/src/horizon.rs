use spirv_std::glam::{vec2, Vec2};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use core::f32::consts::PI;

use crate::{
    trace_max_slope, ElevationSampler, ElevationSource, F32Ext, RaymarchParams,
};

/// Upper bound for the number of azimuth buckets of a horizon table.
pub const MAX_AZIMUTH_COUNT: u32 = 64;

pub const DEFAULT_AZIMUTH_COUNT: u32 = 32;

/// Lower bound for the number of quantization levels.
pub const MIN_QUANTIZATION_LEVELS: u32 = 2;

/// Returns azimuth (in radians, clockwise from north) of given bucket.
pub fn bucket_azimuth(bucket: u32, azimuth_count: u32) -> f32 {
    2.0 * PI * (bucket as f32) / (azimuth_count.max(1) as f32)
}

/// Returns bucket the given azimuth (clockwise from north) falls into.
///
/// Buckets are centered around [`bucket_azimuth()`], so that e.g. with four
/// buckets everything within 45° of north lands in bucket zero.
pub fn azimuth_bucket(azimuth: f32, azimuth_count: u32) -> u32 {
    let count = azimuth_count.max(1);
    let bucket = (azimuth.wrap_angle() / (2.0 * PI) * count as f32).round() as u32;

    bucket % count
}

/// Returns direction (in tile space, `+y` being south) of given azimuth,
/// measured clockwise from north.
pub fn azimuth_direction(azimuth: f32) -> Vec2 {
    vec2(azimuth.sin(), -azimuth.cos())
}

/// Maps an angle (in radians) onto `<0, 1>` within given range.
pub fn normalize_angle(angle: f32, angle_min: f32, angle_max: f32) -> f32 {
    let range = angle_max - angle_min;

    if range <= 0.0 {
        return 0.0;
    }

    ((angle - angle_min) / range).saturate()
}

/// Quantizes an angle (in radians) into one of `levels` levels spanning
/// `<angle_min, angle_max>`.
pub fn quantize_angle(
    angle: f32,
    angle_min: f32,
    angle_max: f32,
    levels: u32,
) -> u32 {
    let levels = levels.max(MIN_QUANTIZATION_LEVELS);
    let n = normalize_angle(angle, angle_min, angle_max);

    ((n * (levels - 1) as f32).round() as u32).min(levels - 1)
}

/// Inverse of [`quantize_angle()`]: returns the angle a level stands for.
pub fn dequantize_angle(
    level: u32,
    angle_min: f32,
    angle_max: f32,
    levels: u32,
) -> f32 {
    angle_min + (angle_max - angle_min) * level_to_unit(level, levels)
}

/// Converts a level into the value stored in the horizon texture.
pub fn level_to_unit(level: u32, levels: u32) -> f32 {
    let levels = levels.max(MIN_QUANTIZATION_LEVELS);

    (level.min(levels - 1) as f32) / ((levels - 1) as f32)
}

/// Converts a value read from the horizon texture back into a level.
pub fn unit_to_level(value: f32, levels: u32) -> u32 {
    let levels = levels.max(MIN_QUANTIZATION_LEVELS);

    ((value.saturate() * (levels - 1) as f32).round() as u32).min(levels - 1)
}

#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct HorizonQuantization {
    pub levels: u32,
    pub angle_min: f32,
    pub angle_max: f32,
}

impl HorizonQuantization {
    pub fn quantize(&self, angle: f32) -> u32 {
        quantize_angle(angle, self.angle_min, self.angle_max, self.levels)
    }

    pub fn dequantize(&self, level: u32) -> f32 {
        dequantize_angle(level, self.angle_min, self.angle_max, self.levels)
    }

    /// Largest difference between an angle (within range) and its
    /// dequantized level.
    pub fn max_error(&self) -> f32 {
        (self.angle_max - self.angle_min)
            / (self.levels.max(MIN_QUANTIZATION_LEVELS) - 1) as f32
    }
}

/// Computes the horizon angle (in radians) seen from given position towards
/// given azimuth.
pub fn horizon_angle<S>(
    sampler: &ElevationSampler<S>,
    pos: Vec2,
    azimuth: f32,
    params: RaymarchParams,
) -> f32
where
    S: ElevationSource,
{
    let h0 = sampler.sample(pos);
    let slope =
        trace_max_slope(sampler, pos, h0, azimuth_direction(azimuth), params);

    slope.atan()
}

/// Computes the value stored in a horizon table for given texel and bucket.
pub fn eval_horizon<S>(
    sampler: &ElevationSampler<S>,
    pos: Vec2,
    bucket: u32,
    azimuth_count: u32,
    quantization: HorizonQuantization,
    params: RaymarchParams,
) -> f32
where
    S: ElevationSource,
{
    let azimuth = bucket_azimuth(bucket, azimuth_count);
    let angle = horizon_angle(sampler, pos, azimuth, params);

    level_to_unit(quantization.quantize(angle), quantization.levels)
}
