use bytemuck::{Pod, Zeroable};

use crate::{HorizonQuantization, RaymarchParams, SoftShadow};

#[repr(C)]
#[derive(Copy, Clone, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct GradientPassParams {
    pub tile_size: f32,
    pub meters_per_pixel: f32,
    pub max_neighbor_offset: u32,

    /// Distance (in texels) between the samples central differences are
    /// computed from.
    pub sampling_distance: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct HorizonPassParams {
    pub tile_size: f32,
    pub meters_per_pixel: f32,
    pub max_neighbor_offset: u32,
    pub max_distance: f32,
    pub step_multiplier: f32,

    /// Bucket (and so array layer) being rendered.
    pub azimuth_index: u32,
    pub azimuth_count: u32,
    pub quantization_levels: u32,
    pub angle_min: f32,
    pub angle_max: f32,
}

impl HorizonPassParams {
    pub fn raymarch(&self) -> RaymarchParams {
        RaymarchParams {
            meters_per_pixel: self.meters_per_pixel,
            max_distance: self.max_distance,
            step_multiplier: self.step_multiplier,
        }
    }

    pub fn quantization(&self) -> HorizonQuantization {
        HorizonQuantization {
            levels: self.quantization_levels,
            angle_min: self.angle_min,
            angle_max: self.angle_max,
        }
    }
}

/// Parameters shared by the shadow and daylight passes.
///
/// Azimuths are measured clockwise from north, altitudes upwards from the
/// horizon; both in radians.
#[repr(C)]
#[derive(Copy, Clone, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct ShadowPassParams {
    pub tile_size: f32,
    pub meters_per_pixel: f32,
    pub max_neighbor_offset: u32,
    pub max_distance: f32,
    pub step_multiplier: f32,
    pub sample_count: u32,
    pub blur_radius: f32,
    pub visibility_threshold: f32,
    pub edge_softness: f32,
    pub max_opacity: f32,

    /// Used by the shadow pass only.
    pub sun_azimuth: f32,

    /// Used by the shadow pass only.
    pub sun_altitude: f32,

    /// Used by the daylight pass only; number of [`crate::DaylightSample`]s
    /// bound alongside.
    pub daylight_sample_count: u32,
}

impl ShadowPassParams {
    pub fn raymarch(&self) -> RaymarchParams {
        RaymarchParams {
            meters_per_pixel: self.meters_per_pixel,
            max_distance: self.max_distance,
            step_multiplier: self.step_multiplier,
        }
    }

    pub fn soft_shadow(&self) -> SoftShadow {
        SoftShadow {
            sample_count: self.sample_count,
            blur_radius: self.blur_radius,
            visibility_threshold: self.visibility_threshold,
            edge_softness: self.edge_softness,
        }
    }
}
