use std::f32::consts::PI;

use crate::gpu::{self, DaylightSample};
use crate::{CalendarDay, SunPosition};

/// Kind of data the engine precomputes for a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mode {
    Shadow,
    Daylight,
    Horizon,
    Gradient,
}

impl Mode {
    pub const ALL: [Self; 4] =
        [Self::Shadow, Self::Daylight, Self::Horizon, Self::Gradient];

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Shadow => "shadow",
            Mode::Daylight => "daylight",
            Mode::Horizon => "horizon",
            Mode::Gradient => "gradient",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    /// How many rings of neighbors each tile borrows elevation from.
    pub max_neighbor_offset: u32,
}

impl EngineConfig {
    pub fn clamped(self) -> Self {
        Self {
            max_neighbor_offset: self
                .max_neighbor_offset
                .min(gpu::MAX_NEIGHBOR_OFFSET_LIMIT),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_neighbor_offset: gpu::DEFAULT_MAX_NEIGHBOR_OFFSET,
        }
    }
}

/// Settings of the shadow and daylight passes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowSettings {
    /// Number of rays averaged into a soft shadow; `1..=16`.
    pub sample_count: u32,

    /// Radius (in texels) over which the rays' origins are spread.
    pub blur_radius: f32,

    /// How far (in meters) rays travel.
    pub max_distance: f32,

    /// Visibilities at or above this value count as fully lit.
    pub visibility_threshold: f32,

    /// How quickly visibility fades once terrain rises above the sun, in
    /// slope units.
    pub edge_softness: f32,

    /// Opacity of a fully shadowed texel.
    pub max_opacity: f32,

    /// Larger values march rays with finer steps.
    pub ray_step_multiplier: f32,
}

impl ShadowSettings {
    pub fn clamped(self) -> Self {
        Self {
            sample_count: self.sample_count.clamp(1, gpu::MAX_SHADOW_SAMPLES),
            blur_radius: finite_or(self.blur_radius, 0.0).clamp(0.0, 16.0),
            max_distance: finite_or(self.max_distance, 0.0).clamp(0.0, 200_000.0),
            visibility_threshold: finite_or(self.visibility_threshold, 1.0)
                .clamp(0.0, 1.0),
            edge_softness: finite_or(self.edge_softness, 0.05).clamp(1e-4, 10.0),
            max_opacity: finite_or(self.max_opacity, 1.0).clamp(0.0, 1.0),
            ray_step_multiplier: finite_or(self.ray_step_multiplier, 1.0)
                .clamp(0.1, 16.0),
        }
    }

    pub(crate) fn soft_shadow(&self) -> gpu::SoftShadow {
        gpu::SoftShadow {
            sample_count: self.sample_count,
            blur_radius: self.blur_radius,
            visibility_threshold: self.visibility_threshold,
            edge_softness: self.edge_softness,
        }
    }
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            sample_count: 4,
            blur_radius: 1.0,
            max_distance: 20_000.0,
            visibility_threshold: 0.98,
            edge_softness: 0.05,
            max_opacity: 0.6,
            ray_step_multiplier: 1.0,
        }
    }
}

/// Settings of horizon tables (and of exposure tables built for them).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HorizonSettings {
    /// Number of azimuth buckets (and so texture layers); `1..=64`.
    pub azimuth_count: u32,

    /// Number of levels horizon angles get quantized into; at least 2.
    pub quantization_levels: u32,

    /// Lowest representable horizon angle, in radians.
    pub angle_min: f32,

    /// Highest representable horizon angle, in radians.
    pub angle_max: f32,

    pub max_distance: f32,
    pub ray_step_multiplier: f32,
}

impl HorizonSettings {
    pub fn clamped(self) -> Self {
        let angle_min = finite_or(self.angle_min, 0.0).clamp(-0.5 * PI, 0.5 * PI);

        let angle_max = finite_or(self.angle_max, 0.5 * PI)
            .clamp(angle_min + 1e-3, 0.5 * PI + 1e-3);

        Self {
            azimuth_count: self.azimuth_count.clamp(1, gpu::MAX_AZIMUTH_COUNT),
            quantization_levels: self
                .quantization_levels
                .clamp(gpu::MIN_QUANTIZATION_LEVELS, 256),
            angle_min,
            angle_max,
            max_distance: finite_or(self.max_distance, 0.0).clamp(0.0, 200_000.0),
            ray_step_multiplier: finite_or(self.ray_step_multiplier, 1.0)
                .clamp(0.1, 16.0),
        }
    }

    pub fn quantization(&self) -> gpu::HorizonQuantization {
        gpu::HorizonQuantization {
            levels: self.quantization_levels,
            angle_min: self.angle_min,
            angle_max: self.angle_max,
        }
    }
}

impl Default for HorizonSettings {
    fn default() -> Self {
        Self {
            azimuth_count: gpu::DEFAULT_AZIMUTH_COUNT,
            quantization_levels: 16,
            angle_min: 0.0,
            angle_max: 0.5 * PI,
            max_distance: 20_000.0,
            ray_step_multiplier: 1.0,
        }
    }
}

/// Settings of the gradient pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientSettings {
    /// Distance (in texels) between samples the derivatives are computed
    /// from.
    pub sampling_distance: f32,
}

impl GradientSettings {
    pub fn clamped(self) -> Self {
        Self {
            sampling_distance: finite_or(self.sampling_distance, 1.0)
                .clamp(0.5, 16.0),
        }
    }
}

impl Default for GradientSettings {
    fn default() -> Self {
        Self {
            sampling_distance: 1.0,
        }
    }
}

/// Settings of a solar exposure table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExposureLutSettings {
    pub day: CalendarDay,

    /// In degrees.
    pub latitude: f64,

    /// In degrees.
    pub longitude: f64,

    /// How often (in minutes) the sun's position gets sampled.
    pub minutes_step: u32,

    pub azimuth_count: u32,
    pub quantization_levels: u32,
    pub angle_min: f32,
    pub angle_max: f32,
}

impl ExposureLutSettings {
    /// Creates settings matching the layout of horizon tables built with
    /// given settings.
    pub fn new(
        day: CalendarDay,
        latitude: f64,
        longitude: f64,
        horizon: &HorizonSettings,
    ) -> Self {
        Self {
            day,
            latitude,
            longitude,
            minutes_step: 10,
            azimuth_count: horizon.azimuth_count,
            quantization_levels: horizon.quantization_levels,
            angle_min: horizon.angle_min,
            angle_max: horizon.angle_max,
        }
    }

    pub fn clamped(self) -> Self {
        let horizon = HorizonSettings {
            azimuth_count: self.azimuth_count,
            quantization_levels: self.quantization_levels,
            angle_min: self.angle_min,
            angle_max: self.angle_max,
            ..Default::default()
        }
        .clamped();

        Self {
            day: self.day,
            latitude: finite_or(self.latitude, 0.0).clamp(-90.0, 90.0),
            longitude: finite_or(self.longitude, 0.0).clamp(-180.0, 180.0),
            minutes_step: self.minutes_step.clamp(1, 240),
            azimuth_count: horizon.azimuth_count,
            quantization_levels: horizon.quantization_levels,
            angle_min: horizon.angle_min,
            angle_max: horizon.angle_max,
        }
    }
}

/// Position of the sun for the shadow pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunParams {
    /// Clockwise from north, in radians.
    pub azimuth: f32,

    /// Upwards from the horizon, in radians.
    pub altitude: f32,
}

impl SunParams {
    /// Converts a position reported by a [`crate::SunPositionProvider`].
    pub fn from_position(position: SunPosition) -> Self {
        Self {
            azimuth: position.north_azimuth(),
            altitude: position.altitude,
        }
    }

    pub fn clamped(self) -> Self {
        Self {
            azimuth: finite_or(self.azimuth, 0.0).rem_euclid(2.0 * PI),
            altitude: finite_or(self.altitude, 0.0).clamp(-0.5 * PI, 0.5 * PI),
        }
    }
}

impl Default for SunParams {
    fn default() -> Self {
        Self {
            azimuth: 0.75 * PI,
            altitude: 0.25 * PI,
        }
    }
}

/// Sun samples a day gets approximated with in the daylight pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DaylightParams {
    pub samples: Vec<DaylightSample>,
}

impl DaylightParams {
    pub fn clamped(mut self) -> Self {
        self.samples.truncate(gpu::MAX_DAYLIGHT_SAMPLES as usize);

        for sample in &mut self.samples {
            sample.azimuth = finite_or(sample.azimuth, 0.0).rem_euclid(2.0 * PI);
            sample.altitude = finite_or(sample.altitude, 0.0);
            sample.weight = finite_or(sample.weight, 0.0).max(0.0);
        }

        self
    }
}

/// What to precompute during [`crate::Engine::prepare()`].
#[derive(Clone, Debug, PartialEq)]
pub enum PassRequest {
    Gradient(GradientSettings),

    Shadow {
        sun: SunParams,
        shadow: ShadowSettings,
    },

    Daylight {
        daylight: DaylightParams,
        shadow: ShadowSettings,
    },

    Horizon(HorizonSettings),
}

impl PassRequest {
    pub fn mode(&self) -> Mode {
        match self {
            PassRequest::Gradient(_) => Mode::Gradient,
            PassRequest::Shadow { .. } => Mode::Shadow,
            PassRequest::Daylight { .. } => Mode::Daylight,
            PassRequest::Horizon(_) => Mode::Horizon,
        }
    }

    pub fn clamped(self) -> Self {
        match self {
            PassRequest::Gradient(settings) => {
                PassRequest::Gradient(settings.clamped())
            }

            PassRequest::Shadow { sun, shadow } => PassRequest::Shadow {
                sun: sun.clamped(),
                shadow: shadow.clamped(),
            },

            PassRequest::Daylight { daylight, shadow } => PassRequest::Daylight {
                daylight: daylight.clamped(),
                shadow: shadow.clamped(),
            },

            PassRequest::Horizon(settings) => {
                PassRequest::Horizon(settings.clamped())
            }
        }
    }
}

fn finite_or<T>(value: T, fallback: T) -> T
where
    T: Into<f64> + Copy,
{
    if value.into().is_finite() {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_clamping() {
        assert_eq!(ShadowSettings::default(), ShadowSettings::default().clamped());
        assert_eq!(HorizonSettings::default(), HorizonSettings::default().clamped());
        assert_eq!(EngineConfig::default(), EngineConfig::default().clamped());
    }

    #[test]
    fn shadow_settings_are_clamped() {
        let settings = ShadowSettings {
            sample_count: 100,
            visibility_threshold: f32::NAN,
            max_opacity: 3.0,
            ..Default::default()
        }
        .clamped();

        assert_eq!(16, settings.sample_count);
        assert_eq!(1.0, settings.visibility_threshold);
        assert_eq!(1.0, settings.max_opacity);
    }

    #[test]
    fn horizon_settings_are_clamped() {
        let settings = HorizonSettings {
            azimuth_count: 1000,
            quantization_levels: 1,
            angle_min: 1.0,
            angle_max: 0.5,
            ..Default::default()
        }
        .clamped();

        assert_eq!(64, settings.azimuth_count);
        assert_eq!(2, settings.quantization_levels);
        assert!(settings.angle_max > settings.angle_min);
    }

    #[test]
    fn daylight_is_limited_to_sixteen_samples() {
        let daylight = DaylightParams {
            samples: vec![Default::default(); 40],
        }
        .clamped();

        assert_eq!(16, daylight.samples.len());
    }
}
