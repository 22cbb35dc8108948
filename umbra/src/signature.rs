use std::fmt;

use crate::{Mode, PassRequest, ShadowSettings};

/// Everything a tile's precomputed data depends on; cached data is reused only
/// when its signature equals the one computed for the current request.
///
/// Floats are compared (and hashed) by their bit patterns.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub mode: Mode,
    pub tile_size: u32,
    pub max_neighbor_offset: u32,
    pub dem_uid: u64,

    /// Per slot (starting at 1), raster of the neighbor stitched in there;
    /// `None` when the origin tile got stitched in instead.
    pub neighbor_uids: Vec<Option<u64>>,

    pub fallback: bool,
    pub version: u64,
    pub pass: PassKey,
}

/// Output-affecting parameters of a single pass.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PassKey {
    Gradient {
        sampling_distance: u32,
    },

    Shadow {
        sun_azimuth: u32,
        sun_altitude: u32,
        shadow: ShadowKey,
    },

    Daylight {
        /// `[azimuth, altitude, weight]` per sample.
        samples: Vec<[u32; 3]>,
        shadow: ShadowKey,
    },

    Horizon {
        azimuth_count: u32,
        quantization_levels: u32,
        angle_min: u32,
        angle_max: u32,
        max_distance: u32,
        ray_step_multiplier: u32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShadowKey {
    pub sample_count: u32,
    pub blur_radius: u32,
    pub max_distance: u32,
    pub visibility_threshold: u32,
    pub edge_softness: u32,
    pub max_opacity: u32,
    pub ray_step_multiplier: u32,
}

impl ShadowKey {
    pub fn new(shadow: &ShadowSettings) -> Self {
        Self {
            sample_count: shadow.sample_count,
            blur_radius: shadow.blur_radius.to_bits(),
            max_distance: shadow.max_distance.to_bits(),
            visibility_threshold: shadow.visibility_threshold.to_bits(),
            edge_softness: shadow.edge_softness.to_bits(),
            max_opacity: shadow.max_opacity.to_bits(),
            ray_step_multiplier: shadow.ray_step_multiplier.to_bits(),
        }
    }
}

impl PassKey {
    /// Expects an already clamped request.
    pub fn new(request: &PassRequest) -> Self {
        match request {
            PassRequest::Gradient(settings) => PassKey::Gradient {
                sampling_distance: settings.sampling_distance.to_bits(),
            },

            PassRequest::Shadow { sun, shadow } => PassKey::Shadow {
                sun_azimuth: sun.azimuth.to_bits(),
                sun_altitude: sun.altitude.to_bits(),
                shadow: ShadowKey::new(shadow),
            },

            PassRequest::Daylight { daylight, shadow } => PassKey::Daylight {
                samples: daylight
                    .samples
                    .iter()
                    .map(|sample| {
                        [
                            sample.azimuth.to_bits(),
                            sample.altitude.to_bits(),
                            sample.weight.to_bits(),
                        ]
                    })
                    .collect(),
                shadow: ShadowKey::new(shadow),
            },

            PassRequest::Horizon(settings) => PassKey::Horizon {
                azimuth_count: settings.azimuth_count,
                quantization_levels: settings.quantization_levels,
                angle_min: settings.angle_min.to_bits(),
                angle_max: settings.angle_max.to_bits(),
                max_distance: settings.max_distance.to_bits(),
                ray_step_multiplier: settings.ray_step_multiplier.to_bits(),
            },
        }
    }
}

/// Canonical text form, e.g. for logs:
///
/// `shadow;ts=256;mno=2;dem=2a;nb=2b,-,...;fb=0;v=0;sun=...;sh=...`
impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};ts={};mno={};dem={:x};nb=",
            self.mode.name(),
            self.tile_size,
            self.max_neighbor_offset,
            self.dem_uid,
        )?;

        for (idx, uid) in self.neighbor_uids.iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }

            match uid {
                Some(uid) => write!(f, "{uid:x}")?,
                None => write!(f, "-")?,
            }
        }

        write!(f, ";fb={};v={};", self.fallback as u8, self.version)?;

        match &self.pass {
            PassKey::Gradient { sampling_distance } => {
                write!(f, "sd={sampling_distance:08x}")
            }

            PassKey::Shadow {
                sun_azimuth,
                sun_altitude,
                shadow,
            } => {
                write!(f, "sun={sun_azimuth:08x},{sun_altitude:08x};{shadow}")
            }

            PassKey::Daylight { samples, shadow } => {
                write!(f, "dl=")?;

                for (idx, [azimuth, altitude, weight]) in
                    samples.iter().enumerate()
                {
                    if idx > 0 {
                        write!(f, ",")?;
                    }

                    write!(f, "{azimuth:08x}:{altitude:08x}:{weight:08x}")?;
                }

                write!(f, ";{shadow}")
            }

            PassKey::Horizon {
                azimuth_count,
                quantization_levels,
                angle_min,
                angle_max,
                max_distance,
                ray_step_multiplier,
            } => write!(
                f,
                "az={azimuth_count};ql={quantization_levels};\
                 am={angle_min:08x},{angle_max:08x};\
                 md={max_distance:08x};rs={ray_step_multiplier:08x}"
            ),
        }
    }
}

impl fmt::Display for ShadowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sh={},{:08x},{:08x},{:08x},{:08x},{:08x},{:08x}",
            self.sample_count,
            self.blur_radius,
            self.max_distance,
            self.visibility_threshold,
            self.edge_softness,
            self.max_opacity,
            self.ray_step_multiplier,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::DaylightSample;
    use crate::{
        DaylightParams, GradientSettings, HorizonSettings, SunParams,
    };

    fn signature(request: PassRequest) -> Signature {
        Signature {
            mode: request.mode(),
            tile_size: 256,
            max_neighbor_offset: 2,
            dem_uid: 42,
            neighbor_uids: vec![Some(43), None, Some(45)],
            fallback: false,
            version: 0,
            pass: PassKey::new(&request.clamped()),
        }
    }

    fn shadow(sun: SunParams, shadow: ShadowSettings) -> PassRequest {
        PassRequest::Shadow { sun, shadow }
    }

    #[test]
    fn equal_parameters_yield_equal_signatures() {
        let a = signature(shadow(SunParams::default(), Default::default()));
        let b = signature(shadow(SunParams::default(), Default::default()));

        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn no_collisions() {
        let base = signature(shadow(SunParams::default(), Default::default()));

        let daylight = |weight: f32| PassRequest::Daylight {
            daylight: DaylightParams {
                samples: vec![DaylightSample {
                    azimuth: 1.0,
                    altitude: 0.5,
                    weight,
                    time: 0.0,
                }],
            },
            shadow: Default::default(),
        };

        let variants = vec![
            base.clone(),
            signature(shadow(
                SunParams {
                    azimuth: 1.0,
                    ..Default::default()
                },
                Default::default(),
            )),
            signature(shadow(
                SunParams::default(),
                ShadowSettings {
                    sample_count: 8,
                    ..Default::default()
                },
            )),
            signature(shadow(
                SunParams::default(),
                ShadowSettings {
                    edge_softness: 0.1,
                    ..Default::default()
                },
            )),
            signature(daylight(10.0)),
            signature(daylight(20.0)),
            signature(PassRequest::Gradient(GradientSettings::default())),
            signature(PassRequest::Horizon(HorizonSettings::default())),
            signature(PassRequest::Horizon(HorizonSettings {
                azimuth_count: 16,
                ..Default::default()
            })),
            Signature {
                tile_size: 512,
                ..base.clone()
            },
            Signature {
                dem_uid: 1,
                ..base.clone()
            },
            Signature {
                neighbor_uids: vec![Some(43), Some(44), Some(45)],
                ..base.clone()
            },
            Signature {
                fallback: true,
                ..base.clone()
            },
            Signature {
                version: 1,
                ..base.clone()
            },
            Signature {
                max_neighbor_offset: 1,
                ..base
            },
        ];

        let count = variants.len();
        let mut texts: Vec<_> = variants.iter().map(|s| s.to_string()).collect();

        texts.sort();
        texts.dedup();

        assert_eq!(count, texts.len());

        for (idx, a) in variants.iter().enumerate() {
            for b in &variants[(idx + 1)..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn text_form() {
        let signature =
            signature(PassRequest::Gradient(GradientSettings::default()));

        assert_eq!(
            "gradient;ts=256;mno=2;dem=2a;nb=2b,-,2d;fb=0;v=0;sd=3f800000",
            signature.to_string()
        );
    }
}
