use crate::gpu::{self, DaylightSample};
use crate::{CalendarDay, DaylightParams, SunPositionProvider};

/// Approximates a day with a handful of weighted sun positions.
///
/// The day (from local mean midnight) is sampled every `minutes_step`
/// minutes; ticks with the sun above the horizon are then split into up to
/// `max_samples` contiguous groups, each represented by the sun's position in
/// its middle and weighted by the minutes it covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DaylightPlanner {
    pub max_samples: u32,
    pub minutes_step: u32,
}

impl DaylightPlanner {
    pub fn plan<S>(
        &self,
        provider: &S,
        day: CalendarDay,
        latitude: f64,
        longitude: f64,
    ) -> DaylightParams
    where
        S: SunPositionProvider + ?Sized,
    {
        let step = self.minutes_step.clamp(1, 240);
        let max_samples = self.max_samples.clamp(1, gpu::MAX_DAYLIGHT_SAMPLES);
        let midnight = -longitude / 15.0 * 60.0;

        let ticks: Vec<_> = (0..(1440 / step))
            .map(|tick| midnight + (tick * step) as f64)
            .filter_map(|minutes| {
                let sun =
                    provider.sun_position(day, minutes, latitude, longitude);

                (sun.altitude > 0.0).then_some((minutes, sun))
            })
            .collect();

        if ticks.is_empty() {
            return DaylightParams::default();
        }

        let groups = (max_samples as usize).min(ticks.len());

        let samples = (0..groups)
            .map(|group| {
                let start = group * ticks.len() / groups;
                let end = (group + 1) * ticks.len() / groups;
                let (minutes, sun) = ticks[(start + end) / 2];

                DaylightSample {
                    azimuth: sun.north_azimuth(),
                    altitude: sun.altitude,
                    weight: ((end - start) as u32 * step) as f32,
                    time: minutes as f32,
                }
            })
            .collect();

        DaylightParams { samples }
    }
}

impl Default for DaylightPlanner {
    fn default() -> Self {
        Self {
            max_samples: gpu::MAX_DAYLIGHT_SAMPLES,
            minutes_step: 10,
        }
    }
}
