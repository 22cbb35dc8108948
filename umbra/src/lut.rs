use std::sync::Arc;

use log::debug;

use crate::gpu::{self, ExposureTable};
use crate::{CalendarDay, ExposureLutSettings, SunPositionProvider};

/// Identity of an exposure table; two requests with equal keys yield the very
/// same table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ExposureLutKey {
    pub day: CalendarDay,

    /// Latitude in units of 1e-4 degree.
    pub latitude: i64,

    /// Longitude in units of 1e-4 degree.
    pub longitude: i64,

    pub minutes_step: u32,
    pub azimuth_count: u32,
    pub quantization_levels: u32,
    pub angle_min: u32,
    pub angle_max: u32,
}

impl ExposureLutKey {
    pub fn new(settings: &ExposureLutSettings) -> Self {
        Self {
            day: settings.day,
            latitude: (settings.latitude * 1e4).round() as i64,
            longitude: (settings.longitude * 1e4).round() as i64,
            minutes_step: settings.minutes_step,
            azimuth_count: settings.azimuth_count,
            quantization_levels: settings.quantization_levels,
            angle_min: settings.angle_min.to_bits(),
            angle_max: settings.angle_max.to_bits(),
        }
    }
}

/// Solar exposure table: for each azimuth bucket and each horizon level, how
/// many minutes (over the day) the sun spends in that bucket above that
/// level.
#[derive(Clone, Debug, PartialEq)]
pub struct ExposureLut {
    key: ExposureLutKey,
    buckets: u32,
    levels: u32,
    minutes_above: Vec<f32>,
}

impl ExposureLut {
    pub fn build<S>(provider: &S, settings: &ExposureLutSettings) -> Self
    where
        S: SunPositionProvider + ?Sized,
    {
        let settings = settings.clamped();
        let buckets = settings.azimuth_count;
        let levels = settings.quantization_levels;
        let step = settings.minutes_step;

        let quantization = gpu::HorizonQuantization {
            levels,
            angle_min: settings.angle_min,
            angle_max: settings.angle_max,
        };

        debug!(
            "Building exposure table; day={:?}, lat={}, lon={}, step={}, \
             buckets={}, levels={}",
            settings.day,
            settings.latitude,
            settings.longitude,
            step,
            buckets,
            levels,
        );

        // Local mean midnight
        let midnight = -settings.longitude / 15.0 * 60.0;
        let mut histogram = vec![0u32; (buckets * levels) as usize];

        for tick in 0..(1440 / step) {
            let minutes = midnight + (tick * step) as f64;

            let sun = provider.sun_position(
                settings.day,
                minutes,
                settings.latitude,
                settings.longitude,
            );

            if sun.altitude <= settings.angle_min {
                continue;
            }

            let bucket = gpu::azimuth_bucket(sun.north_azimuth(), buckets);
            let level = quantization.quantize(sun.altitude);

            histogram[(bucket * levels + level) as usize] += 1;
        }

        let mut minutes_above = vec![0.0; histogram.len()];

        for bucket in 0..buckets as usize {
            let row = bucket * levels as usize;
            let mut acc = 0;

            for level in (0..levels as usize).rev() {
                acc += histogram[row + level];
                minutes_above[row + level] = (acc * step) as f32;
            }
        }

        Self {
            key: ExposureLutKey::new(&settings),
            buckets,
            levels,
            minutes_above,
        }
    }

    pub fn key(&self) -> &ExposureLutKey {
        &self.key
    }

    /// Flat, bucket-major table; the layout consuming shaders read it with
    /// (see [`gpu::ExposureSlice`]).
    pub fn as_slice(&self) -> &[f32] {
        &self.minutes_above
    }

    /// Total number of minutes the sun spends above the lowest level.
    pub fn daylight_minutes(&self) -> f32 {
        (0..self.buckets)
            .map(|bucket| self.minutes_above(bucket, 0))
            .sum()
    }

    /// Returns for how many minutes a texel with given horizon levels (one
    /// per bucket) is sunlit.
    pub fn sunlit_minutes(&self, horizon_levels: &[u32]) -> f32 {
        gpu::sunlit_minutes(self, |bucket| {
            horizon_levels.get(bucket as usize).copied().unwrap_or(0)
        })
    }
}

impl ExposureTable for ExposureLut {
    fn buckets(&self) -> u32 {
        self.buckets
    }

    fn levels(&self) -> u32 {
        self.levels
    }

    fn minutes_above(&self, bucket: u32, level: u32) -> f32 {
        self.minutes_above[(bucket * self.levels + level) as usize]
    }
}

/// Keeps the most recently built exposure table, rebuilding it only when the
/// key changes.
#[derive(Debug, Default)]
pub struct ExposureLutCache {
    entry: Option<Arc<ExposureLut>>,
}

impl ExposureLutCache {
    pub fn get_or_build<S>(
        &mut self,
        provider: &S,
        settings: &ExposureLutSettings,
    ) -> Arc<ExposureLut>
    where
        S: SunPositionProvider + ?Sized,
    {
        let key = ExposureLutKey::new(&settings.clamped());

        if let Some(entry) = &self.entry {
            if entry.key == key {
                return Arc::clone(entry);
            }
        }

        let lut = Arc::new(ExposureLut::build(provider, settings));

        self.entry = Some(Arc::clone(&lut));
        lut
    }

    pub fn get(&self) -> Option<&Arc<ExposureLut>> {
        self.entry.as_ref()
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use spirv_std::glam::uvec2;

    use super::*;
    use crate::gpu::{
        eval_horizon, unit_to_level, ElevationSampler, RaymarchParams,
        StitchedGrid,
    };
    use crate::{HorizonSettings, NoaaEphemeris};

    fn settings(lat: f64, day: CalendarDay) -> ExposureLutSettings {
        ExposureLutSettings::new(day, lat, 19.9, &HorizonSettings::default())
    }

    fn summer() -> CalendarDay {
        CalendarDay::new(2024, 6, 21).unwrap()
    }

    #[test]
    fn minutes_never_increase_with_level() {
        let lut = ExposureLut::build(&NoaaEphemeris, &settings(50.0, summer()));

        for bucket in 0..lut.buckets() {
            let first = lut.minutes_above(bucket, 0);
            let last = lut.minutes_above(bucket, lut.levels() - 1);

            assert!(first >= last);
            assert!(last >= 0.0);

            for level in 1..lut.levels() {
                assert!(
                    lut.minutes_above(bucket, level)
                        <= lut.minutes_above(bucket, level - 1)
                );
            }
        }
    }

    #[test]
    fn day_length() {
        let lut = ExposureLut::build(&NoaaEphemeris, &settings(0.0, summer()));
        let minutes = lut.daylight_minutes();

        // Days at the equator last about twelve hours
        assert!((690.0..=750.0).contains(&minutes), "minutes={minutes}");

        let lut = ExposureLut::build(&NoaaEphemeris, &settings(50.0, summer()));

        assert!(lut.daylight_minutes() > 900.0);
    }

    #[test]
    fn polar_night_has_no_sun() {
        let winter = CalendarDay::new(2024, 12, 21).unwrap();
        let lut = ExposureLut::build(&NoaaEphemeris, &settings(85.0, winter));

        assert!(lut.as_slice().iter().all(|minutes| *minutes == 0.0));
    }

    #[test]
    fn sunlit_minutes() {
        let lut = ExposureLut::build(&NoaaEphemeris, &settings(50.0, summer()));
        let levels = lut.levels();
        let buckets = lut.buckets() as usize;

        let open = lut.sunlit_minutes(&vec![0; buckets]);
        let walled = lut.sunlit_minutes(&vec![levels - 1; buckets]);
        let half = lut.sunlit_minutes(&vec![levels / 2; buckets]);

        assert_eq!(0.0, walled);
        assert!(open > half);
        assert!(half > walled);
        assert_relative_eq!(open, lut.daylight_minutes());
    }

    #[test]
    fn flat_tile_is_sunlit_all_day() {
        let horizon = HorizonSettings::default();

        let lut = ExposureLut::build(
            &NoaaEphemeris,
            &ExposureLutSettings::new(summer(), 50.0, 19.9, &horizon),
        );

        let grid = StitchedGrid::flat(16, 2, 250.0);
        let slots = gpu::slot_table(2);
        let sampler = ElevationSampler::new(&grid, &slots, 16.0, 2);

        let raymarch = RaymarchParams {
            meters_per_pixel: 30.0,
            max_distance: horizon.max_distance,
            step_multiplier: horizon.ray_step_multiplier,
        };

        let levels: Vec<_> = (0..horizon.azimuth_count)
            .map(|bucket| {
                let value = eval_horizon(
                    &sampler,
                    sampler.texel_to_pos(uvec2(5, 11)),
                    bucket,
                    horizon.azimuth_count,
                    horizon.quantization(),
                    raymarch,
                );

                unit_to_level(value, horizon.quantization_levels)
            })
            .collect();

        assert!(levels.iter().all(|level| *level == 0));
        assert!(lut.daylight_minutes() > 900.0);
        assert_relative_eq!(lut.daylight_minutes(), lut.sunlit_minutes(&levels));
    }

    #[test]
    fn cache_reuses_tables() {
        let mut cache = ExposureLutCache::default();
        let settings = settings(50.0, summer());

        let a = cache.get_or_build(&NoaaEphemeris, &settings);

        // Differences below the key's resolution don't matter
        let b = cache.get_or_build(
            &NoaaEphemeris,
            &ExposureLutSettings {
                latitude: settings.latitude + 1e-6,
                ..settings
            },
        );

        assert!(Arc::ptr_eq(&a, &b));

        let c = cache.get_or_build(
            &NoaaEphemeris,
            &ExposureLutSettings {
                quantization_levels: 8,
                ..settings
            },
        );

        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(8, c.levels());
    }
}
