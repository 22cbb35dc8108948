//! Sun's position in the sky.
//!
//! The engine doesn't care where positions come from, as long as they're
//! reported through [`SunPositionProvider`]; [`NoaaEphemeris`] is the default
//! provider, based on NOAA's solar calculator.

use std::f64::consts::PI;

use crate::{Error, Result};

/// Day of the (proleptic Gregorian) calendar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarDay {
    year: i32,
    month: u32,
    day: u32,
}

impl CalendarDay {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        let days_in_month = match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if Self::is_leap_year(year) => 29,
            2 => 28,
            _ => 0,
        };

        if day == 0 || day > days_in_month {
            return Err(Error::InvalidDate { year, month, day });
        }

        Ok(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn is_leap_year(year: i32) -> bool {
        (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
    }

    /// Julian day at given number of minutes past this day's UTC midnight
    /// (which may be negative or exceed a day).
    pub fn julian_day(&self, utc_minutes: f64) -> f64 {
        let (y, m) = if self.month <= 2 {
            (self.year - 1, self.month + 12)
        } else {
            (self.year, self.month)
        };

        let a = (y as f64 / 100.0).floor();
        let b = 2.0 - a + (a / 4.0).floor();

        (365.25 * (y as f64 + 4716.0)).floor()
            + (30.6001 * (m as f64 + 1.0)).floor()
            + self.day as f64
            + utc_minutes / 1440.0
            + b
            - 1524.5
    }
}

/// Position of the sun, as reported by a [`SunPositionProvider`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunPosition {
    /// Measured from south, positive westward; in radians.
    pub azimuth: f32,

    /// Upwards from the horizon; in radians.
    pub altitude: f32,
}

impl SunPosition {
    /// Azimuth measured clockwise from north, in `<0, 2*PI)`; the convention
    /// used everywhere else in the engine.
    pub fn north_azimuth(&self) -> f32 {
        (self.azimuth + std::f32::consts::PI).rem_euclid(2.0 * std::f32::consts::PI)
    }
}

pub trait SunPositionProvider {
    /// Returns position of the sun as seen from given place (degrees) at
    /// given number of minutes past the day's UTC midnight.
    fn sun_position(
        &self,
        day: CalendarDay,
        utc_minutes: f64,
        latitude: f64,
        longitude: f64,
    ) -> SunPosition;
}

impl<T> SunPositionProvider for &T
where
    T: SunPositionProvider + ?Sized,
{
    fn sun_position(
        &self,
        day: CalendarDay,
        utc_minutes: f64,
        latitude: f64,
        longitude: f64,
    ) -> SunPosition {
        (**self).sun_position(day, utc_minutes, latitude, longitude)
    }
}

/// Provider based on NOAA's solar calculator; accurate to about a minute of
/// arc for dates within a few centuries from now, ignoring refraction.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoaaEphemeris;

impl NoaaEphemeris {
    /// Returns `(declination, equation of time)`, in degrees and minutes.
    fn solar_coordinates(jd: f64) -> (f64, f64) {
        let t = (jd - 2451545.0) / 36525.0;

        let mean_long = (280.46646 + t * (36000.76983 + 0.0003032 * t)) % 360.0;
        let mean_anomaly = 357.52911 + t * (35999.05029 - 0.0001537 * t);
        let eccentricity = 0.016708634 - t * (0.000042037 + 0.0000001267 * t);

        let m = mean_anomaly.to_radians();

        let eq_of_center = m.sin() * (1.914602 - t * (0.004817 + 0.000014 * t))
            + (2.0 * m).sin() * (0.019993 - 0.000101 * t)
            + (3.0 * m).sin() * 0.000289;

        let omega = (125.04 - 1934.136 * t).to_radians();
        let apparent_long = mean_long + eq_of_center - 0.00569 - 0.00478 * omega.sin();

        let mean_obliquity = 23.0
            + (26.0 + (21.448 - t * (46.8150 + t * (0.00059 - t * 0.001813))) / 60.0)
                / 60.0;

        let obliquity = (mean_obliquity + 0.00256 * omega.cos()).to_radians();

        let declination =
            (obliquity.sin() * apparent_long.to_radians().sin()).asin().to_degrees();

        let y = (obliquity / 2.0).tan().powi(2);
        let l0 = mean_long.to_radians();

        let eq_of_time = y * (2.0 * l0).sin() - 2.0 * eccentricity * m.sin()
            + 4.0 * eccentricity * y * m.sin() * (2.0 * l0).cos()
            - 0.5 * y * y * (4.0 * l0).sin()
            - 1.25 * eccentricity * eccentricity * (2.0 * m).sin();

        (declination, 4.0 * eq_of_time.to_degrees())
    }
}

impl SunPositionProvider for NoaaEphemeris {
    fn sun_position(
        &self,
        day: CalendarDay,
        utc_minutes: f64,
        latitude: f64,
        longitude: f64,
    ) -> SunPosition {
        let lat = latitude.clamp(-90.0, 90.0).to_radians();
        let lon = longitude.clamp(-180.0, 180.0);

        let (declination, eq_of_time) =
            Self::solar_coordinates(day.julian_day(utc_minutes));

        let decl = declination.to_radians();

        let solar_time = (utc_minutes + eq_of_time + 4.0 * lon).rem_euclid(1440.0);
        let hour_angle = (solar_time / 4.0 - 180.0).to_radians();

        let cos_zenith = (lat.sin() * decl.sin()
            + lat.cos() * decl.cos() * hour_angle.cos())
        .clamp(-1.0, 1.0);

        let altitude = 0.5 * PI - cos_zenith.acos();

        // Measured from south, positive westward; i.e. zero at solar noon
        // (on the northern hemisphere) and positive in the afternoon
        let azimuth = hour_angle
            .sin()
            .atan2(hour_angle.cos() * lat.sin() - decl.tan() * lat.cos());

        SunPosition {
            azimuth: azimuth as f32,
            altitude: altitude as f32,
        }
    }
}
