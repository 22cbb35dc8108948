use std::f64::consts::PI;
use std::fmt;

/// Equatorial circumference of the Earth, in meters.
pub const EARTH_CIRCUMFERENCE: f64 = 40_075_016.686;

/// Lower bound for [`TileId::meters_per_pixel()`], so that tiles close to the
/// poles don't collapse into zero-length rays.
pub const MIN_METERS_PER_PIXEL: f32 = 1e-3;

/// Identifier of a Web Mercator tile.
///
/// `(zoom, x, y)` identify the raster itself, while `wrap` tells which copy of
/// the world (when the map is panned across the antimeridian) the tile belongs
/// to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    pub zoom: u8,
    pub wrap: i32,
    pub x: u32,
    pub y: u32,
}

impl TileId {
    pub fn new(zoom: u8, wrap: i32, x: u32, y: u32) -> Self {
        Self { zoom, wrap, x, y }
    }

    /// Number of tiles along each axis at this tile's zoom.
    pub fn dim(&self) -> u32 {
        1 << self.zoom.min(31)
    }

    /// Returns the tile lying `(dx, dy)` tiles away (`+y` being south).
    ///
    /// Crossing the antimeridian wraps `x` and adjusts `wrap`; crossing the
    /// top or bottom edge of the map yields `None`.
    pub fn neighbor(&self, dx: i32, dy: i32) -> Option<Self> {
        let dim = self.dim() as i64;
        let y = self.y as i64 + dy as i64;

        if y < 0 || y >= dim {
            return None;
        }

        let x = self.x as i64 + dx as i64;
        let wrap = self.wrap as i64 + x.div_euclid(dim);

        Some(Self {
            zoom: self.zoom,
            wrap: wrap as i32,
            x: x.rem_euclid(dim) as u32,
            y: y as u32,
        })
    }

    /// Key used to look up neighbors: `zoom/wrap/x/y`.
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Latitude (in degrees) of the tile's center.
    pub fn latitude(&self) -> f64 {
        let n = PI - 2.0 * PI * (self.y as f64 + 0.5) / self.dim() as f64;

        n.sinh().atan().to_degrees()
    }

    /// Longitude (in degrees) of the tile's center, ignoring `wrap`.
    pub fn longitude(&self) -> f64 {
        (self.x as f64 + 0.5) / self.dim() as f64 * 360.0 - 180.0
    }

    /// Ground size of a single texel at the tile's center.
    pub fn meters_per_pixel(&self, tile_size: u32) -> f32 {
        let mpp = EARTH_CIRCUMFERENCE * self.latitude().to_radians().cos()
            / (self.dim() as f64 * tile_size.max(1) as f64);

        (mpp as f32).max(MIN_METERS_PER_PIXEL)
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/{}", self.zoom, self.wrap, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn key() {
        assert_eq!("3/-1/5/2", TileId::new(3, -1, 5, 2).key());
    }

    #[test]
    fn neighbors_within_the_map() {
        let tile = TileId::new(2, 0, 1, 1);

        assert_eq!(Some(TileId::new(2, 0, 1, 0)), tile.neighbor(0, -1));
        assert_eq!(Some(TileId::new(2, 0, 2, 2)), tile.neighbor(1, 1));
        assert_eq!(Some(TileId::new(2, 0, 0, 1)), tile.neighbor(-1, 0));
    }

    #[test]
    fn neighbors_wrap_across_the_antimeridian() {
        let tile = TileId::new(2, 0, 3, 1);

        assert_eq!(Some(TileId::new(2, 1, 0, 1)), tile.neighbor(1, 0));
        assert_eq!(Some(TileId::new(2, 1, 1, 1)), tile.neighbor(2, 0));

        let tile = TileId::new(2, 0, 0, 1);

        assert_eq!(Some(TileId::new(2, -1, 3, 1)), tile.neighbor(-1, 0));
        assert_eq!(Some(TileId::new(2, -1, 2, 2)), tile.neighbor(-2, 1));
    }

    #[test]
    fn neighbors_stop_at_the_poles() {
        let tile = TileId::new(2, 0, 1, 0);

        assert_eq!(None, tile.neighbor(0, -1));
        assert_eq!(None, TileId::new(2, 0, 1, 3).neighbor(1, 1));
    }

    #[test]
    fn meters_per_pixel() {
        // Zoom 0 spans the whole equator, but its center lies at the equator
        assert_relative_eq!(
            (EARTH_CIRCUMFERENCE / 512.0) as f32,
            TileId::new(0, 0, 0, 0).meters_per_pixel(512),
            max_relative = 1e-5
        );

        // Further from the equator, texels get smaller
        let equator = TileId::new(4, 0, 3, 8).meters_per_pixel(512);
        let north = TileId::new(4, 0, 3, 2).meters_per_pixel(512);

        assert!(north < equator);

        // ... but never collapse
        assert!(TileId::new(30, 0, 0, 0).meters_per_pixel(512) >= MIN_METERS_PER_PIXEL);
    }
}
