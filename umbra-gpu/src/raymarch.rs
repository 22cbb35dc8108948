use spirv_std::glam::Vec2;
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{ElevationSampler, ElevationSource, UMBRA_EPSILON};

/// Upper bound for the number of steps a single ray can take.
pub const RAYMARCH_MAX_STEPS: u32 = 512;

/// Factor the step size grows by after each step.
pub const RAYMARCH_STEP_GROWTH: f32 = 1.25;

/// Upper bound for the step size, in multiples of the initial step.
pub const RAYMARCH_MAX_STEP_FACTOR: f32 = 32.0;

/// Maximum slope of a ray that hasn't encountered any terrain yet.
pub const RAYMARCH_UNOCCLUDED: f32 = -1.0e9;

/// Slope added to the sun's slope before comparing it with terrain, so that
/// interpolation noise on flat ground doesn't self-shadow.
pub const SHADOW_SLOPE_BIAS: f32 = 0.01;

/// Once terrain rises above the sun by this many multiples of the edge
/// softness, the ray stops marching; visibility is negligible by then and can
/// only decrease further.
pub const SHADOW_EARLY_EXIT: f32 = 4.0;

#[derive(Clone, Copy, Default, PartialEq)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct RaymarchParams {
    /// Ground size of a single texel of the origin tile.
    pub meters_per_pixel: f32,

    /// How far (in meters) the ray is allowed to travel.
    pub max_distance: f32,

    /// Divides the initial step; larger values march more finely.
    pub step_multiplier: f32,
}

/// State of a single ray being marched outward from a texel.
///
/// Positions are normalized tile coordinates (`+x` east, `+y` south); the
/// direction is normalized in the same space.
#[derive(Clone, Copy)]
pub struct Raymarch {
    origin: Vec2,
    origin_elevation: f32,
    direction: Vec2,
    params: RaymarchParams,
    meters_per_unit: f32,
    distance: f32,
    step_factor: f32,
    steps: u32,
    max_slope: f32,
    done: bool,
}

impl Raymarch {
    pub fn new(
        origin: Vec2,
        origin_elevation: f32,
        direction: Vec2,
        tile_size: f32,
        params: RaymarchParams,
    ) -> Self {
        let len = direction.length();

        let done = params.max_distance <= 0.0
            || len < UMBRA_EPSILON
            || params.meters_per_pixel <= 0.0;

        let direction = if done { Vec2::ZERO } else { direction / len };

        Self {
            origin,
            origin_elevation,
            direction,
            params,
            meters_per_unit: params.meters_per_pixel * tile_size,
            distance: 0.0,
            step_factor: 1.0,
            steps: 0,
            max_slope: RAYMARCH_UNOCCLUDED,
            done,
        }
    }

    /// Takes a single step; returns `false` once the ray is finished (in
    /// which case nothing has been sampled).
    pub fn advance<S>(&mut self, sampler: &ElevationSampler<S>) -> bool
    where
        S: ElevationSource,
    {
        if self.done || self.steps >= RAYMARCH_MAX_STEPS {
            self.done = true;
            return false;
        }

        let step = self.params.meters_per_pixel
            / self.params.step_multiplier.max(UMBRA_EPSILON)
            * self.step_factor;

        self.distance += step;
        self.steps += 1;

        if self.distance > self.params.max_distance {
            self.done = true;
            return false;
        }

        let pos = self.origin
            + self.direction * (self.distance / self.meters_per_unit);

        let bound = sampler.max_offset() as f32;

        if pos.x < -bound
            || pos.y < -bound
            || pos.x > 1.0 + bound
            || pos.y > 1.0 + bound
        {
            self.done = true;
            return false;
        }

        let slope = (sampler.sample(pos) - self.origin_elevation) / self.distance;

        self.max_slope = self.max_slope.max(slope);

        self.step_factor = (self.step_factor * RAYMARCH_STEP_GROWTH)
            .min(RAYMARCH_MAX_STEP_FACTOR);

        true
    }

    /// Largest `rise / run` encountered so far.
    pub fn max_slope(&self) -> f32 {
        self.max_slope
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }
}

/// Marches a ray to completion and returns the maximum slope ratio along it
/// ([`RAYMARCH_UNOCCLUDED`] if nothing was sampled).
pub fn trace_max_slope<S>(
    sampler: &ElevationSampler<S>,
    origin: Vec2,
    origin_elevation: f32,
    direction: Vec2,
    params: RaymarchParams,
) -> f32
where
    S: ElevationSource,
{
    let mut ray = Raymarch::new(
        origin,
        origin_elevation,
        direction,
        sampler.tile_size(),
        params,
    );

    while ray.advance(sampler) {
        //
    }

    ray.max_slope()
}

/// Marches a ray towards the sun and returns how visible the sun is, in
/// `<0, 1>`.
///
/// `sun_slope` is `tan(altitude)`; terrain rising above it attenuates the
/// visibility by `exp(-excess / edge_softness)`.
pub fn trace_visibility<S>(
    sampler: &ElevationSampler<S>,
    origin: Vec2,
    origin_elevation: f32,
    direction: Vec2,
    params: RaymarchParams,
    sun_slope: f32,
    edge_softness: f32,
) -> f32
where
    S: ElevationSource,
{
    let edge_softness = edge_softness.max(UMBRA_EPSILON);
    let threshold = sun_slope + SHADOW_SLOPE_BIAS;

    let mut ray = Raymarch::new(
        origin,
        origin_elevation,
        direction,
        sampler.tile_size(),
        params,
    );

    while ray.advance(sampler) {
        let excess = ray.max_slope() - threshold;

        if excess > SHADOW_EARLY_EXIT * edge_softness {
            return (-excess / edge_softness).exp();
        }
    }

    let excess = ray.max_slope() - threshold;

    if excess <= 0.0 {
        1.0
    } else {
        (-excess / edge_softness).exp()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use spirv_std::glam::vec2;

    use super::*;
    use crate::{slot_table, StitchedGrid};

    const PARAMS: RaymarchParams = RaymarchParams {
        meters_per_pixel: 10.0,
        max_distance: 2000.0,
        step_multiplier: 1.0,
    };

    #[test]
    fn zero_distance_is_fully_visible() {
        let grid = StitchedGrid::from_fn(16, 2, |x, _| x as f32 * 100.0);
        let slots = slot_table(2);
        let sampler = ElevationSampler::new(&grid, &slots, 16.0, 2);

        let params = RaymarchParams {
            max_distance: 0.0,
            ..PARAMS
        };

        let slope =
            trace_max_slope(&sampler, vec2(0.5, 0.5), 0.0, vec2(1.0, 0.0), params);

        assert_eq!(RAYMARCH_UNOCCLUDED, slope);

        let vis = trace_visibility(
            &sampler,
            vec2(0.5, 0.5),
            0.0,
            vec2(1.0, 0.0),
            params,
            0.0,
            0.05,
        );

        assert_relative_eq!(1.0, vis);
    }

    #[test]
    fn zero_direction_is_fully_visible() {
        let grid = StitchedGrid::flat(16, 2, 100.0);
        let slots = slot_table(2);
        let sampler = ElevationSampler::new(&grid, &slots, 16.0, 2);

        let vis = trace_visibility(
            &sampler,
            vec2(0.5, 0.5),
            0.0,
            Vec2::ZERO,
            PARAMS,
            0.1,
            0.05,
        );

        assert_relative_eq!(1.0, vis);
    }

    #[test]
    fn max_slope_never_decreases() {
        // Bumpy terrain, so that individual slopes go up and down
        let grid = StitchedGrid::from_fn(16, 2, |x, y| {
            ((x * 7 + y * 3) % 11) as f32 * 15.0
        });

        let slots = slot_table(2);
        let sampler = ElevationSampler::new(&grid, &slots, 16.0, 2);

        let mut ray =
            Raymarch::new(vec2(0.3, 0.6), 40.0, vec2(1.0, -0.5), 16.0, PARAMS);

        let mut prev = ray.max_slope();

        while ray.advance(&sampler) {
            assert!(ray.max_slope() >= prev);
            prev = ray.max_slope();
        }

        assert!(ray.steps() > 1);
    }

    #[test]
    fn ray_stops_at_max_distance() {
        let grid = StitchedGrid::flat(16, 2, 0.0);
        let slots = slot_table(2);
        let sampler = ElevationSampler::new(&grid, &slots, 16.0, 2);

        let params = RaymarchParams {
            max_distance: 100.0,
            ..PARAMS
        };

        let mut ray =
            Raymarch::new(vec2(0.5, 0.5), 0.0, vec2(0.0, 1.0), 16.0, params);

        while ray.advance(&sampler) {
            assert!(ray.distance() <= 100.0);
        }

        assert!(ray.steps() < RAYMARCH_MAX_STEPS);
    }

    #[test]
    fn ray_stops_when_leaving_neighbors() {
        let grid = StitchedGrid::flat(16, 1, 0.0);
        let slots = slot_table(1);
        let sampler = ElevationSampler::new(&grid, &slots, 16.0, 1);

        let params = RaymarchParams {
            max_distance: 1.0e6,
            ..PARAMS
        };

        let mut ray =
            Raymarch::new(vec2(0.5, 0.5), 0.0, vec2(1.0, 0.0), 16.0, params);

        while ray.advance(&sampler) {
            //
        }

        // One tile is 160 m wide here, so the ray can't make it much further
        // than 1.5 tiles before leaving the neighbors
        assert!(ray.distance() < 1000.0);
    }

    #[test]
    fn ramp_slope_is_found() {
        // Rises by 5 m per texel (0.5 rise / run) towards the east
        let grid = StitchedGrid::from_fn(16, 2, |x, _| x as f32 * 5.0);
        let slots = slot_table(2);
        let sampler = ElevationSampler::new(&grid, &slots, 16.0, 2);

        let origin = vec2(0.5, 0.5);
        let h0 = sampler.sample(origin);

        let east = trace_max_slope(&sampler, origin, h0, vec2(1.0, 0.0), PARAMS);
        let west = trace_max_slope(&sampler, origin, h0, vec2(-1.0, 0.0), PARAMS);

        assert_relative_eq!(0.5, east, epsilon = 0.05);
        assert!(west < 0.0);
    }
}
